use crate::complex::Complex;
use crate::fractal::{
    Bailout, DenominatorPolicy, Escape, Family, FractalParameters, CONVERGENCE_EPSILON,
};
use crate::orbit::OrbitTrap;
use crate::power::PowerStep;

/// Newton's method on `zⁿ + q·z + c = 0`:
///
/// ```text
/// z ← z − (zⁿ + q·z + c) / (n·zⁿ⁻¹ + q)
/// ```
///
/// Julia role starts at the point with the stored `c`; Mandelbrot role starts
/// at the origin with `c` set to the point. Orbit-trap results are the square
/// root of the minimum metric.
#[derive(Debug, Clone, Copy)]
pub struct NewtonRationalQ {
    max_iterations: u32,
    c: Complex,
    q: Complex,
    n: f64,
    /// Resolved `z ↦ zⁿ⁻¹`.
    pow: PowerStep,
    denominator: DenominatorPolicy,
    trap: OrbitTrap,
}

impl NewtonRationalQ {
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        params.validate()?;
        Ok(Self {
            max_iterations: Bailout::new(params).max_iterations,
            c: params.c,
            q: params.q,
            n: params.power as f64,
            pow: PowerStep::new(params.power - 1),
            denominator: params.denominator,
            trap: OrbitTrap::new(params.orbit_point, params.orbit_metric),
        })
    }

    #[inline]
    fn step(&self, x: f64, y: f64, c: Complex) -> (f64, f64) {
        let q = self.q;
        let (wx, wy) = self.pow.apply(x, y);
        // zⁿ = z · zⁿ⁻¹
        let (znx, zny) = (x * wx - y * wy, x * wy + y * wx);
        let (dx, dy) = (self.n * wx + q.re, self.n * wy + q.im);
        let rdem = self.denominator.squared(dx * dx + dy * dy);
        let numx = znx + x * q.re - y * q.im + c.re;
        let numy = zny + x * q.im + y * q.re + c.im;
        (
            x - (numx * dx + numy * dy) / rdem,
            y - (numy * dx - numx * dy) / rdem,
        )
    }

    fn converge(&self, z: Complex, c: Complex) -> Escape {
        let (mut x, mut y) = (z.re, z.im);
        let mut iter = 1;
        while iter < self.max_iterations {
            let (x1, y1) = (x, y);
            (x, y) = self.step(x1, y1, c);
            if (x1 - x).abs().max((y1 - y).abs()) < CONVERGENCE_EPSILON {
                break;
            }
            iter += 1;
        }
        Escape::bounded(iter)
    }

    fn trap(&self, z: Complex, c: Complex) -> f64 {
        let (mut x, mut y) = (z.re, z.im);
        let mut dist = f64::MAX;
        let mut iter = 1;
        while iter < self.max_iterations {
            let (x1, y1) = (x, y);
            (x, y) = self.step(x1, y1, c);
            dist = dist.min(self.trap.distance(x, y));
            if (x1 - x).abs().max((y1 - y).abs()) < CONVERGENCE_EPSILON {
                break;
            }
            iter += 1;
        }
        dist.sqrt()
    }
}

impl Family for NewtonRationalQ {
    fn escape_julia(&self, z: Complex) -> Escape {
        self.converge(z, self.c)
    }

    fn escape_mandelbrot(&self, c: Complex) -> Escape {
        self.converge(Complex::ZERO, c)
    }

    fn trap_julia(&self, z: Complex) -> f64 {
        self.trap(z, self.c)
    }

    fn trap_mandelbrot(&self, c: Complex) -> f64 {
        self.trap(Complex::ZERO, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::FamilyKind;

    fn params() -> FractalParameters {
        FractalParameters {
            family: FamilyKind::NewtonRationalQ,
            power: 3,
            q: Complex::new(0.5, -0.25),
            c: Complex::new(-1.0, 0.3),
            max_iterations: 200,
            ..Default::default()
        }
    }

    #[test]
    fn step_is_a_newton_step() {
        let p = params();
        let f = NewtonRationalQ::new(&p).unwrap();
        let z = Complex::new(0.7, -0.4);
        let g = z.powi(3) + p.q * z + p.c;
        let dg = z.powi(2) * 3.0 + p.q;
        let expected = z - g / dg;
        let (x, y) = f.step(z.re, z.im, p.c);
        assert!((x - expected.re).abs() < 1e-12);
        assert!((y - expected.im).abs() < 1e-12);
    }

    #[test]
    fn converged_point_is_a_root() {
        let p = params();
        let f = NewtonRationalQ::new(&p).unwrap();
        let start = Complex::new(1.1, 0.4);
        let e = f.escape_julia(start);
        assert!(e.iterations < p.max_iterations);

        // Walk the same orbit and check the residual at the end.
        let mut z = start;
        for _ in 0..e.iterations {
            let (x, y) = f.step(z.re, z.im, p.c);
            z = Complex::new(x, y);
        }
        let residual = z.powi(3) + p.q * z + p.c;
        assert!(residual.norm() < 1e-6, "residual {residual}");
    }

    #[test]
    fn trap_is_square_root_of_minimum() {
        let p = FractalParameters {
            orbit_point: Complex::new(0.25, 0.25),
            max_iterations: 12,
            ..params()
        };
        let f = NewtonRationalQ::new(&p).unwrap();
        let start = Complex::new(-0.8, 0.6);

        let mut z = start;
        let mut best = f64::MAX;
        for _ in 1..12 {
            let (x, y) = f.step(z.re, z.im, p.c);
            let moved = (z.re - x).abs().max((z.im - y).abs());
            z = Complex::new(x, y);
            best = best.min((0.25 - x).powi(2) + (0.25 - y).powi(2));
            if moved < CONVERGENCE_EPSILON {
                break;
            }
        }
        assert!((f.trap_julia(start) - best.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_iteration_trap_is_sqrt_max() {
        let p = FractalParameters {
            max_iterations: 1,
            ..params()
        };
        let f = NewtonRationalQ::new(&p).unwrap();
        assert_eq!(f.trap_mandelbrot(Complex::new(0.1, 0.2)), f64::MAX.sqrt());
    }
}
