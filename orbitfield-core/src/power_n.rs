use crate::complex::Complex;
use crate::fractal::{Bailout, Escape, Family, FractalParameters};
use crate::orbit::OrbitTrap;
use crate::power::PowerStep;

/// The multibrot map `z ← zⁿ + c`.
///
/// Start states and counters follow [`Quadratic`](crate::Quadratic).
#[derive(Debug, Clone, Copy)]
pub struct PowerN {
    bailout: Bailout,
    c: Complex,
    pow: PowerStep,
    trap: OrbitTrap,
}

impl PowerN {
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        params.validate()?;
        Ok(Self {
            bailout: Bailout::new(params),
            c: params.c,
            pow: PowerStep::new(params.power),
            trap: OrbitTrap::new(params.orbit_point, params.orbit_metric),
        })
    }

    #[inline]
    fn escape(&self, z: Complex, c: Complex, first: u32) -> Escape {
        let Bailout {
            max_iterations,
            threshold,
        } = self.bailout;
        let (mut x, mut y) = (z.re, z.im);
        let mut iter = first;
        loop {
            let norm_sq = x * x + y * y;
            if norm_sq >= threshold {
                return Escape::escaped(iter, norm_sq);
            }
            if iter >= max_iterations {
                return Escape::bounded(iter);
            }
            let (px, py) = self.pow.apply(x, y);
            x = px + c.re;
            y = py + c.im;
            iter += 1;
        }
    }

    #[inline]
    fn trap(&self, z: Complex, c: Complex, first: u32) -> f64 {
        let Bailout {
            max_iterations,
            threshold,
        } = self.bailout;
        let (mut x, mut y) = (z.re, z.im);
        let mut dist = f64::MAX;
        let mut iter = first;
        while iter < max_iterations {
            dist = dist.min(self.trap.distance(x, y));
            if x * x + y * y >= threshold {
                break;
            }
            let (px, py) = self.pow.apply(x, y);
            x = px + c.re;
            y = py + c.im;
            iter += 1;
        }
        dist
    }
}

impl Family for PowerN {
    fn escape_julia(&self, z: Complex) -> Escape {
        self.escape(z, self.c, 0)
    }

    fn escape_mandelbrot(&self, c: Complex) -> Escape {
        self.escape(self.c, c, 1)
    }

    fn trap_julia(&self, z: Complex) -> f64 {
        self.trap(z, self.c, 0)
    }

    fn trap_mandelbrot(&self, c: Complex) -> f64 {
        self.trap(self.c, c, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::FamilyKind;
    use crate::quadratic::Quadratic;

    fn params(power: u32) -> FractalParameters {
        FractalParameters {
            family: FamilyKind::PowerN,
            power,
            c: Complex::new(-0.2, 0.55),
            max_iterations: 80,
            ..Default::default()
        }
    }

    #[test]
    fn power_two_agrees_with_quadratic() {
        let p = params(2);
        let pn = PowerN::new(&p).unwrap();
        let q = Quadratic::new(&p).unwrap();
        for i in 0..40 {
            let z = Complex::new(-1.5 + i as f64 * 0.075, 0.2 - i as f64 * 0.01);
            assert_eq!(pn.escape_julia(z).iterations, q.escape_julia(z).iterations);
            assert_eq!(
                pn.escape_mandelbrot(z).iterations,
                q.escape_mandelbrot(z).iterations
            );
        }
    }

    #[test]
    fn generic_power_matches_reference_orbit() {
        let p = params(7);
        let f = PowerN::new(&p).unwrap();
        let start = Complex::new(0.6, 0.3);

        let mut z = start;
        let mut expected = 0;
        while expected < p.max_iterations && z.norm_sq() < p.threshold() {
            z = z.powi(7) + p.c;
            expected += 1;
        }
        assert_eq!(f.escape_julia(start).iterations, expected);
    }

    #[test]
    fn rejects_power_below_two() {
        assert!(PowerN::new(&params(1)).is_err());
    }
}
