use crate::complex::Complex;
use crate::fractal::{
    Bailout, DenominatorPolicy, Escape, Family, FractalParameters, CONVERGENCE_EPSILON,
};
use crate::orbit::OrbitTrap;
use crate::power::PowerStep;

/// Newton's method on `zⁿ + c = 0`:
///
/// ```text
/// z ← α·z − c / (n·zⁿ⁻¹),   α = (n − 1) / n
/// ```
///
/// There is no separate parameter plane: the Mandelbrot role evaluates
/// exactly like the Julia role.
#[derive(Debug, Clone, Copy)]
pub struct NewtonPowerN {
    max_iterations: u32,
    c: Complex,
    n: f64,
    alpha: f64,
    /// Resolved `z ↦ zⁿ⁻¹`.
    pow: PowerStep,
    denominator: DenominatorPolicy,
    trap: OrbitTrap,
}

impl NewtonPowerN {
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        params.validate()?;
        let n = params.power as f64;
        Ok(Self {
            max_iterations: Bailout::new(params).max_iterations,
            c: params.c,
            n,
            alpha: (n - 1.0) / n,
            pow: PowerStep::new(params.power - 1),
            denominator: params.denominator,
            trap: OrbitTrap::new(params.orbit_point, params.orbit_metric),
        })
    }

    #[inline]
    fn step(&self, x: f64, y: f64) -> (f64, f64) {
        let (px, py) = self.pow.apply(x, y);
        let (wx, wy) = (self.n * px, self.n * py);
        let rdem = self.denominator.squared(wx * wx + wy * wy);
        let Complex { re: cx, im: cy } = self.c;
        (
            x * self.alpha - (cx * wx + cy * wy) / rdem,
            y * self.alpha - (cy * wx - cx * wy) / rdem,
        )
    }

    fn converge(&self, z: Complex) -> Escape {
        let (mut x, mut y) = (z.re, z.im);
        let mut iter = 1;
        while iter < self.max_iterations {
            let (x1, y1) = (x, y);
            (x, y) = self.step(x1, y1);
            if (x1 - x).abs().max((y1 - y).abs()) < CONVERGENCE_EPSILON {
                break;
            }
            iter += 1;
        }
        Escape::bounded(iter)
    }

    fn trap(&self, z: Complex) -> f64 {
        let (mut x, mut y) = (z.re, z.im);
        let mut dist = f64::MAX;
        let mut iter = 1;
        while iter < self.max_iterations {
            let (x1, y1) = (x, y);
            (x, y) = self.step(x1, y1);
            dist = dist.min(self.trap.distance(x, y));
            if (x1 - x).abs().max((y1 - y).abs()) < CONVERGENCE_EPSILON {
                break;
            }
            iter += 1;
        }
        dist
    }
}

impl Family for NewtonPowerN {
    fn escape_julia(&self, z: Complex) -> Escape {
        self.converge(z)
    }

    fn escape_mandelbrot(&self, c: Complex) -> Escape {
        self.converge(c)
    }

    fn trap_julia(&self, z: Complex) -> f64 {
        self.trap(z)
    }

    fn trap_mandelbrot(&self, c: Complex) -> f64 {
        self.trap(c)
    }
}
