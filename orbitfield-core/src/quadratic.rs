use crate::complex::Complex;
use crate::fractal::{Bailout, Escape, Family, FractalParameters};
use crate::orbit::OrbitTrap;

/// The classic quadratic map `z ← z² + c`.
///
/// In the Mandelbrot role the orbit starts from the stored parameter `c`
/// (zero gives the classic set) and the input point is the increment; the
/// counter then starts at 1 because the first iterate is already taken.
#[derive(Debug, Clone, Copy)]
pub struct Quadratic {
    bailout: Bailout,
    c: Complex,
    trap: OrbitTrap,
}

impl Quadratic {
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        params.validate()?;
        Ok(Self {
            bailout: Bailout::new(params),
            c: params.c,
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
            let xx = x * x;
            let yy = y * y;
            let norm_sq = xx + yy;
            if norm_sq >= threshold {
                return Escape::escaped(iter, norm_sq);
            }
            if iter >= max_iterations {
                return Escape::bounded(iter);
            }
            y = 2.0 * x * y + c.im;
            x = xx - yy + c.re;
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
            let xx = x * x;
            let yy = y * y;
            if xx + yy >= threshold {
                break;
            }
            y = 2.0 * x * y + c.im;
            x = xx - yy + c.re;
            iter += 1;
        }
        dist
    }
}

impl Family for Quadratic {
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

    fn quadratic(c: Complex, max_iterations: u32) -> Quadratic {
        let params = FractalParameters {
            c,
            max_iterations,
            ..Default::default()
        };
        Quadratic::new(&params).unwrap()
    }

    #[test]
    fn origin_is_bounded_in_the_classic_set() {
        let f = quadratic(Complex::ZERO, 500);
        let e = f.escape_mandelbrot(Complex::ZERO);
        assert_eq!(e, Escape::bounded(500));
    }

    #[test]
    fn far_point_escapes_immediately() {
        let f = quadratic(Complex::ZERO, 100);
        // Mandelbrot role starts at z = c_param = 0, counter 1; the first
        // iterate 0 is inside, the second (= point) is outside.
        let e = f.escape_mandelbrot(Complex::new(10.0, 0.0));
        assert_eq!(e.iterations, 2);
        // Julia role tests the starting point itself.
        let e = f.escape_julia(Complex::new(10.0, 0.0));
        assert_eq!(e.iterations, 0);
        assert_eq!(e.norm_sq, Some(100.0));
    }

    #[test]
    fn escape_count_stays_in_range() {
        let f = quadratic(Complex::new(-0.4, 0.6), 64);
        for i in 0..50 {
            let p = Complex::new(-2.0 + i as f64 * 0.08, 0.3);
            assert!(f.escape_julia(p).iterations <= 64);
            assert!(f.escape_mandelbrot(p).iterations <= 64);
        }
    }

    #[test]
    fn trap_is_minimum_over_visited_iterates() {
        let params = FractalParameters {
            c: Complex::new(0.1, 0.2),
            max_iterations: 20,
            orbit_point: Complex::new(0.5, -0.5),
            ..Default::default()
        };
        let f = Quadratic::new(&params).unwrap();
        let start = Complex::new(0.3, 0.1);

        let mut z = start;
        let mut best = f64::MAX;
        for _ in 0..20 {
            let d = (0.5 - z.re).powi(2) + (-0.5 - z.im).powi(2);
            best = best.min(d);
            if z.norm_sq() >= 4.0 {
                break;
            }
            z = z * z + params.c;
        }
        assert!((f.trap_julia(start) - best).abs() < 1e-12);
    }

    #[test]
    fn trap_with_no_iterations_is_max() {
        let f = quadratic(Complex::ZERO, 1);
        // Mandelbrot role counts from 1, so with one iteration nothing is visited.
        assert_eq!(f.trap_mandelbrot(Complex::new(0.1, 0.1)), f64::MAX);
    }
}
