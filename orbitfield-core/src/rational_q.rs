use crate::complex::Complex;
use crate::fractal::{Bailout, DenominatorPolicy, Escape, Family, FractalParameters};
use crate::orbit::OrbitTrap;

/// The quadratic map with a rational correction term driven by `q`.
///
/// With `s = z²` and `t = |s|²·q²` one step is
///
/// ```text
/// z' = (−s·t − 2q·(sy², −sx·sy) + s) / (t − 2q·sx + 1) + c
/// ```
///
/// Only the real part of `q` enters the map.
#[derive(Debug, Clone, Copy)]
pub struct RationalQ {
    bailout: Bailout,
    c: Complex,
    q: f64,
    denominator: DenominatorPolicy,
    trap: OrbitTrap,
}

impl RationalQ {
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        params.validate()?;
        Ok(Self {
            bailout: Bailout::new(params),
            c: params.c,
            q: params.q.re,
            denominator: params.denominator,
            trap: OrbitTrap::new(params.orbit_point, params.orbit_metric),
        })
    }

    #[inline]
    fn step(&self, x: f64, y: f64, c: Complex) -> (f64, f64) {
        let q = self.q;
        let sx = x * x - y * y;
        let sy = 2.0 * x * y;
        let t = (sx * sx + sy * sy) * q * q;
        let dem = self.denominator.scalar(t - 2.0 * q * sx + 1.0);
        (
            (-sx * t - 2.0 * q * sy * sy + sx) / dem + c.re,
            (-sy * t + 2.0 * q * sx * sy + sy) / dem + c.im,
        )
    }

    #[inline]
    fn escape(&self, z: Complex, c: Complex) -> Escape {
        let Bailout {
            max_iterations,
            threshold,
        } = self.bailout;
        let (mut x, mut y) = (z.re, z.im);
        let mut iter = 0;
        loop {
            let norm_sq = x * x + y * y;
            if norm_sq >= threshold {
                return Escape::escaped(iter, norm_sq);
            }
            if iter >= max_iterations {
                return Escape::bounded(iter);
            }
            (x, y) = self.step(x, y, c);
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
            (x, y) = self.step(x, y, c);
            iter += 1;
        }
        dist
    }
}

impl Family for RationalQ {
    fn escape_julia(&self, z: Complex) -> Escape {
        self.escape(z, self.c)
    }

    fn escape_mandelbrot(&self, c: Complex) -> Escape {
        self.escape(Complex::ZERO, c)
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

    fn params(q: Complex) -> FractalParameters {
        FractalParameters {
            family: FamilyKind::RationalQ,
            q,
            c: Complex::new(-0.12, 0.74),
            max_iterations: 120,
            ..Default::default()
        }
    }

    #[test]
    fn zero_q_reduces_to_quadratic_julia() {
        let p = params(Complex::ZERO);
        let r = RationalQ::new(&p).unwrap();
        let quad = Quadratic::new(&p).unwrap();
        for i in 0..30 {
            let z = Complex::new(-1.2 + i as f64 * 0.08, -0.3 + i as f64 * 0.02);
            assert_eq!(r.escape_julia(z), quad.escape_julia(z));
        }
    }

    #[test]
    fn imaginary_part_of_q_is_ignored() {
        let a = RationalQ::new(&params(Complex::new(0.3, 0.0))).unwrap();
        let b = RationalQ::new(&params(Complex::new(0.3, 5.0))).unwrap();
        let z = Complex::new(0.2, -0.4);
        assert_eq!(a.escape_julia(z), b.escape_julia(z));
        assert_eq!(a.trap_julia(z).to_bits(), b.trap_julia(z).to_bits());
    }

    #[test]
    fn step_matches_closed_form() {
        let p = params(Complex::new(0.4, 0.0));
        let r = RationalQ::new(&p).unwrap();
        let (x, y) = (0.5, 0.25);
        let s = Complex::new(x, y) * Complex::new(x, y);
        let t = s.norm_sq() * 0.16;
        let dem = t - 0.8 * s.re + 1.0;
        let ex = (-s.re * t - 0.8 * s.im * s.im + s.re) / dem + p.c.re;
        let ey = (-s.im * t + 0.8 * s.re * s.im + s.im) / dem + p.c.im;
        let (gx, gy) = r.step(x, y, p.c);
        assert!((gx - ex).abs() < 1e-12);
        assert!((gy - ey).abs() < 1e-12);
    }

    #[test]
    fn singular_denominator_propagates_or_clamps() {
        // q = 1, z² = 1: t = 1, dem = 1 − 2 + 1 = 0.
        let mut p = params(Complex::new(1.0, 0.0));
        let r = RationalQ::new(&p).unwrap();
        let (x, _) = r.step(1.0, 0.0, Complex::ZERO);
        assert!(!x.is_finite());

        p.denominator = DenominatorPolicy::Clamp { min_magnitude: 1e-9 };
        let r = RationalQ::new(&p).unwrap();
        let (x, y) = r.step(1.0, 0.0, Complex::ZERO);
        assert!(x.is_finite() && y.is_finite());
    }
}
