//! Integer powers of a complex number on bare `(x, y)` pairs.
//!
//! Exponents 1 through 6 have closed-form expansions; anything larger goes
//! through binary exponentiation. The choice is made once per formula.

use crate::complex::Complex;

/// `(x, y, n) → (x + iy)ⁿ`. The closed forms ignore `n`.
pub type PowFn = fn(f64, f64, u32) -> (f64, f64);

/// A resolved power step.
#[derive(Debug, Clone, Copy)]
pub struct PowerStep {
    f: PowFn,
    n: u32,
}

impl PowerStep {
    pub fn new(n: u32) -> Self {
        let f: PowFn = match n {
            1 => pow1,
            2 => pow2,
            3 => pow3,
            4 => pow4,
            5 => pow5,
            6 => pow6,
            _ => pow_generic,
        };
        Self { f, n }
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.f)(x, y, self.n)
    }
}

fn pow1(x: f64, y: f64, _n: u32) -> (f64, f64) {
    (x, y)
}

fn pow2(x: f64, y: f64, _n: u32) -> (f64, f64) {
    (x * x - y * y, 2.0 * x * y)
}

fn pow3(x: f64, y: f64, _n: u32) -> (f64, f64) {
    let (xx, yy) = (x * x, y * y);
    (x * (xx - 3.0 * yy), y * (3.0 * xx - yy))
}

fn pow4(x: f64, y: f64, _n: u32) -> (f64, f64) {
    let (xx, yy) = (x * x, y * y);
    (xx * xx - 6.0 * xx * yy + yy * yy, 4.0 * x * y * (xx - yy))
}

fn pow5(x: f64, y: f64, _n: u32) -> (f64, f64) {
    let (xx, yy) = (x * x, y * y);
    let (x4, y4) = (xx * xx, yy * yy);
    let cross = -10.0 * xx * yy;
    (x * (x4 + 5.0 * y4 + cross), y * (y4 + 5.0 * x4 + cross))
}

fn pow6(x: f64, y: f64, _n: u32) -> (f64, f64) {
    let (xx, yy) = (x * x, y * y);
    let (x4, y4) = (xx * xx, yy * yy);
    (
        x4 * (xx - 15.0 * yy) + y4 * (15.0 * xx - yy),
        x * y * (6.0 * x4 - 20.0 * xx * yy + 6.0 * y4),
    )
}

fn pow_generic(x: f64, y: f64, n: u32) -> (f64, f64) {
    let p = Complex::new(x, y).powi(n);
    (p.re, p.im)
}
