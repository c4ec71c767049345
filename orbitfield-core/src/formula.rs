use tracing::debug;

use crate::complex::Complex;
use crate::fractal::{ColoringMode, Escape, Family, FamilyKind, FractalParameters, Plane};
use crate::newton_power::NewtonPowerN;
use crate::newton_rational::NewtonRationalQ;
use crate::power_n::PowerN;
use crate::quadratic::Quadratic;
use crate::rational_q::RationalQ;

/// A configured formula of one of the five families.
///
/// Built fresh for every parameter set and never mutated afterwards, so one
/// instance can be shared by all rayon workers of a render job.
#[derive(Debug, Clone, Copy)]
pub enum Formula {
    RationalQ(RationalQ),
    Quadratic(Quadratic),
    PowerN(PowerN),
    NewtonPowerN(NewtonPowerN),
    NewtonRationalQ(NewtonRationalQ),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Formula::RationalQ($f) => $body,
            Formula::Quadratic($f) => $body,
            Formula::PowerN($f) => $body,
            Formula::NewtonPowerN($f) => $body,
            Formula::NewtonRationalQ($f) => $body,
        }
    };
}

impl Formula {
    /// Validate `params` and derive every per-family constant.
    pub fn new(params: &FractalParameters) -> crate::Result<Self> {
        debug!(
            family = params.family.label(),
            power = params.power,
            max_iterations = params.max_iterations,
            "Building formula"
        );
        Ok(match params.family {
            FamilyKind::RationalQ => Self::RationalQ(RationalQ::new(params)?),
            FamilyKind::Quadratic => Self::Quadratic(Quadratic::new(params)?),
            FamilyKind::PowerN => Self::PowerN(PowerN::new(params)?),
            FamilyKind::NewtonPowerN => Self::NewtonPowerN(NewtonPowerN::new(params)?),
            FamilyKind::NewtonRationalQ => Self::NewtonRationalQ(NewtonRationalQ::new(params)?),
        })
    }

    /// Select the family by wire index, failing fast on unknown indices.
    pub fn from_index(index: u32, params: &FractalParameters) -> crate::Result<Self> {
        let family = FamilyKind::try_from(index)?;
        Self::new(&params.with_family(family))
    }

    pub fn kind(&self) -> FamilyKind {
        match self {
            Self::RationalQ(_) => FamilyKind::RationalQ,
            Self::Quadratic(_) => FamilyKind::Quadratic,
            Self::PowerN(_) => FamilyKind::PowerN,
            Self::NewtonPowerN(_) => FamilyKind::NewtonPowerN,
            Self::NewtonRationalQ(_) => FamilyKind::NewtonRationalQ,
        }
    }

    /// Resolve the role and coloring mode once for a whole job.
    pub fn evaluator(&self, plane: Plane, mode: ColoringMode) -> Evaluator<'_> {
        Evaluator {
            formula: self,
            entry: Entry::resolve(plane, mode),
        }
    }
}

impl Family for Formula {
    fn escape_julia(&self, z: Complex) -> Escape {
        dispatch!(self, f => f.escape_julia(z))
    }

    fn escape_mandelbrot(&self, c: Complex) -> Escape {
        dispatch!(self, f => f.escape_mandelbrot(c))
    }

    fn trap_julia(&self, z: Complex) -> f64 {
        dispatch!(self, f => f.trap_julia(z))
    }

    fn trap_mandelbrot(&self, c: Complex) -> f64 {
        dispatch!(self, f => f.trap_mandelbrot(c))
    }

    fn evaluate(&self, point: Complex, plane: Plane, mode: ColoringMode) -> f64 {
        dispatch!(self, f => f.evaluate(point, plane, mode))
    }
}

// ---------------------------------------------------------------------------
// Per-job evaluator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Count(Plane),
    Smooth(Plane),
    Trap(Plane),
}

impl Entry {
    fn resolve(plane: Plane, mode: ColoringMode) -> Self {
        match mode {
            ColoringMode::EscapeTime => Self::Count(plane),
            ColoringMode::SmoothEscape => Self::Smooth(plane),
            ColoringMode::OrbitTrap => Self::Trap(plane),
        }
    }
}

/// A formula bound to one role and coloring mode.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    formula: &'a Formula,
    entry: Entry,
}

impl Evaluator<'_> {
    #[inline]
    pub fn evaluate(&self, point: Complex) -> f64 {
        // One match on the family, then the loop runs monomorphized.
        dispatch!(self.formula, f => Self::run(f, self.entry, point))
    }

    #[inline(always)]
    fn run<F: Family>(f: &F, entry: Entry, point: Complex) -> f64 {
        match entry {
            Entry::Count(Plane::Julia) => f.escape_julia(point).count(),
            Entry::Count(Plane::Mandelbrot) => f.escape_mandelbrot(point).count(),
            Entry::Smooth(Plane::Julia) => f.escape_julia(point).smoothed(),
            Entry::Smooth(Plane::Mandelbrot) => f.escape_mandelbrot(point).smoothed(),
            Entry::Trap(Plane::Julia) => f.trap_julia(point),
            Entry::Trap(Plane::Mandelbrot) => f.trap_mandelbrot(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::orbit::OrbitMetric;

    #[test]
    fn builds_every_family() {
        for family in FamilyKind::ALL {
            let params = FractalParameters {
                family,
                power: 3,
                ..Default::default()
            };
            let f = Formula::new(&params).unwrap();
            assert_eq!(f.kind(), family);
        }
    }

    #[test]
    fn unknown_family_index_fails_fast() {
        let err = Formula::from_index(9, &FractalParameters::default()).unwrap_err();
        assert_eq!(err, CoreError::UnknownFamily(9));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = FractalParameters {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(Formula::new(&params).is_err());
    }

    #[test]
    fn evaluator_agrees_with_evaluate() {
        let points = [
            Complex::new(-0.75, 0.1),
            Complex::new(0.3, 0.5),
            Complex::new(1.5, -1.5),
            Complex::new(-0.1, 0.9),
        ];
        for family in FamilyKind::ALL {
            let params = FractalParameters {
                family,
                power: 4,
                q: Complex::new(0.2, 0.1),
                c: Complex::new(-0.5, 0.5),
                orbit_point: Complex::new(0.1, -0.2),
                orbit_metric: OrbitMetric::Manhattan,
                max_iterations: 60,
                ..Default::default()
            };
            let formula = Formula::new(&params).unwrap();
            for plane in [Plane::Julia, Plane::Mandelbrot] {
                for mode in [
                    ColoringMode::EscapeTime,
                    ColoringMode::SmoothEscape,
                    ColoringMode::OrbitTrap,
                ] {
                    let ev = formula.evaluator(plane, mode);
                    for &p in &points {
                        assert_eq!(
                            ev.evaluate(p).to_bits(),
                            formula.evaluate(p, plane, mode).to_bits(),
                            "{family:?} {plane:?} {mode:?} at {p}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn escape_counts_bounded_by_max_iterations() {
        for family in FamilyKind::ALL {
            let params = FractalParameters {
                family,
                power: 3,
                max_iterations: 40,
                q: Complex::new(0.3, 0.0),
                ..Default::default()
            };
            let formula = Formula::new(&params).unwrap();
            for i in 0..25 {
                for j in 0..25 {
                    let p = Complex::new(-2.0 + i as f64 * 0.16, -2.0 + j as f64 * 0.16);
                    for plane in [Plane::Julia, Plane::Mandelbrot] {
                        let v = formula.evaluate(p, plane, ColoringMode::EscapeTime);
                        assert!((0.0..=40.0).contains(&v), "{family:?} {plane:?} {p}: {v}");
                    }
                }
            }
        }
    }
}
