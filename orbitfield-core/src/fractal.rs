use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::orbit::OrbitMetric;
use crate::viewport::Viewport;

/// Newton families stop once successive iterates move less than this along
/// both axes.
pub const CONVERGENCE_EPSILON: f64 = 1e-7;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// The closed set of formula families.
///
/// Discriminants are the wire indices used by the session record and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    /// Quadratic map with a rational correction driven by `q`.
    RationalQ = 0,
    /// `z ← z² + c`.
    #[default]
    Quadratic = 1,
    /// `z ← zⁿ + c`.
    PowerN = 2,
    /// Newton's method on `zⁿ + c`.
    NewtonPowerN = 3,
    /// Newton's method on `zⁿ + q·z + c`.
    NewtonRationalQ = 4,
}

impl FamilyKind {
    pub const ALL: [Self; 5] = [
        Self::RationalQ,
        Self::Quadratic,
        Self::PowerN,
        Self::NewtonPowerN,
        Self::NewtonRationalQ,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Whether the family reads the integer power `n`.
    pub fn uses_power(self) -> bool {
        matches!(
            self,
            Self::PowerN | Self::NewtonPowerN | Self::NewtonRationalQ
        )
    }

    /// Whether iteration stops on convergence rather than escape.
    pub fn is_newton(self) -> bool {
        matches!(self, Self::NewtonPowerN | Self::NewtonRationalQ)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RationalQ => "Rational Q",
            Self::Quadratic => "Quadratic",
            Self::PowerN => "Power N",
            Self::NewtonPowerN => "Newton power N",
            Self::NewtonRationalQ => "Newton rational Q",
        }
    }
}

impl TryFrom<u32> for FamilyKind {
    type Error = CoreError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(CoreError::UnknownFamily(index))
    }
}

/// Which role the varying input point plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    /// The input point supplies the map's parameter.
    #[default]
    Mandelbrot,
    /// The input point is the starting state; the parameter is fixed.
    Julia,
}

impl Plane {
    pub fn is_mandelbrot(self) -> bool {
        self == Self::Mandelbrot
    }

    pub fn from_mandelbrot_flag(mandelbrot: bool) -> Self {
        if mandelbrot {
            Self::Mandelbrot
        } else {
            Self::Julia
        }
    }
}

/// What scalar each pixel receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColoringMode {
    /// Integer escape (or convergence) count.
    #[default]
    EscapeTime = 0,
    /// Continuous count `k + 1 − ln(log2|z|²)` for escape families.
    SmoothEscape = 1,
    /// Running minimum of the orbit metric.
    OrbitTrap = 2,
}

impl ColoringMode {
    pub fn index(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ColoringMode {
    type Error = CoreError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::EscapeTime),
            1 => Ok(Self::SmoothEscape),
            2 => Ok(Self::OrbitTrap),
            other => Err(CoreError::UnknownColoringMode(other)),
        }
    }
}

/// How rational and Newton steps treat a vanishing denominator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DenominatorPolicy {
    /// Divide as-is; non-finite results flow into the field.
    #[default]
    Propagate,
    /// Replace denominators smaller than `min_magnitude` by `±min_magnitude`.
    Clamp { min_magnitude: f64 },
}

impl DenominatorPolicy {
    /// Apply to a signed scalar denominator. Zero maps to `+min_magnitude`.
    #[inline]
    pub fn scalar(self, d: f64) -> f64 {
        match self {
            Self::Propagate => d,
            Self::Clamp { min_magnitude } => {
                if d.abs() < min_magnitude {
                    if d < 0.0 {
                        -min_magnitude
                    } else {
                        min_magnitude
                    }
                } else {
                    d
                }
            }
        }
    }

    /// Apply to a squared magnitude `|d|²`.
    #[inline]
    pub fn squared(self, d2: f64) -> f64 {
        match self {
            Self::Propagate => d2,
            Self::Clamp { min_magnitude } => d2.max(min_magnitude * min_magnitude),
        }
    }

    fn validate(self) -> crate::Result<()> {
        match self {
            Self::Propagate => Ok(()),
            Self::Clamp { min_magnitude } => {
                if min_magnitude > 0.0 && min_magnitude.is_finite() {
                    Ok(())
                } else {
                    Err(CoreError::InvalidDenominatorClamp(min_magnitude))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Everything needed to compute one scalar field.
///
/// A plain value: the coordinator copies it per submission and every formula
/// derives its own constants from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParameters {
    pub family: FamilyKind,
    pub max_iterations: u32,
    /// Escape radius; the loops compare `|z|²` against `max_norm²`.
    pub max_norm: f64,
    pub c: Complex,
    pub q: Complex,
    /// Anchor point of the orbit trap.
    pub orbit_point: Complex,
    pub plane: Plane,
    pub coloring: ColoringMode,
    pub orbit_metric: OrbitMetric,
    /// Integer power `n` for the power and Newton families.
    pub power: u32,
    pub viewport: Viewport,
    pub denominator: DenominatorPolicy,
}

impl FractalParameters {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
    pub const DEFAULT_MAX_NORM: f64 = 2.0;
    pub const DEFAULT_POWER: u32 = 2;

    /// Check every invariant a formula relies on.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if self.max_norm <= 0.0 || !self.max_norm.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(self.max_norm));
        }
        if self.family.uses_power() && self.power < 2 {
            return Err(CoreError::InvalidPower(self.power));
        }
        self.viewport.validate()?;
        self.denominator.validate()
    }

    /// Squared escape radius.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.max_norm * self.max_norm
    }

    pub fn with_family(self, family: FamilyKind) -> Self {
        Self { family, ..self }
    }

}

impl Default for FractalParameters {
    fn default() -> Self {
        Self {
            family: FamilyKind::default(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            max_norm: Self::DEFAULT_MAX_NORM,
            c: Complex::ZERO,
            q: Complex::ZERO,
            orbit_point: Complex::ZERO,
            plane: Plane::default(),
            coloring: ColoringMode::default(),
            orbit_metric: OrbitMetric::default(),
            power: Self::DEFAULT_POWER,
            viewport: Viewport::default_mandelbrot(800, 600),
            denominator: DenominatorPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Iteration limits shared by every family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bailout {
    pub max_iterations: u32,
    /// `max_norm²`.
    pub threshold: f64,
}

impl Bailout {
    pub fn new(params: &FractalParameters) -> Self {
        Self {
            max_iterations: params.max_iterations,
            threshold: params.threshold(),
        }
    }
}

/// Outcome of an escape-time or convergence loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escape {
    pub iterations: u32,
    /// `|z|²` when the orbit crossed the threshold, `None` otherwise.
    pub norm_sq: Option<f64>,
}

impl Escape {
    #[inline]
    pub fn escaped(iterations: u32, norm_sq: f64) -> Self {
        Self {
            iterations,
            norm_sq: Some(norm_sq),
        }
    }

    #[inline]
    pub fn bounded(iterations: u32) -> Self {
        Self {
            iterations,
            norm_sq: None,
        }
    }

    #[inline]
    pub fn count(self) -> f64 {
        self.iterations as f64
    }

    /// Continuous count `k + 1 − ln(log2|z|²)`.
    ///
    /// Falls back to the integer count when the orbit did not escape or when
    /// `|z|² ≤ 1` (the double logarithm is undefined there).
    #[inline]
    pub fn smoothed(self) -> f64 {
        match self.norm_sq {
            Some(norm_sq) => {
                let log2 = norm_sq.log2();
                if log2 <= 0.0 {
                    return self.count();
                }
                self.count() + 1.0 - log2.ln()
            }
            None => self.count(),
        }
    }
}

/// Implemented by each of the five formula families.
///
/// Designed for **static dispatch**: [`Formula`](crate::Formula) matches on
/// the family once per point and then calls straight into the concrete
/// type, so the iteration loops are monomorphized and inlined.
pub trait Family {
    /// Escape (or convergence) loop with the input point as starting state.
    fn escape_julia(&self, z: Complex) -> Escape;

    /// Escape (or convergence) loop with the input point as parameter.
    fn escape_mandelbrot(&self, c: Complex) -> Escape;

    /// Minimum orbit-trap distance, input point as starting state.
    fn trap_julia(&self, z: Complex) -> f64;

    /// Minimum orbit-trap distance, input point as parameter.
    fn trap_mandelbrot(&self, c: Complex) -> f64;

    /// The scalar for one point under the given role and coloring mode.
    #[inline]
    fn evaluate(&self, point: Complex, plane: Plane, mode: ColoringMode) -> f64 {
        match (mode, plane) {
            (ColoringMode::EscapeTime, Plane::Julia) => self.escape_julia(point).count(),
            (ColoringMode::EscapeTime, Plane::Mandelbrot) => self.escape_mandelbrot(point).count(),
            (ColoringMode::SmoothEscape, Plane::Julia) => self.escape_julia(point).smoothed(),
            (ColoringMode::SmoothEscape, Plane::Mandelbrot) => {
                self.escape_mandelbrot(point).smoothed()
            }
            (ColoringMode::OrbitTrap, Plane::Julia) => self.trap_julia(point),
            (ColoringMode::OrbitTrap, Plane::Mandelbrot) => self.trap_mandelbrot(point),
        }
    }
}
