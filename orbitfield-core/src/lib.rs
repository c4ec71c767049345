pub mod complex;
pub mod error;
pub mod formula;
pub mod fractal;
pub mod newton_power;
pub mod newton_rational;
pub mod orbit;
pub mod power;
pub mod power_n;
pub mod quadratic;
pub mod rational_q;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use formula::{Evaluator, Formula};
pub use fractal::{
    ColoringMode, DenominatorPolicy, Escape, Family, FamilyKind, FractalParameters, Plane,
};
pub use newton_power::NewtonPowerN;
pub use newton_rational::NewtonRationalQ;
pub use orbit::{OrbitMetric, OrbitTrap};
pub use power_n::PowerN;
pub use quadratic::Quadratic;
pub use rational_q::RationalQ;
pub use viewport::{Area, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
