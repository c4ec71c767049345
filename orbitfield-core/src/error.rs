use thiserror::Error;

/// Errors originating from the core formula engine.
///
/// Every variant is a configuration error: it is raised while building a
/// formula, before any point is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius: {0} (must be > 0.0 and finite)")]
    InvalidEscapeRadius(f64),

    #[error("invalid power: {0} (must be >= 2)")]
    InvalidPower(u32),

    #[error("unknown fractal family index {0} (expected 0..=4)")]
    UnknownFamily(u32),

    #[error("unknown orbit metric index {0} (expected 0..=14)")]
    UnknownOrbitMetric(u32),

    #[error("unknown coloring mode index {0} (expected 0..=2)")]
    UnknownColoringMode(u32),

    #[error("invalid denominator clamp: {0} (must be > 0.0 and finite)")]
    InvalidDenominatorClamp(f64),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}
