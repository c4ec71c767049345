use thiserror::Error;

/// Errors originating from the rendering pipeline, the coordinator and the
/// file formats.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("scalar field has {actual} values, expected {expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },

    #[error("unknown gradient preset index {0} (expected 0..=11)")]
    UnknownPreset(u32),

    #[error("invalid session record: {reason}")]
    InvalidSessionRecord { reason: String },

    #[error("unsupported session record version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid raw field: {reason}")]
    InvalidRawField { reason: String },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] orbitfield_core::CoreError),
}
