use thiserror::Error;

use orbitfield_core::CoreError;
use orbitfield_render::{RenderError, RequestId};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown gradient preset \"{0}\"")]
    UnknownPreset(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("render {request} failed: {source}")]
    RenderFailed {
        request: RequestId,
        #[source]
        source: RenderError,
    },

    #[error("render worker stopped before delivering a field")]
    WorkerStopped,

    #[error("invalid parameter file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
