pub mod buffer;
pub mod color;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod gradient;
pub mod presets;
pub mod renderer;
pub mod scalar_field;
pub mod session;

pub use buffer::RenderBuffer;
pub use color::{Hsv, Rgba};
pub use coordinator::{RenderCoordinator, RenderEvent, RequestId};
pub use error::RenderError;
pub use export::{export_png, load_raw, read_raw, save_raw, write_raw, ExportMetadata};
pub use gradient::{ColorGradient, Interpolation, StopPosition};
pub use presets::GradientPreset;
pub use renderer::{render, render_field, RenderCancel, RenderResult};
pub use scalar_field::ScalarField;
pub use session::{DisplaySettings, SessionRecord};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
