//! Inkplot Render Library
//!
//! Backend renderers for inkplot draw commands. [`Renderer`] replays a
//! [`DrawHandler`](inkplot_core::DrawHandler) buffer onto any
//! [`RenderSurface`]; surfaces exist for an interactive Vello canvas, a PDF
//! page and an in-memory recording.

mod error;
pub mod geometry;
mod image_data;
pub mod pdf;
pub mod recording;
mod renderer;
mod surface;

#[cfg(feature = "vello-renderer")]
mod canvas;

pub use error::{CapabilityWarning, RenderResult, RendererError};
pub use image_data::{decode_payload, decode_rgba};
pub use pdf::{PdfFont, PdfMetrics, PdfSurface};
pub use recording::{RecordingSurface, SurfaceOp};
pub use renderer::{Renderer, ReplayReport};
pub use surface::{RenderSurface, SurfaceCapabilities};

#[cfg(feature = "vello-renderer")]
pub use canvas::{CanvasSurface, ParleyMetrics};
