//! Render errors and capability warnings.

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Unsupported by this surface: {0}")]
    Unsupported(&'static str),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A surface feature that was requested but not available. Rendering fell
/// back to the nearest supported behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityWarning {
    /// Dashed and dotted lines were drawn solid.
    DashPatterns,
}

impl CapabilityWarning {
    /// Text suitable for a non-blocking user notification.
    pub fn message(&self) -> &'static str {
        match self {
            CapabilityWarning::DashPatterns => {
                "Dashed and dotted lines are shown as solid lines on this output"
            }
        }
    }
}
