//! Styling errors.

use thiserror::Error;

/// Errors raised by style setters when a value leaves its valid domain.
///
/// These are recoverable: the setter leaves the previous value in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("value must be >={min} and <={max}, got {value}")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("The transparency value must be between 0 and 100, got {0}")]
    Transparency(f64),
    #[error("Unknown line type: {0}")]
    UnknownLineType(String),
}

/// Result type for style operations.
pub type StyleResult<T> = Result<T, StyleError>;
