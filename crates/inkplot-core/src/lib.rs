//! Inkplot Core Library
//!
//! Backend-agnostic part of the deferred drawing engine: style state, theme
//! resolution, layered draw command buffering and the primitive drawing API
//! that diagram elements call.

pub mod color;
pub mod command;
pub mod config;
pub mod error;
pub mod figures;
pub mod handler;
pub mod style;
pub mod text;
pub mod theme;
pub mod zoom;

pub use color::StyleColor;
pub use command::{DrawBuffer, DrawCommand, Layer, Primitive};
pub use config::DrawConfig;
pub use error::{StyleError, StyleResult};
pub use handler::{DrawHandler, Replay, StyleOverrides};
pub use style::{LineType, Style};
pub use text::{
    AlignHorizontal, ApproximateMetrics, FormatLabel, MarkupAnalyzer, PlainMarkup, SimpleMarkup,
    StyledText, TextMetrics,
};
pub use theme::{ColorStyle, Theme, Transparency, BACKGROUND_COLOR_KEY, FOREGROUND_COLOR_KEY};
pub use zoom::ZoomContext;
