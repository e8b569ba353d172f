//! Style state and snapshots.

use crate::color::StyleColor;
use crate::error::StyleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stroke pattern of lines and outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DotDashed,
    DotDotDashed,
}

impl LineType {
    /// Markup token for this line type (as used in `lt=` style lines).
    pub fn token(self) -> &'static str {
        match self {
            LineType::Solid => "-",
            LineType::Dashed => ".",
            LineType::Dotted => "..",
            LineType::DotDashed => "-.",
            LineType::DotDotDashed => "-..",
        }
    }

    /// Lenient parse: unknown tokens fall back to [`LineType::Solid`].
    pub fn from_token(token: &str) -> Self {
        token.parse().unwrap_or_else(|err| {
            log::debug!("{err}, using solid line");
            LineType::Solid
        })
    }
}

impl FromStr for LineType {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let by_token = [
            LineType::Solid,
            LineType::Dashed,
            LineType::Dotted,
            LineType::DotDashed,
            LineType::DotDotDashed,
        ]
        .into_iter()
        .find(|lt| lt.token() == s);
        if let Some(lt) = by_token {
            return Ok(lt);
        }
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "solid" => Ok(LineType::Solid),
            "dashed" => Ok(LineType::Dashed),
            "dotted" => Ok(LineType::Dotted),
            "dotdashed" => Ok(LineType::DotDashed),
            "dotdotdashed" => Ok(LineType::DotDotDashed),
            _ => Err(StyleError::UnknownLineType(s.to_string())),
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Drawing style: colors, line settings and font size.
///
/// The handler mutates one `Style` as its current style; every primitive call
/// clones it, so a command's style never changes after it was enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    foreground: StyleColor,
    background: StyleColor,
    line_width: f64,
    line_type: LineType,
    font_size: f64,
    /// Set while the background is the theme default rather than an
    /// explicitly chosen color or transparency.
    #[serde(default)]
    default_background: bool,
}

impl Style {
    pub fn new(
        foreground: StyleColor,
        background: StyleColor,
        line_width: f64,
        line_type: LineType,
        font_size: f64,
    ) -> Self {
        Self {
            foreground,
            background,
            line_width,
            line_type,
            font_size,
            default_background: false,
        }
    }

    pub fn foreground(&self) -> StyleColor {
        self.foreground
    }

    pub fn background(&self) -> StyleColor {
        self.background
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Whether outlines are stroked at all.
    pub fn has_outline(&self) -> bool {
        self.line_width > 0.0
    }

    pub(crate) fn set_foreground(&mut self, color: StyleColor) {
        self.foreground = color;
    }

    /// Whether the background still is the theme default.
    pub fn has_default_background(&self) -> bool {
        self.default_background
    }

    pub(crate) fn set_background(&mut self, color: StyleColor) {
        self.background = color;
        self.default_background = false;
    }

    pub(crate) fn set_default_background(&mut self, color: StyleColor) {
        self.background = color;
        self.default_background = true;
    }

    pub(crate) fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    pub(crate) fn set_line_type(&mut self, line_type: LineType) {
        self.line_type = line_type;
    }

    pub(crate) fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }
}
