//! Theme color lookup.
//!
//! A theme is passed explicitly to every [`DrawHandler`](crate::DrawHandler);
//! there is no process-wide "current theme".

use crate::color::StyleColor;
use serde::{Deserialize, Serialize};

/// Token that resolves to the theme's default foreground color.
pub const FOREGROUND_COLOR_KEY: &str = "fg";
/// Token that resolves to the theme's default background color.
pub const BACKGROUND_COLOR_KEY: &str = "bg";

/// Named color roles a theme provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorStyle {
    DefaultForeground,
    DefaultBackground,
    SelectionForeground,
    SelectionBackground,
}

/// Alpha presets applied to parsed color literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transparency {
    Foreground,
    FullTransparent,
    Background,
    SelectionBackground,
}

impl Transparency {
    pub fn alpha(self) -> u8 {
        match self {
            Transparency::Foreground => 255,
            Transparency::FullTransparent => 0,
            Transparency::Background => 125,
            Transparency::SelectionBackground => 20,
        }
    }
}

/// Color table for one visual theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub default_foreground: StyleColor,
    pub default_background: StyleColor,
    pub selection_foreground: StyleColor,
    pub selection_background: StyleColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    /// Black on transparent white, blue selection.
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            default_foreground: StyleColor::black(),
            default_background: StyleColor::white().with_alpha(Transparency::FullTransparent.alpha()),
            selection_foreground: StyleColor::rgb(0, 0, 255),
            selection_background: StyleColor::rgb(0, 0, 255).with_alpha(Transparency::SelectionBackground.alpha()),
        }
    }

    /// Light gray on transparent black, amber selection.
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            default_foreground: StyleColor::rgb(220, 220, 220),
            default_background: StyleColor::black().with_alpha(Transparency::FullTransparent.alpha()),
            selection_foreground: StyleColor::rgb(255, 200, 0),
            selection_background: StyleColor::rgb(255, 200, 0).with_alpha(Transparency::SelectionBackground.alpha()),
        }
    }

    /// Parse a theme from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get_color(&self, style: ColorStyle) -> StyleColor {
        match style {
            ColorStyle::DefaultForeground => self.default_foreground,
            ColorStyle::DefaultBackground => self.default_background,
            ColorStyle::SelectionForeground => self.selection_foreground,
            ColorStyle::SelectionBackground => self.selection_background,
        }
    }

    /// Resolve a color literal with the given alpha.
    ///
    /// Returns `None` when the literal is not a valid color.
    pub fn for_string(&self, literal: &str, alpha: u8) -> Option<StyleColor> {
        StyleColor::parse(literal, alpha)
    }
}
