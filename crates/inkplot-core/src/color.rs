//! Color value type used by style snapshots.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// RGBA8 color with an explicit alpha channel.
///
/// Alpha 0 is fully transparent, 255 fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Color names accepted by [`StyleColor::parse`].
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("blue", (0, 0, 255)),
    ("cyan", (0, 255, 255)),
    ("dark_gray", (64, 64, 64)),
    ("gray", (128, 128, 128)),
    ("green", (0, 255, 0)),
    ("light_gray", (192, 192, 192)),
    ("magenta", (255, 0, 255)),
    ("orange", (255, 200, 0)),
    ("pink", (255, 175, 175)),
    ("red", (255, 0, 0)),
    ("white", (255, 255, 255)),
    ("yellow", (255, 255, 0)),
];

impl StyleColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with a different alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha_f64(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Parse a color literal.
    ///
    /// Accepts the names in the built-in table (case-insensitive, `-` and `_`
    /// interchangeable), `#rgb`, `#rrggbb` and `#rrggbbaa`. Forms without an
    /// alpha component get `alpha`. Returns `None` for anything else so callers
    /// can fall back to a default.
    pub fn parse(literal: &str, alpha: u8) -> Option<Self> {
        let literal = literal.trim();
        if let Some(hex) = literal.strip_prefix('#') {
            return Self::parse_hex(hex, alpha);
        }
        let name = literal.to_ascii_lowercase().replace('-', "_");
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, (r, g, b))| Self::new(*r, *g, *b, alpha))
    }

    fn parse_hex(hex: &str, alpha: u8) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut channels = hex.chars().filter_map(|c| c.to_digit(16)).map(|d| (d * 17) as u8);
                Some(Self::new(channels.next()?, channels.next()?, channels.next()?, alpha))
            }
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, alpha)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// CSS-style `#rrggbbaa` representation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for StyleColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<StyleColor> for Color {
    fn from(color: StyleColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
