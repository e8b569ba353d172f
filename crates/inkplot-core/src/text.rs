//! Styled text runs, markup analysis and text measurement.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Format flags of a text run.
///
/// Only `Underline` changes geometry; `Bold` and `Italic` select a font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatLabel {
    Underline,
    Bold,
    Italic,
}

/// A single line of text with its markup already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyledText {
    formats: BTreeSet<FormatLabel>,
    text: String,
}

impl StyledText {
    pub fn new(formats: impl IntoIterator<Item = FormatLabel>, text: impl Into<String>) -> Self {
        Self {
            formats: formats.into_iter().collect(),
            text: text.into(),
        }
    }

    /// Unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new([], text)
    }

    /// The text without markup.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn formats(&self) -> &BTreeSet<FormatLabel> {
        &self.formats
    }

    pub fn has(&self, label: FormatLabel) -> bool {
        self.formats.contains(&label)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Horizontal anchoring of a text line relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignHorizontal {
    #[default]
    Left,
    Center,
    Right,
}

/// Turns one line of annotated text into a [`StyledText`].
pub trait MarkupAnalyzer: Send + Sync {
    fn analyze_line(&self, line: &str) -> StyledText;
}

/// Analyzer that keeps every line verbatim and unformatted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkup;

impl MarkupAnalyzer for PlainMarkup {
    fn analyze_line(&self, line: &str) -> StyledText {
        StyledText::plain(line)
    }
}

/// Minimal analyzer for whole-line format markers.
///
/// `*bold*`, `/italic/` and `_underline_` may be nested in any order around
/// the complete line. A marker preceded by `\` is literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMarkup;

const MARKERS: [(char, FormatLabel); 3] = [
    ('*', FormatLabel::Bold),
    ('/', FormatLabel::Italic),
    ('_', FormatLabel::Underline),
];

impl SimpleMarkup {
    fn strip_marker(line: &str, marker: char) -> Option<&str> {
        let inner = line.strip_prefix(marker)?.strip_suffix(marker)?;
        if inner.ends_with('\\') {
            return None;
        }
        Some(inner)
    }

    fn unescape(line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    if next == '\\' || MARKERS.iter().any(|(m, _)| *m == next) {
                        out.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            out.push(c);
        }
        out
    }
}

impl MarkupAnalyzer for SimpleMarkup {
    fn analyze_line(&self, line: &str) -> StyledText {
        let mut formats = BTreeSet::new();
        let mut rest = line;
        'outer: loop {
            for (marker, label) in MARKERS {
                if rest.chars().count() < 2 {
                    break 'outer;
                }
                if let Some(inner) = Self::strip_marker(rest, marker) {
                    formats.insert(label);
                    rest = inner;
                    continue 'outer;
                }
            }
            break;
        }
        StyledText {
            formats,
            text: Self::unescape(rest),
        }
    }
}

/// Backend-specific text measurement.
///
/// Implementations must leave any backend drawing state (such as the current
/// font) exactly as they found it.
pub trait TextMetrics: Send {
    /// Rendered size of a single line at `font_size`.
    fn text_dimension(&self, line: &StyledText, font_size: f64) -> Size;

    /// Font size a freshly reset style uses.
    fn default_font_size(&self) -> f64 {
        12.0
    }
}

/// Width estimate of 0.6 em per character, height equal to the font size.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMetrics {
    pub char_width_em: f64,
    pub default_font_size: f64,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            char_width_em: 0.6,
            default_font_size: 12.0,
        }
    }
}

impl TextMetrics for ApproximateMetrics {
    fn text_dimension(&self, line: &StyledText, font_size: f64) -> Size {
        let chars = line.text().chars().count() as f64;
        let bold = if line.has(FormatLabel::Bold) { 1.1 } else { 1.0 };
        Size::new(chars * font_size * self.char_width_em * bold, font_size)
    }

    fn default_font_size(&self) -> f64 {
        self.default_font_size
    }
}
