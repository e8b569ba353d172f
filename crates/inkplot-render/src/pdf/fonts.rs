//! The base-14 Helvetica family and its glyph widths.

use inkplot_core::{FormatLabel, StyledText, TextMetrics};
use kurbo::Size;

/// Advance widths of Helvetica for the printable ASCII range 32..=126, in
/// 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..48
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..64
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..80
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..96
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..112
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..127
];

/// Advance widths of Helvetica-Bold for 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..48
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..64
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..80
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..96
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..112
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..127
];

/// Width used for characters outside the tables.
const DEFAULT_WIDTH: u16 = 556;

/// One of the four Helvetica faces. Oblique faces share the upright widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PdfFont {
    #[default]
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl PdfFont {
    pub const ALL: [PdfFont; 4] = [PdfFont::Regular, PdfFont::Bold, PdfFont::Oblique, PdfFont::BoldOblique];

    /// Face matching the bold and italic flags of a text run.
    pub fn for_text(text: &StyledText) -> Self {
        match (text.has(FormatLabel::Bold), text.has(FormatLabel::Italic)) {
            (false, false) => PdfFont::Regular,
            (true, false) => PdfFont::Bold,
            (false, true) => PdfFont::Oblique,
            (true, true) => PdfFont::BoldOblique,
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            PdfFont::Regular => "Helvetica",
            PdfFont::Bold => "Helvetica-Bold",
            PdfFont::Oblique => "Helvetica-Oblique",
            PdfFont::BoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Resource name inside the page.
    pub fn resource_name(self) -> &'static str {
        match self {
            PdfFont::Regular => "F1",
            PdfFont::Bold => "F2",
            PdfFont::Oblique => "F3",
            PdfFont::BoldOblique => "F4",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, PdfFont::Bold | PdfFont::BoldOblique)
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        let table = if self.is_bold() { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }

    /// Width of `text` at `font_size`.
    pub fn text_width(self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * font_size / 1000.0
    }
}

/// Encode `text` in WinAnsi. Latin-1 characters map to their own code,
/// anything else becomes `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Text metrics matching what [`PdfSurface`](super::PdfSurface) prints.
#[derive(Debug, Clone, Copy)]
pub struct PdfMetrics {
    pub default_font_size: f64,
}

impl Default for PdfMetrics {
    fn default() -> Self {
        Self { default_font_size: 12.0 }
    }
}

impl TextMetrics for PdfMetrics {
    fn text_dimension(&self, line: &StyledText, font_size: f64) -> Size {
        Size::new(PdfFont::for_text(line).text_width(line.text(), font_size), font_size)
    }

    fn default_font_size(&self) -> f64 {
        self.default_font_size
    }
}
