//! Narrow drawing-context interface implemented by every backend.

use crate::error::RenderResult;
use inkplot_core::{AlignHorizontal, StyleColor, StyledText};
use kurbo::{Affine, Point, Rect};

/// What a surface can and cannot express. Queried once per renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    /// `move_to` continues the current path instead of starting a new one.
    pub path_continuity_across_move_to: bool,
    /// [`RenderSurface::fill_and_stroke`] is a single native operation.
    pub combined_fill_stroke: bool,
    /// The path survives a fill, so it can be stroked afterwards.
    pub stroke_after_fill: bool,
    /// Tab characters have a glyph in the surface fonts.
    pub tab_glyph: bool,
}

impl SurfaceCapabilities {
    /// An HTML-canvas-like context.
    pub const CANVAS: Self = Self {
        path_continuity_across_move_to: true,
        combined_fill_stroke: false,
        stroke_after_fill: true,
        tab_glyph: true,
    };

    /// A PDF-like print context.
    pub const PRINT: Self = Self {
        path_continuity_across_move_to: false,
        combined_fill_stroke: true,
        stroke_after_fill: false,
        tab_glyph: false,
    };
}

/// A 2D drawing context with canvas semantics: y grows downwards, path
/// points are transformed when they are added, angles are in radians.
pub trait RenderSurface {
    fn capabilities(&self) -> SurfaceCapabilities;

    /// Push the graphics state (transform, colors, line and font settings).
    fn save(&mut self);
    fn restore(&mut self);
    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);
    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, c: Point, p: Point);
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
    /// Circular arc around `center`, connected to the current point if any.
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool);
    fn close_path(&mut self);
    fn rect(&mut self, rect: Rect);

    fn fill(&mut self) -> RenderResult<()>;
    fn stroke(&mut self) -> RenderResult<()>;
    /// Fill the current path and stroke its outline, sequenced the way the
    /// surface requires.
    fn fill_and_stroke(&mut self) -> RenderResult<()>;

    fn set_fill_color(&mut self, color: StyleColor);
    fn set_stroke_color(&mut self, color: StyleColor);
    fn set_line_width(&mut self, width: f64);
    /// Dash pattern of alternating on/off lengths; empty means solid.
    fn set_line_dash(&mut self, segments: &[f64]) -> RenderResult<()>;

    fn set_font(&mut self, size: f64, text: &StyledText);
    /// Width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;
    fn set_text_align(&mut self, align: AlignHorizontal);
    /// Draw `text` with its baseline at `at.y`, anchored per the text align.
    fn fill_text(&mut self, text: &str, at: Point) -> RenderResult<()>;

    /// Draw a base64 encoded image stretched to `rect`.
    fn draw_image(&mut self, data: &str, rect: Rect) -> RenderResult<()>;
}
