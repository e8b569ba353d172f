//! A surface that records every call, for inspecting replay output.

use crate::error::{RenderResult, RendererError};
use crate::image_data;
use crate::surface::{RenderSurface, SurfaceCapabilities};
use inkplot_core::{AlignHorizontal, ApproximateMetrics, StyleColor, StyledText, TextMetrics};
use kurbo::{Affine, Point, Rect};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Save,
    Restore,
    SetTransform(Affine),
    Translate(f64, f64),
    Scale(f64, f64),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    ClosePath,
    Rect(Rect),
    Fill,
    Stroke,
    FillAndStroke,
    SetFillColor(StyleColor),
    SetStrokeColor(StyleColor),
    SetLineWidth(f64),
    SetLineDash(Vec<f64>),
    SetFont(f64, StyledText),
    SetTextAlign(AlignHorizontal),
    FillText(String, Point),
    DrawImage(Rect),
}

/// Records calls verbatim, in untransformed coordinates.
///
/// Capabilities are configurable, and the surface enforces them: painting a
/// path that was already filled fails when `stroke_after_fill` is off, and
/// dash patterns fail when dash support is switched off.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    capabilities: SurfaceCapabilities,
    dash_support: bool,
    path_filled: bool,
    font_size: f64,
    font: StyledText,
    metrics: ApproximateMetrics,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// A surface with canvas capabilities.
    pub fn new() -> Self {
        Self::with_capabilities(SurfaceCapabilities::CANVAS)
    }

    pub fn with_capabilities(capabilities: SurfaceCapabilities) -> Self {
        Self {
            ops: Vec::new(),
            capabilities,
            dash_support: true,
            path_filled: false,
            font_size: 12.0,
            font: StyledText::default(),
            metrics: ApproximateMetrics::default(),
        }
    }

    /// Reject every non-empty dash pattern.
    pub fn without_dash_support(mut self) -> Self {
        self.dash_support = false;
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    fn paint(&mut self, op: SurfaceOp) -> RenderResult<()> {
        if self.path_filled {
            return Err(RendererError::Unsupported("painting a path after it was filled"));
        }
        if matches!(op, SurfaceOp::Fill | SurfaceOp::FillAndStroke) && !self.capabilities.stroke_after_fill {
            self.path_filled = true;
        }
        self.ops.push(op);
        Ok(())
    }
}

impl RenderSurface for RecordingSurface {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    fn save(&mut self) {
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(SurfaceOp::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.ops.push(SurfaceOp::SetTransform(transform));
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(SurfaceOp::Translate(x, y));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(SurfaceOp::Scale(sx, sy));
    }

    fn begin_path(&mut self) {
        self.path_filled = false;
        self.ops.push(SurfaceOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.ops.push(SurfaceOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(SurfaceOp::LineTo(p));
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        self.ops.push(SurfaceOp::QuadTo(c, p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.ops.push(SurfaceOp::CurveTo(c1, c2, p));
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        self.ops.push(SurfaceOp::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn close_path(&mut self) {
        self.ops.push(SurfaceOp::ClosePath);
    }

    fn rect(&mut self, rect: Rect) {
        self.ops.push(SurfaceOp::Rect(rect));
    }

    fn fill(&mut self) -> RenderResult<()> {
        self.paint(SurfaceOp::Fill)
    }

    fn stroke(&mut self) -> RenderResult<()> {
        self.paint(SurfaceOp::Stroke)
    }

    fn fill_and_stroke(&mut self) -> RenderResult<()> {
        self.paint(SurfaceOp::FillAndStroke)
    }

    fn set_fill_color(&mut self, color: StyleColor) {
        self.ops.push(SurfaceOp::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: StyleColor) {
        self.ops.push(SurfaceOp::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(SurfaceOp::SetLineWidth(width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> RenderResult<()> {
        if !segments.is_empty() && !self.dash_support {
            return Err(RendererError::Unsupported("dash patterns"));
        }
        self.ops.push(SurfaceOp::SetLineDash(segments.to_vec()));
        Ok(())
    }

    fn set_font(&mut self, size: f64, text: &StyledText) {
        self.font_size = size;
        self.font = StyledText::new(text.formats().iter().copied(), "");
        self.ops.push(SurfaceOp::SetFont(size, text.clone()));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        let line = StyledText::new(self.font.formats().iter().copied(), text);
        self.metrics.text_dimension(&line, self.font_size).width
    }

    fn set_text_align(&mut self, align: AlignHorizontal) {
        self.ops.push(SurfaceOp::SetTextAlign(align));
    }

    fn fill_text(&mut self, text: &str, at: Point) -> RenderResult<()> {
        self.ops.push(SurfaceOp::FillText(text.to_string(), at));
        Ok(())
    }

    fn draw_image(&mut self, data: &str, rect: Rect) -> RenderResult<()> {
        image_data::decode_payload(data)?;
        self.ops.push(SurfaceOp::DrawImage(rect));
        Ok(())
    }
}
