//! Vello-based interactive canvas surface.

use crate::error::RenderResult;
use crate::geometry;
use crate::image_data;
use crate::renderer::Renderer;
use crate::surface::{RenderSurface, SurfaceCapabilities};
use inkplot_core::{AlignHorizontal, FormatLabel, StyleColor, StyledText, TextMetrics};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Size, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use vello::Scene;

/// Font family used for all text.
const FONT_FAMILY: &str = "sans-serif";

#[derive(Debug, Clone)]
struct CanvasState {
    transform: Affine,
    fill: Color,
    stroke: Color,
    line_width: f64,
    dash: Vec<f64>,
    font_size: f64,
    bold: bool,
    italic: bool,
    align: AlignHorizontal,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            dash: Vec::new(),
            font_size: 12.0,
            bold: false,
            italic: false,
            align: AlignHorizontal::Left,
        }
    }
}

/// Lay out a single line of text with Parley.
fn build_layout(
    font_cx: &mut FontContext,
    layout_cx: &mut LayoutContext<Brush>,
    text: &str,
    font_size: f64,
    bold: bool,
    italic: bool,
    brush: Brush,
) -> Layout<Brush> {
    let mut builder = layout_cx.ranged_builder(font_cx, text, 1.0, false);
    builder.push_default(StyleProperty::FontSize(font_size as f32));
    builder.push_default(StyleProperty::Brush(brush));
    builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(FONT_FAMILY.into())));
    if bold {
        builder.push_default(StyleProperty::FontWeight(parley::FontWeight::BOLD));
    }
    if italic {
        builder.push_default(StyleProperty::FontStyle(parley::FontStyle::Italic));
    }
    let mut layout = builder.build(text);
    layout.break_all_lines(None);
    layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
    layout
}

/// A [`RenderSurface`] that records into a Vello [`Scene`].
///
/// Path points are transformed when they are added, so painting always uses
/// the identity transform and line widths are scaled explicitly.
pub struct CanvasSurface {
    scene: Scene,
    state: CanvasState,
    stack: Vec<CanvasState>,
    path: BezPath,
    /// Current point and start of the current sub-path, in device space.
    current: Option<Point>,
    subpath_start: Option<Point>,
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
    /// Decoded images keyed by a hash of their payload.
    image_cache: HashMap<u64, peniko::ImageData>,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            state: CanvasState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            current: None,
            subpath_start: None,
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Clear the scene and graphics state for a fresh frame. The image cache
    /// is kept.
    pub fn reset(&mut self) {
        self.scene.reset();
        self.state = CanvasState::default();
        self.stack.clear();
        self.clear_path();
    }

    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn clear_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
        self.subpath_start = None;
    }

    fn transform_scale(&self) -> f64 {
        self.state.transform.determinant().abs().sqrt()
    }

    fn device(&self, p: Point) -> Point {
        self.state.transform * p
    }

    fn layout(&mut self, text: &str) -> Layout<Brush> {
        build_layout(
            &mut self.font_cx,
            &mut self.layout_cx,
            text,
            self.state.font_size,
            self.state.bold,
            self.state.italic,
            Brush::Solid(self.state.fill),
        )
    }

    fn image(&mut self, data: &str) -> RenderResult<peniko::ImageData> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let key = hasher.finish();
        if let Some(cached) = self.image_cache.get(&key) {
            return Ok(cached.clone());
        }
        let rgba = image_data::decode_rgba(data)?;
        let (width, height) = rgba.dimensions();
        let image = peniko::ImageData {
            data: peniko::Blob::new(Arc::new(rgba.into_vec())),
            format: peniko::ImageFormat::Rgba8,
            width,
            height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        };
        self.image_cache.insert(key, image.clone());
        Ok(image)
    }
}

impl Renderer<CanvasSurface> {
    /// Start a fresh frame on the canvas. The base scale is installed again
    /// on the next pass.
    pub fn reset_frame(&mut self) {
        self.surface_mut().reset();
        self.invalidate_scaling();
    }
}

impl RenderSurface for CanvasSurface {
    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::CANVAS
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::debug!("restore without matching save"),
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate((x, y));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    fn begin_path(&mut self) {
        self.clear_path();
    }

    fn move_to(&mut self, p: Point) {
        let p = self.device(p);
        self.path.move_to(p);
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        let p = self.device(p);
        self.path.line_to(p);
        self.current = Some(p);
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c);
        }
        let (c, p) = (self.device(c), self.device(p));
        self.path.quad_to(c, p);
        self.current = Some(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        let (c1, c2, p) = (self.device(c1), self.device(c2), self.device(p));
        self.path.curve_to(c1, c2, p);
        self.current = Some(p);
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        let (start, segments) = geometry::arc_segments(center, radius, start_angle, end_angle, anticlockwise);
        self.line_to(start);
        for el in segments {
            match el {
                PathEl::LineTo(p) => self.line_to(p),
                PathEl::QuadTo(c, p) => self.quad_to(c, p),
                PathEl::CurveTo(c1, c2, p) => self.curve_to(c1, c2, p),
                PathEl::MoveTo(_) | PathEl::ClosePath => {}
            }
        }
    }

    fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.close_path();
            self.current = self.subpath_start;
        }
    }

    fn rect(&mut self, rect: Rect) {
        self.move_to(Point::new(rect.x0, rect.y0));
        self.line_to(Point::new(rect.x1, rect.y0));
        self.line_to(Point::new(rect.x1, rect.y1));
        self.line_to(Point::new(rect.x0, rect.y1));
        self.close_path();
    }

    fn fill(&mut self) -> RenderResult<()> {
        if !self.path.elements().is_empty() {
            self.scene.fill(Fill::NonZero, Affine::IDENTITY, self.state.fill, None, &self.path);
        }
        Ok(())
    }

    fn stroke(&mut self) -> RenderResult<()> {
        if self.path.elements().is_empty() || self.state.line_width <= 0.0 {
            return Ok(());
        }
        let scale = self.transform_scale();
        let mut stroke = Stroke::new(self.state.line_width * scale);
        if !self.state.dash.is_empty() {
            stroke = stroke.with_dashes(0.0, self.state.dash.iter().map(|d| d * scale));
        }
        self.scene.stroke(&stroke, Affine::IDENTITY, self.state.stroke, None, &self.path);
        Ok(())
    }

    fn fill_and_stroke(&mut self) -> RenderResult<()> {
        self.fill()?;
        self.stroke()
    }

    fn set_fill_color(&mut self, color: StyleColor) {
        self.state.fill = color.into();
    }

    fn set_stroke_color(&mut self, color: StyleColor) {
        self.state.stroke = color.into();
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> RenderResult<()> {
        self.state.dash = segments.to_vec();
        Ok(())
    }

    fn set_font(&mut self, size: f64, text: &StyledText) {
        self.state.font_size = size;
        self.state.bold = text.has(FormatLabel::Bold);
        self.state.italic = text.has(FormatLabel::Italic);
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        f64::from(self.layout(text).width())
    }

    fn set_text_align(&mut self, align: AlignHorizontal) {
        self.state.align = align;
    }

    fn fill_text(&mut self, text: &str, at: Point) -> RenderResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let brush = Brush::Solid(self.state.fill);
        let layout = self.layout(text);
        let width = f64::from(layout.width());
        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or_default();
        let x = match self.state.align {
            AlignHorizontal::Left => at.x,
            AlignHorizontal::Center => at.x - width / 2.0,
            AlignHorizontal::Right => at.x - width,
        };
        let text_transform = self.state.transform * Affine::translate((x, at.y - baseline));

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));
                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();
                if glyphs.is_empty() {
                    continue;
                }
                self.scene
                    .draw_glyphs(run.font())
                    .brush(&brush)
                    .hint(true)
                    .transform(text_transform)
                    .glyph_transform(glyph_xform)
                    .font_size(run.font_size())
                    .normalized_coords(run.normalized_coords())
                    .draw(Fill::NonZero, glyphs.into_iter());
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, data: &str, rect: Rect) -> RenderResult<()> {
        let image = self.image(data)?;
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let image_transform = self.state.transform
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(rect.width() / f64::from(image.width), rect.height() / f64::from(image.height));
        self.scene.draw_image(&image.into(), image_transform);
        Ok(())
    }
}

/// [`TextMetrics`] measured with the same Parley layout the canvas draws with.
pub struct ParleyMetrics {
    contexts: Mutex<(FontContext, LayoutContext<Brush>)>,
    default_font_size: f64,
}

impl Default for ParleyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyMetrics {
    pub fn new() -> Self {
        Self {
            contexts: Mutex::new((FontContext::new(), LayoutContext::new())),
            default_font_size: 12.0,
        }
    }

    pub fn with_default_font_size(mut self, font_size: f64) -> Self {
        self.default_font_size = font_size;
        self
    }
}

impl TextMetrics for ParleyMetrics {
    fn text_dimension(&self, line: &StyledText, font_size: f64) -> Size {
        let mut guard = self.contexts.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (font_cx, layout_cx) = &mut *guard;
        let layout = build_layout(
            font_cx,
            layout_cx,
            line.text(),
            font_size,
            line.has(FormatLabel::Bold),
            line.has(FormatLabel::Italic),
            Brush::default(),
        );
        // canvas text APIs report no reliable height, so the font size stands in
        Size::new(f64::from(layout.width()), font_size)
    }

    fn default_font_size(&self) -> f64 {
        self.default_font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_data::tests::sample_png_base64;
    use inkplot_core::{DrawHandler, Theme};

    #[test]
    fn test_new_surface_is_empty() {
        let surface = CanvasSurface::new();
        assert!(surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_fill_and_stroke_encode() {
        let mut surface = CanvasSurface::new();
        surface.begin_path();
        surface.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.fill().unwrap();
        surface.stroke().unwrap();
        assert!(!surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_empty_path_paints_nothing() {
        let mut surface = CanvasSurface::new();
        surface.begin_path();
        surface.fill_and_stroke().unwrap();
        assert!(surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_points_transformed_when_added() {
        let mut surface = CanvasSurface::new();
        surface.save();
        surface.translate(10.0, 20.0);
        surface.scale(2.0, 2.0);
        surface.begin_path();
        surface.move_to(Point::new(1.0, 1.0));
        surface.restore();
        surface.line_to(Point::new(1.0, 1.0));
        assert_eq!(
            surface.path.elements(),
            &[PathEl::MoveTo(Point::new(12.0, 22.0)), PathEl::LineTo(Point::new(1.0, 1.0))]
        );
    }

    #[test]
    fn test_image_cached_by_payload() {
        let mut surface = CanvasSurface::new();
        let data = sample_png_base64();
        surface.draw_image(&data, Rect::new(0.0, 0.0, 4.0, 2.0)).unwrap();
        surface.draw_image(&data, Rect::new(10.0, 0.0, 14.0, 2.0)).unwrap();
        assert_eq!(surface.cached_images(), 1);
        assert!(surface.draw_image("@@", Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_handler_replay_builds_scene() {
        let mut handler = DrawHandler::new(Arc::new(Theme::light()), Box::new(ParleyMetrics::new()));
        handler.set_line_type_str("-.");
        handler.draw_ellipse(10.0, 10.0, 40.0, 20.0);
        handler.draw_arc(60.0, 10.0, 40.0, 40.0, 45.0, 270.0, false);

        let mut renderer = Renderer::new(CanvasSurface::new());
        handler.draw_all(&mut renderer);
        assert_eq!(renderer.last_report().failed, 0);
        assert!(!renderer.surface().scene().encoding().is_empty());

        renderer.surface_mut().reset();
        assert!(renderer.surface().scene().encoding().is_empty());
    }

    #[test]
    fn test_reset_frame_reinstalls_scaling() {
        let mut handler = DrawHandler::new(Arc::new(Theme::light()), Box::new(ParleyMetrics::new()));
        handler.set_new_scaling(2.0);
        handler.draw_rectangle(0.0, 0.0, 10.0, 10.0);

        let mut renderer = Renderer::new(CanvasSurface::new());
        handler.draw_all(&mut renderer);
        assert_eq!(renderer.surface().state.transform, Affine::scale(2.0));

        renderer.reset_frame();
        assert_eq!(renderer.surface().state.transform, Affine::IDENTITY);
        handler.draw_all(&mut renderer);
        assert_eq!(renderer.surface().state.transform, Affine::scale(2.0));
        assert!(!renderer.surface().scene().encoding().is_empty());
    }

    #[test]
    fn test_parley_metrics_height_is_font_size() {
        let metrics = ParleyMetrics::new().with_default_font_size(14.0);
        let size = metrics.text_dimension(&StyledText::plain("Hy"), 20.0);
        assert!((size.height - 20.0).abs() < f64::EPSILON);
        assert!((metrics.default_font_size() - 14.0).abs() < f64::EPSILON);
    }
}
