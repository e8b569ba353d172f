//! Print backend writing a single-page PDF.
//!
//! The surface keeps canvas conventions (y down, transforms applied as path
//! points are added) and converts to PDF user space when painting. Like most
//! print contexts it starts a new path on every `move_to` and consumes the
//! path when painting, so it reports [`SurfaceCapabilities::PRINT`].

mod document;
mod fonts;

pub use fonts::{PdfFont, PdfMetrics};

use crate::error::{RenderResult, RendererError};
use crate::geometry;
use crate::image_data;
use crate::surface::{RenderSurface, SurfaceCapabilities};
use document::{PageContent, PdfImage, name, real};
use inkplot_core::{AlignHorizontal, StyleColor, StyledText};
use kurbo::{Affine, PathEl, Point, Rect, Size};
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Graphics state saved and restored by `save`/`restore`.
#[derive(Debug, Clone)]
struct GraphicsState {
    transform: Affine,
    fill: StyleColor,
    stroke: StyleColor,
    line_width: f64,
    dash: Vec<f64>,
    font: PdfFont,
    font_size: f64,
    align: AlignHorizontal,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: StyleColor::black(),
            stroke: StyleColor::black(),
            line_width: 1.0,
            dash: Vec::new(),
            font: PdfFont::Regular,
            font_size: 12.0,
            align: AlignHorizontal::Left,
        }
    }
}

/// Values last written to the content stream, so unchanged state is not
/// repeated before every paint operation.
#[derive(Debug, Clone, Default)]
struct Written {
    fill: Option<(u8, u8, u8)>,
    stroke: Option<(u8, u8, u8)>,
    line_width: Option<f64>,
    dash: Option<Vec<f64>>,
    alpha: Option<(u8, u8)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Fill,
    Stroke,
    FillAndStroke,
}

impl Paint {
    fn operator(self) -> &'static str {
        match self {
            Paint::Fill => "f",
            Paint::Stroke => "S",
            Paint::FillAndStroke => "B",
        }
    }
}

/// A [`RenderSurface`] producing a PDF page with the Helvetica base fonts.
pub struct PdfSurface {
    size: Size,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    written: Written,
    operations: Vec<Operation>,
    /// Path construction operators of the current path, in PDF coordinates.
    path: Vec<Operation>,
    /// Current point and start of the current sub-path, in device space.
    current: Option<Point>,
    subpath_start: Option<Point>,
    path_painted: bool,
    alpha_states: Vec<(u8, u8)>,
    images: Vec<PdfImage>,
}

impl PdfSurface {
    /// A page of `width` x `height` points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width.max(1.0), height.max(1.0)),
            state: GraphicsState::default(),
            stack: Vec::new(),
            written: Written::default(),
            operations: Vec::new(),
            path: Vec::new(),
            current: None,
            subpath_start: None,
            path_painted: false,
            alpha_states: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Content stream operations written so far.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Serialize the page into a complete PDF file.
    pub fn finish(self) -> RenderResult<Vec<u8>> {
        log::debug!(
            "writing pdf page {}x{} with {} operations and {} images",
            self.size.width,
            self.size.height,
            self.operations.len(),
            self.images.len()
        );
        document::write_document(PageContent {
            width: self.size.width,
            height: self.size.height,
            operations: self.operations,
            alpha_states: &self.alpha_states,
            images: &self.images,
        })
    }

    /// Canvas device space (y down) to PDF user space (y up).
    fn page_transform(&self) -> Affine {
        Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, self.size.height]) * self.state.transform
    }

    fn to_page(&self, p: Point) -> Point {
        self.page_transform() * p
    }

    /// Uniform scale of the current transform, applied to widths and sizes.
    fn transform_scale(&self) -> f64 {
        self.state.transform.determinant().abs().sqrt()
    }

    fn emit(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn push_point(&mut self, p: Point, operator: &str) {
        let q = self.to_page(p);
        self.path.push(Operation::new(operator, vec![real(q.x), real(q.y)]));
    }

    fn start_subpath(&mut self, p: Point) {
        self.push_point(p, "m");
        let device = self.state.transform * p;
        self.current = Some(device);
        self.subpath_start = Some(device);
    }

    fn extend_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.start_subpath(p);
        } else {
            self.push_point(p, "l");
            self.current = Some(self.state.transform * p);
        }
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.start_subpath(c1);
        }
        let operands = [c1, c2, p]
            .into_iter()
            .map(|point| self.to_page(point))
            .flat_map(|q| [real(q.x), real(q.y)])
            .collect();
        self.path.push(Operation::new("c", operands));
        self.current = Some(self.state.transform * p);
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    fn write_fill_color(&mut self) {
        let c = self.state.fill;
        if self.written.fill != Some((c.r, c.g, c.b)) {
            self.emit("rg", channels(c));
            self.written.fill = Some((c.r, c.g, c.b));
        }
    }

    fn write_stroke_state(&mut self) {
        let c = self.state.stroke;
        if self.written.stroke != Some((c.r, c.g, c.b)) {
            self.emit("RG", channels(c));
            self.written.stroke = Some((c.r, c.g, c.b));
        }
        let scale = self.transform_scale();
        let width = self.state.line_width * scale;
        if self.written.line_width != Some(width) {
            self.emit("w", vec![real(width)]);
            self.written.line_width = Some(width);
        }
        let dash: Vec<f64> = self.state.dash.iter().map(|d| d * scale).collect();
        if self.written.dash.as_ref() != Some(&dash) {
            let segments = dash.iter().map(|d| real(*d)).collect();
            self.emit("d", vec![Object::Array(segments), 0_i64.into()]);
            self.written.dash = Some(dash);
        }
    }

    fn write_alpha(&mut self) {
        let alpha = (self.state.fill.a, self.state.stroke.a);
        if self.written.alpha == Some(alpha) || (self.written.alpha.is_none() && alpha == (255, 255)) {
            return;
        }
        let index = match self.alpha_states.iter().position(|a| *a == alpha) {
            Some(index) => index,
            None => {
                self.alpha_states.push(alpha);
                self.alpha_states.len() - 1
            }
        };
        self.emit("gs", vec![name(format!("GS{index}"))]);
        self.written.alpha = Some(alpha);
    }

    fn paint(&mut self, paint: Paint) -> RenderResult<()> {
        if self.path_painted {
            return Err(RendererError::Unsupported("painting a path after it was filled"));
        }
        if self.path.is_empty() {
            return Ok(());
        }
        self.write_alpha();
        if paint != Paint::Stroke {
            self.write_fill_color();
        }
        if paint != Paint::Fill {
            self.write_stroke_state();
        }
        let path = std::mem::take(&mut self.path);
        self.operations.extend(path);
        self.emit(paint.operator(), Vec::new());
        self.clear_path();
        self.path_painted = true;
        Ok(())
    }
}

fn channels(c: StyleColor) -> Vec<Object> {
    [c.r, c.g, c.b].into_iter().map(|v| real(f64::from(v) / 255.0)).collect()
}

impl RenderSurface for PdfSurface {
    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::PRINT
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
        self.path_painted = false;
    }

    fn move_to(&mut self, p: Point) {
        // a move discards whatever was built so far
        self.clear_path();
        self.path_painted = false;
        self.start_subpath(p);
    }

    fn line_to(&mut self, p: Point) {
        self.extend_to(p);
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        let Some(current) = self.current else {
            self.extend_to(p);
            return;
        };
        // raise to a cubic in device space, then map back to local space
        let inverse = self.state.transform.inverse();
        let p0 = inverse * current;
        let c1 = p0 + (c - p0) * (2.0 / 3.0);
        let c2 = p + (c - p) * (2.0 / 3.0);
        self.cubic_to(c1, c2, p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.cubic_to(c1, c2, p);
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        let (start, segments) = geometry::arc_segments(center, radius, start_angle, end_angle, anticlockwise);
        self.extend_to(start);
        for el in segments {
            match el {
                PathEl::LineTo(p) => self.extend_to(p),
                PathEl::QuadTo(c, p) => self.quad_to(c, p),
                PathEl::CurveTo(c1, c2, p) => self.cubic_to(c1, c2, p),
                PathEl::MoveTo(_) | PathEl::ClosePath => {}
            }
        }
    }

    fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.push(Operation::new("h", Vec::new()));
            self.current = self.subpath_start;
        }
    }

    fn rect(&mut self, rect: Rect) {
        self.start_subpath(Point::new(rect.x0, rect.y0));
        self.extend_to(Point::new(rect.x1, rect.y0));
        self.extend_to(Point::new(rect.x1, rect.y1));
        self.extend_to(Point::new(rect.x0, rect.y1));
        self.close_path();
    }

    fn fill(&mut self) -> RenderResult<()> {
        self.paint(Paint::Fill)
    }

    fn stroke(&mut self) -> RenderResult<()> {
        self.paint(Paint::Stroke)
    }

    fn fill_and_stroke(&mut self) -> RenderResult<()> {
        self.paint(Paint::FillAndStroke)
    }

    fn set_fill_color(&mut self, color: StyleColor) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: StyleColor) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> RenderResult<()> {
        self.state.dash = segments.to_vec();
        Ok(())
    }

    fn set_font(&mut self, size: f64, text: &StyledText) {
        self.state.font = PdfFont::for_text(text);
        self.state.font_size = size;
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.state.font.text_width(text, self.state.font_size)
    }

    fn set_text_align(&mut self, align: AlignHorizontal) {
        self.state.align = align;
    }

    fn fill_text(&mut self, text: &str, at: Point) -> RenderResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let width = self.measure_text(text);
        let x = match self.state.align {
            AlignHorizontal::Left => at.x,
            AlignHorizontal::Center => at.x - width / 2.0,
            AlignHorizontal::Right => at.x - width,
        };
        let origin = self.to_page(Point::new(x, at.y));
        let size = self.state.font_size * self.transform_scale();
        self.write_alpha();
        self.write_fill_color();
        self.emit("BT", Vec::new());
        self.emit("Tf", vec![name(self.state.font.resource_name()), real(size)]);
        self.emit(
            "Tm",
            vec![1_i64.into(), 0_i64.into(), 0_i64.into(), 1_i64.into(), real(origin.x), real(origin.y)],
        );
        self.emit("Tj", vec![Object::String(fonts::win_ansi(text), StringFormat::Literal)]);
        self.emit("ET", Vec::new());
        Ok(())
    }

    fn draw_image(&mut self, data: &str, rect: Rect) -> RenderResult<()> {
        let rgba = image_data::decode_rgba(data)?;
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }
        let index = self.images.len();
        self.images.push(PdfImage { width, height, rgb, alpha });

        // unit square to the target rectangle, top image row at the top
        let placement = self.page_transform()
            * Affine::new([rect.width(), 0.0, 0.0, -rect.height(), rect.x0, rect.y1]);
        let matrix = placement.as_coeffs().into_iter().map(real).collect();
        self.emit("q", Vec::new());
        self.emit("cm", matrix);
        self.emit("Do", vec![name(format!("Im{index}"))]);
        self.emit("Q", Vec::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_data::tests::sample_png_base64;
    use crate::renderer::Renderer;
    use inkplot_core::{DrawHandler, Theme};
    use lopdf::Document;
    use lopdf::content::Content;
    use std::sync::Arc;

    fn operand(object: &Object) -> String {
        match object {
            Object::Integer(i) => i.to_string(),
            Object::Real(r) => ((f64::from(*r) * 1000.0).round() / 1000.0).to_string(),
            Object::Name(n) => format!("/{}", String::from_utf8_lossy(n)),
            Object::String(s, _) => format!("({})", String::from_utf8_lossy(s)),
            Object::Array(items) => {
                format!("[{}]", items.iter().map(operand).collect::<Vec<_>>().join(" "))
            }
            other => format!("{other:?}"),
        }
    }

    fn lines(operations: &[Operation]) -> Vec<String> {
        operations
            .iter()
            .map(|op| {
                let mut parts: Vec<String> = op.operands.iter().map(operand).collect();
                parts.push(op.operator.clone());
                parts.join(" ")
            })
            .collect()
    }

    fn has_run(lines: &[String], run: &[&str]) -> bool {
        lines.windows(run.len()).any(|w| w.iter().zip(run).all(|(a, b)| a == b))
    }

    #[test]
    fn test_rect_flipped_and_filled_once() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.begin_path();
        surface.rect(Rect::new(10.0, 10.0, 30.0, 20.0));
        surface.fill_and_stroke().unwrap();
        let out = lines(surface.operations());
        assert!(has_run(&out, &["10 90 m", "30 90 l", "30 80 l", "10 80 l", "h", "B"]));
        assert!(surface.stroke().is_err());
    }

    #[test]
    fn test_move_to_starts_new_path() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.begin_path();
        surface.move_to(Point::new(0.0, 0.0));
        surface.line_to(Point::new(10.0, 0.0));
        surface.move_to(Point::new(50.0, 50.0));
        surface.line_to(Point::new(60.0, 50.0));
        surface.stroke().unwrap();
        let out = lines(surface.operations());
        assert!(!out.contains(&"10 100 l".to_string()));
        assert!(has_run(&out, &["50 50 m", "60 50 l", "S"]));
    }

    #[test]
    fn test_state_written_only_on_change() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.set_stroke_color(StyleColor::rgb(255, 0, 0));
        surface.set_line_width(2.0);
        for _ in 0..2 {
            surface.begin_path();
            surface.move_to(Point::ZERO);
            surface.line_to(Point::new(1.0, 1.0));
            surface.stroke().unwrap();
        }
        let out = lines(surface.operations());
        assert_eq!(out.iter().filter(|l| *l == "1 0 0 RG").count(), 1);
        assert_eq!(out.iter().filter(|l| *l == "2 w").count(), 1);
    }

    #[test]
    fn test_transform_scales_width_and_dash() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.scale(2.0, 2.0);
        surface.set_line_dash(&[3.0, 3.0]).unwrap();
        surface.begin_path();
        surface.move_to(Point::new(1.0, 1.0));
        surface.line_to(Point::new(2.0, 1.0));
        surface.stroke().unwrap();
        let out = lines(surface.operations());
        assert!(out.contains(&"2 w".to_string()));
        assert!(out.contains(&"[6 6] 0 d".to_string()));
        assert!(has_run(&out, &["2 98 m", "4 98 l", "S"]));
    }

    #[test]
    fn test_transparent_fill_uses_ext_gstate() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.set_fill_color(StyleColor::rgb(0, 0, 255).with_alpha(125));
        surface.begin_path();
        surface.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.fill().unwrap();
        assert!(lines(surface.operations()).contains(&"/GS0 gs".to_string()));
        assert_eq!(surface.alpha_states, vec![(125, 255)]);
    }

    #[test]
    fn test_text_alignment_uses_font_widths() {
        let mut surface = PdfSurface::new(200.0, 100.0);
        surface.set_font(10.0, &StyledText::plain("Hi"));
        surface.set_text_align(AlignHorizontal::Right);
        surface.fill_text("Hi", Point::new(50.0, 20.0)).unwrap();
        // "Hi" is 9.44 wide at 10pt
        let out = lines(surface.operations());
        assert!(has_run(&out, &["BT", "/F1 10 Tf", "1 0 0 1 40.56 80 Tm", "(Hi) Tj", "ET"]));
    }

    #[test]
    fn test_quad_raised_to_cubic() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.begin_path();
        surface.move_to(Point::new(0.0, 100.0));
        surface.quad_to(Point::new(30.0, 100.0), Point::new(30.0, 70.0));
        surface.stroke().unwrap();
        let out = lines(surface.operations());
        assert!(has_run(&out, &["0 0 m", "20 0 30 10 30 30 c", "S"]));
    }

    #[test]
    fn test_image_embedded_with_soft_mask() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        surface.draw_image(&sample_png_base64(), Rect::new(10.0, 10.0, 30.0, 20.0)).unwrap();
        let out = lines(surface.operations());
        assert!(has_run(&out, &["q", "20 0 0 10 10 80 cm", "/Im0 Do", "Q"]));
        let image = &surface.images[0];
        assert_eq!(image.rgb, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(image.alpha, vec![255, 128]);

        let bytes = surface.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 2);
        let mask_id = image.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let mask = doc.get_object(mask_id).unwrap().as_stream().unwrap();
        assert_eq!(mask.content, vec![255, 128]);
    }

    #[test]
    fn test_invalid_image_rejected() {
        let mut surface = PdfSurface::new(100.0, 100.0);
        let result = surface.draw_image("AAAA", Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(result, Err(RendererError::InvalidImage(_))));
    }

    #[test]
    fn test_handler_to_pdf_document() {
        let mut handler = DrawHandler::new(Arc::new(Theme::light()), Box::new(PdfMetrics::default()));
        handler.set_background_color_and_keep_transparency("yellow");
        handler.set_line_type_str("..");
        handler.draw_rectangle(10.0, 10.0, 100.0, 40.0);
        handler.draw_arc(10.0, 60.0, 40.0, 40.0, 0.0, 90.0, false);
        handler.print("*Title*\nbody", 60.0, 30.0, AlignHorizontal::Center);

        let mut renderer = Renderer::new(PdfSurface::new(200.0, 120.0));
        handler.draw_all(&mut renderer);
        assert_eq!(renderer.last_report().failed, 0);
        assert!(renderer.warnings().is_empty());

        let bytes = renderer.into_surface().finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let out = lines(&content.operations);
        assert!(out.contains(&"(Title) Tj".to_string()));
        assert!(out.contains(&"(body) Tj".to_string()));
        assert!(out.contains(&"/F2 12 Tf".to_string()));
        assert!(out.iter().any(|l| l.ends_with(" d")));
        assert!(out.contains(&"B".to_string()));
    }
}
