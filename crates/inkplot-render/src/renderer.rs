//! Replays deferred draw commands against a [`RenderSurface`].
//!
//! The renderer owns the geometry that is common to all backends (zoom,
//! pixel snapping, ellipse and arc construction, dash patterns) and adapts the
//! fill/stroke sequence to what the surface reports in its
//! [`SurfaceCapabilities`].

use crate::error::{CapabilityWarning, RenderResult};
use crate::geometry::{self, snap};
use crate::surface::{RenderSurface, SurfaceCapabilities};
use inkplot_core::{AlignHorizontal, DrawCommand, FormatLabel, Primitive, Replay, Style, StyleColor, StyledText, ZoomContext};
use kurbo::{Affine, PathEl, Point, Rect};
use std::f64::consts::TAU;

/// Offset of the underline below the text baseline.
const UNDERLINE_OFFSET: f64 = 1.0;

/// Outcome of the last replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Commands that rendered without error.
    pub rendered: usize,
    /// Commands that failed and were skipped.
    pub failed: usize,
}

/// Backend renderer: a [`Replay`] target drawing onto a surface.
pub struct Renderer<S: RenderSurface> {
    surface: S,
    capabilities: SurfaceCapabilities,
    warnings: Vec<CapabilityWarning>,
    report: ReplayReport,
    /// Base scale currently installed on the surface.
    installed_scaling: Option<f64>,
}

impl<S: RenderSurface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        let capabilities = surface.capabilities();
        if !capabilities.stroke_after_fill && !capabilities.combined_fill_stroke {
            log::debug!("surface consumes filled paths; outlined shapes go through fill_and_stroke");
        }
        Self {
            surface,
            capabilities,
            warnings: Vec::new(),
            report: ReplayReport::default(),
            installed_scaling: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Forget the installed base scale, e.g. after the surface transform was
    /// reset. The next pass installs it again.
    pub fn invalidate_scaling(&mut self) {
        self.installed_scaling = None;
    }

    pub fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    /// Capability fallbacks that happened so far, each reported once.
    pub fn warnings(&self) -> &[CapabilityWarning] {
        &self.warnings
    }

    /// Drain the pending capability warnings, e.g. to show a notification.
    pub fn take_warnings(&mut self) -> Vec<CapabilityWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn last_report(&self) -> ReplayReport {
        self.report
    }

    fn warn(&mut self, warning: CapabilityWarning) {
        if !self.warnings.contains(&warning) {
            log::warn!("{}", warning.message());
            self.warnings.push(warning);
        }
    }

    fn render_command(&mut self, command: &DrawCommand, overlay: Option<StyleColor>, zoom: &ZoomContext) -> RenderResult<()> {
        let style = &command.style;
        match &command.primitive {
            Primitive::Lines { points } => {
                self.apply_style(style, overlay)?;
                self.render_lines(points, style.has_outline(), zoom)
            }
            Primitive::Rectangle { rect } => {
                self.apply_style(style, overlay)?;
                self.surface.begin_path();
                self.surface.rect(Rect::from_origin_size(
                    (snap(zoom.zoom(rect.x0)), snap(zoom.zoom(rect.y0))),
                    (zoom.zoom(rect.width()).trunc(), zoom.zoom(rect.height()).trunc()),
                ));
                self.fill_path(style.has_outline())
            }
            Primitive::RectangleRound { rect, radius } => {
                self.apply_style(style, overlay)?;
                let path = geometry::rounded_rect_path(snapped_rect(*rect, zoom), zoom.zoom(*radius));
                self.trace(path.elements());
                self.fill_path(style.has_outline())
            }
            Primitive::Circle { center, radius } => {
                self.apply_style(style, overlay)?;
                self.surface.begin_path();
                let center = Point::new(snap(zoom.zoom(center.x)), snap(zoom.zoom(center.y)));
                self.surface.arc(center, zoom.zoom(*radius), 0.0, TAU, false);
                self.fill_path(style.has_outline())
            }
            Primitive::Ellipse { rect } => {
                self.apply_style(style, overlay)?;
                let path = geometry::ellipse_path(snapped_rect(*rect, zoom));
                self.trace(path.elements());
                self.fill_path(style.has_outline())
            }
            Primitive::Arc { rect, start, extent, open } => {
                self.apply_style(style, overlay)?;
                self.render_arc(*rect, *start, *extent, *open, style.has_outline(), zoom)
            }
            Primitive::Text { lines, origin, align, line_height } => {
                let color = overlay.unwrap_or_else(|| style.foreground());
                self.surface.set_fill_color(color);
                self.surface.set_stroke_color(color);
                self.render_text(lines, *origin, *align, *line_height, style.font_size(), zoom)
            }
            Primitive::Image { rect, data } => {
                let target = Rect::from_origin_size(
                    (zoom.zoom(rect.x0).trunc(), zoom.zoom(rect.y0).trunc()),
                    (zoom.zoom(rect.width()).trunc(), zoom.zoom(rect.height()).trunc()),
                );
                self.surface.draw_image(data, target)
            }
        }
    }

    /// Install colors, line width and dash pattern of a snapshot.
    fn apply_style(&mut self, style: &Style, overlay: Option<StyleColor>) -> RenderResult<()> {
        self.surface.set_fill_color(style.background());
        self.surface.set_stroke_color(overlay.unwrap_or_else(|| style.foreground()));
        self.surface.set_line_width(style.line_width());
        self.apply_dash(&geometry::dash_pattern(style.line_type(), style.line_width()))
    }

    fn apply_dash(&mut self, pattern: &[f64]) -> RenderResult<()> {
        if let Err(err) = self.surface.set_line_dash(pattern) {
            log::debug!("dash pattern rejected: {err}");
            self.warn(CapabilityWarning::DashPatterns);
            self.surface.set_line_dash(&[])?;
        }
        Ok(())
    }

    /// Paint the current path: fill it and, if requested, stroke its outline.
    fn fill_path(&mut self, stroke: bool) -> RenderResult<()> {
        if !stroke {
            self.surface.fill()
        } else if self.capabilities.combined_fill_stroke || !self.capabilities.stroke_after_fill {
            // a consumed path cannot be stroked again, the surface sequences both
            self.surface.fill_and_stroke()
        } else {
            self.surface.fill()?;
            self.surface.stroke()
        }
    }

    fn trace(&mut self, elements: &[PathEl]) {
        self.surface.begin_path();
        for el in elements {
            match *el {
                PathEl::MoveTo(p) => self.surface.move_to(p),
                PathEl::LineTo(p) => self.surface.line_to(p),
                PathEl::QuadTo(c, p) => self.surface.quad_to(c, p),
                PathEl::CurveTo(c1, c2, p) => self.surface.curve_to(c1, c2, p),
                PathEl::ClosePath => self.surface.close_path(),
            }
        }
    }

    fn render_lines(&mut self, points: &[Point], stroke: bool, zoom: &ZoomContext) -> RenderResult<()> {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Ok(());
        };
        let closed = first == last;
        self.surface.begin_path();
        for (i, p) in points.iter().enumerate() {
            let p = Point::new(snap(zoom.zoom(p.x)), snap(zoom.zoom(p.y)));
            if i == 0 {
                self.surface.move_to(p);
            } else {
                self.surface.line_to(p);
            }
        }
        if closed {
            self.surface.close_path();
            self.fill_path(stroke)
        } else if stroke {
            self.surface.stroke()
        } else {
            Ok(())
        }
    }

    fn render_arc(&mut self, rect: Rect, start: f64, extent: f64, open: bool, stroke: bool, zoom: &ZoomContext) -> RenderResult<()> {
        let width = zoom.zoom(rect.width());
        let height = zoom.zoom(rect.height());
        if width == 0.0 {
            log::debug!("skipping arc of zero width");
            return Ok(());
        }
        let center = Point::new(
            snap(zoom.zoom(rect.x0) + width / 2.0),
            snap(zoom.zoom(rect.y0) + height / 2.0),
        );
        let radius = width / 2.0;
        let a0 = -start.to_radians();
        let a1 = -(start + extent).to_radians();

        if self.capabilities.path_continuity_across_move_to {
            self.trace_arc(center, width, height, |surface| {
                if !open {
                    surface.move_to(Point::ZERO);
                }
                surface.arc(Point::ZERO, radius, a0, a1, true);
                if !open {
                    surface.close_path();
                }
            });
            return self.fill_path(stroke);
        }

        // Every move_to starts a new path here, so a closed wedge is filled
        // from a single sub-path and its radii are stroked on their own.
        if open {
            self.trace_arc(center, width, height, |surface| surface.arc(Point::ZERO, radius, a0, a1, true));
            return self.fill_path(stroke);
        }
        self.trace_arc(center, width, height, |surface| {
            surface.arc(Point::ZERO, radius, a0, a1, true);
            surface.line_to(Point::ZERO);
            surface.close_path();
        });
        self.surface.fill()?;
        if !stroke {
            return Ok(());
        }
        self.trace_arc(center, width, height, |surface| surface.arc(Point::ZERO, radius, a0, a1, true));
        self.surface.stroke()?;

        let (from, to) = geometry::arc_end_points(center, width / 2.0, height / 2.0, start, extent);
        self.surface.begin_path();
        self.surface.move_to(from);
        self.surface.line_to(center);
        self.surface.line_to(to);
        self.surface.stroke()
    }

    /// Build an arc path in a coordinate system centered on the ellipse and
    /// squashed to its aspect ratio. The transform is restored before the
    /// path is painted so line widths stay uniform.
    fn trace_arc(&mut self, center: Point, width: f64, height: f64, build: impl FnOnce(&mut S)) {
        self.surface.save();
        self.surface.translate(center.x, center.y);
        self.surface.scale(1.0, height / width);
        self.surface.begin_path();
        build(&mut self.surface);
        self.surface.restore();
    }

    fn render_text(
        &mut self,
        lines: &[StyledText],
        origin: Point,
        align: AlignHorizontal,
        line_height: f64,
        font_size: f64,
        zoom: &ZoomContext,
    ) -> RenderResult<()> {
        let x = zoom.zoom(origin.x);
        let mut y = zoom.zoom(origin.y);
        let font_size = zoom.zoom(font_size);
        for line in lines {
            self.render_text_line(line, Point::new(x, y), align, font_size)?;
            y += zoom.zoom(line_height);
        }
        Ok(())
    }

    fn render_text_line(&mut self, line: &StyledText, at: Point, align: AlignHorizontal, font_size: f64) -> RenderResult<()> {
        self.surface.set_font(font_size, line);
        if line.is_empty() {
            return Ok(());
        }
        let text = if self.capabilities.tab_glyph {
            line.text().to_string()
        } else {
            line.text().replace('\t', " ")
        };
        self.surface.set_text_align(align);
        self.surface.fill_text(&text, at)?;

        if line.has(FormatLabel::Underline) {
            self.surface.set_line_width(1.0);
            self.apply_dash(&[])?;
            let width = self.surface.measure_text(&text);
            let y = at.y + UNDERLINE_OFFSET;
            let (x0, x1) = match align {
                AlignHorizontal::Left => (at.x, at.x + width),
                AlignHorizontal::Center => (at.x - width / 2.0, at.x + width / 2.0),
                AlignHorizontal::Right => (at.x - width, at.x),
            };
            self.surface.begin_path();
            self.surface.move_to(Point::new(snap(x0), snap(y)));
            self.surface.line_to(Point::new(snap(x1), snap(y)));
            self.surface.stroke()?;
        }
        Ok(())
    }
}

impl<S: RenderSurface> Replay for Renderer<S> {
    fn begin_pass(&mut self, zoom: &ZoomContext) {
        self.report = ReplayReport::default();
        let scaling = zoom.scaling_factor();
        if self.installed_scaling != Some(scaling) {
            log::debug!("installing base scale {scaling}");
            self.surface.set_transform(Affine::IDENTITY);
            self.surface.scale(scaling, scaling);
            self.installed_scaling = Some(scaling);
        }
    }

    fn replay(&mut self, command: &DrawCommand, overlay: Option<StyleColor>, zoom: &ZoomContext) {
        match self.render_command(command, overlay, zoom) {
            Ok(()) => self.report.rendered += 1,
            Err(err) => {
                log::warn!("failed to render {}: {err}", command.primitive.kind());
                self.report.failed += 1;
            }
        }
    }

    fn end_pass(&mut self) {
        if self.report.failed > 0 {
            log::debug!("replay finished: {} rendered, {} failed", self.report.rendered, self.report.failed);
        }
    }
}

/// Rectangle with a snapped origin and zoomed size.
fn snapped_rect(rect: Rect, zoom: &ZoomContext) -> Rect {
    Rect::from_origin_size(
        (snap(zoom.zoom(rect.x0)), snap(zoom.zoom(rect.y0))),
        (zoom.zoom(rect.width()), zoom.zoom(rect.height())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingSurface, SurfaceOp};
    use inkplot_core::{ApproximateMetrics, DrawHandler, Layer, Theme};
    use std::sync::Arc;

    fn handler() -> DrawHandler {
        DrawHandler::new(Arc::new(Theme::light()), Box::new(ApproximateMetrics::default()))
    }

    fn red() -> StyleColor {
        StyleColor::rgb(255, 0, 0)
    }

    fn blue() -> StyleColor {
        StyleColor::rgb(0, 0, 255)
    }

    fn painted(ops: &[SurfaceOp]) -> Vec<&SurfaceOp> {
        ops.iter()
            .filter(|op| matches!(op, SurfaceOp::Fill | SurfaceOp::Stroke | SurfaceOp::FillAndStroke))
            .collect()
    }

    #[test]
    fn test_rectangle_uses_snapshot() {
        let mut h = handler();
        h.set_foreground_color_str("red");
        h.set_background_color(Some(blue()));
        h.set_line_width(2.0).unwrap();
        h.draw_rectangle(0.0, 0.0, 100.0, 50.0);
        h.set_foreground_color_str("green");

        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();

        let rects: Vec<_> = ops.iter().filter(|op| matches!(op, SurfaceOp::Rect(_))).collect();
        assert_eq!(rects, vec![&SurfaceOp::Rect(Rect::new(0.5, 0.5, 100.5, 50.5))]);
        assert!(ops.contains(&SurfaceOp::SetStrokeColor(red())));
        assert!(ops.contains(&SurfaceOp::SetFillColor(blue())));
        assert!(ops.contains(&SurfaceOp::SetLineWidth(2.0)));
        assert!(!ops.contains(&SurfaceOp::SetStrokeColor(StyleColor::rgb(0, 255, 0))));
        assert_eq!(painted(ops), vec![&SurfaceOp::Fill, &SurfaceOp::Stroke]);
        assert_eq!(renderer.last_report(), ReplayReport { rendered: 1, failed: 0 });
    }

    #[test]
    fn test_print_surface_fills_and_strokes_at_once() {
        let mut h = handler();
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::with_capabilities(SurfaceCapabilities::PRINT));
        h.draw_all(&mut renderer);
        assert_eq!(painted(renderer.surface().ops()), vec![&SurfaceOp::FillAndStroke]);
    }

    #[test]
    fn test_consuming_surface_without_combined_op() {
        let mut h = handler();
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let capabilities = SurfaceCapabilities {
            combined_fill_stroke: false,
            ..SurfaceCapabilities::PRINT
        };
        let mut renderer = Renderer::new(RecordingSurface::with_capabilities(capabilities));
        h.draw_all(&mut renderer);
        assert_eq!(renderer.last_report().failed, 0);
        assert_eq!(painted(renderer.surface().ops()), vec![&SurfaceOp::FillAndStroke]);
    }

    #[test]
    fn test_zero_width_only_fills() {
        let mut h = handler();
        h.set_line_width(0.0).unwrap();
        h.draw_ellipse(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        assert_eq!(painted(renderer.surface().ops()), vec![&SurfaceOp::Fill]);
    }

    #[test]
    fn test_open_polyline_only_stroked() {
        let mut h = handler();
        h.draw_line(0.0, 0.0, 10.2, 20.7);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();
        assert!(ops.contains(&SurfaceOp::MoveTo(Point::new(0.5, 0.5))));
        assert!(ops.contains(&SurfaceOp::LineTo(Point::new(10.5, 20.5))));
        assert_eq!(painted(ops), vec![&SurfaceOp::Stroke]);
    }

    #[test]
    fn test_closed_polyline_filled() {
        let mut h = handler();
        h.draw_lines(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 5.0), Point::new(0.0, 0.0)]);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();
        assert!(ops.contains(&SurfaceOp::ClosePath));
        assert_eq!(painted(ops), vec![&SurfaceOp::Fill, &SurfaceOp::Stroke]);
    }

    #[test]
    fn test_zoom_multiplies_coordinates() {
        let mut h = handler();
        h.set_zoom_factor(2.0);
        h.draw_rectangle(10.0, 10.0, 20.0, 5.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        assert!(renderer.surface().ops().contains(&SurfaceOp::Rect(Rect::new(20.5, 20.5, 60.5, 30.5))));
    }

    #[test]
    fn test_scaling_installed_once_per_change() {
        let mut h = handler();
        h.set_new_scaling(2.0);
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        h.draw_all(&mut renderer);
        let scales = |ops: &[SurfaceOp]| ops.iter().filter(|op| matches!(op, SurfaceOp::Scale(..))).count();
        assert_eq!(scales(renderer.surface().ops()), 1);
        assert!(renderer.surface().ops().contains(&SurfaceOp::SetTransform(Affine::IDENTITY)));

        h.set_new_scaling(3.0);
        h.draw_all(&mut renderer);
        assert_eq!(scales(renderer.surface().ops()), 2);
    }

    #[test]
    fn test_scaling_installed_on_every_renderer() {
        let mut h = handler();
        h.set_new_scaling(2.0);
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut screen = Renderer::new(RecordingSurface::new());
        let mut print = Renderer::new(RecordingSurface::with_capabilities(SurfaceCapabilities::PRINT));
        h.draw_all(&mut screen);
        h.draw_all(&mut print);
        for ops in [screen.surface().ops(), print.surface().ops()] {
            assert_eq!(ops.iter().filter(|op| **op == SurfaceOp::Scale(2.0, 2.0)).count(), 1);
        }
    }

    #[test]
    fn test_scaling_reinstalled_after_invalidate() {
        let mut h = handler();
        h.set_new_scaling(2.0);
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        renderer.surface_mut().take_ops();
        renderer.invalidate_scaling();
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();
        assert_eq!(ops[0], SurfaceOp::SetTransform(Affine::IDENTITY));
        assert_eq!(ops[1], SurfaceOp::Scale(2.0, 2.0));
    }

    #[test]
    fn test_dash_fallback_warns_once() {
        let mut h = handler();
        h.set_line_type_str(".");
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        h.draw_circle(5.0, 5.0, 3.0);
        let mut renderer = Renderer::new(RecordingSurface::new().without_dash_support());
        h.draw_all(&mut renderer);

        assert_eq!(renderer.warnings(), &[CapabilityWarning::DashPatterns]);
        assert_eq!(renderer.last_report(), ReplayReport { rendered: 2, failed: 0 });
        assert_eq!(renderer.take_warnings().len(), 1);
        assert!(renderer.warnings().is_empty());
    }

    #[test]
    fn test_dash_pattern_applied() {
        let mut h = handler();
        h.set_line_type_str(".");
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        assert!(renderer.surface().ops().contains(&SurfaceOp::SetLineDash(vec![6.0, 6.0])));
        assert!(renderer.warnings().is_empty());
    }

    #[test]
    fn test_selection_overlay_replaces_stroke() {
        let mut h = handler();
        h.set_foreground_color_str("red");
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all_selected(&mut renderer, true);
        let ops = renderer.surface().ops();
        assert!(ops.contains(&SurfaceOp::SetStrokeColor(StyleColor::rgb(0, 0, 255))));
        assert!(!ops.contains(&SurfaceOp::SetStrokeColor(red())));
    }

    #[test]
    fn test_failed_command_does_not_abort_pass() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut h = handler();
        h.draw_base64_image(0.0, 0.0, 10.0, 10.0, "not base64 at all!");
        h.draw_rectangle(0.0, 0.0, 10.0, 10.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        assert_eq!(renderer.last_report(), ReplayReport { rendered: 1, failed: 1 });
        assert!(renderer.surface().ops().iter().any(|op| matches!(op, SurfaceOp::Rect(_))));
    }

    #[test]
    fn test_background_layer_first() {
        let mut h = handler();
        h.set_layer(Layer::Foreground);
        h.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        h.set_layer(Layer::Background);
        h.draw_circle(5.0, 5.0, 2.0);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();
        let arc = ops.iter().position(|op| matches!(op, SurfaceOp::Arc { .. })).unwrap();
        let rect = ops.iter().position(|op| matches!(op, SurfaceOp::Rect(_))).unwrap();
        assert!(arc < rect);
    }

    #[test]
    fn test_closed_arc_with_path_continuity() {
        let mut h = handler();
        h.draw_arc(0.0, 0.0, 20.0, 10.0, 0.0, 90.0, false);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();

        assert!(ops.contains(&SurfaceOp::Translate(10.5, 5.5)));
        assert!(ops.contains(&SurfaceOp::Scale(1.0, 0.5)));
        assert!(ops.contains(&SurfaceOp::MoveTo(Point::ZERO)));
        let restore = ops.iter().position(|op| *op == SurfaceOp::Restore).unwrap();
        let fill = ops.iter().position(|op| *op == SurfaceOp::Fill).unwrap();
        assert!(restore < fill);
        assert_eq!(painted(ops), vec![&SurfaceOp::Fill, &SurfaceOp::Stroke]);
    }

    #[test]
    fn test_closed_arc_without_path_continuity() {
        let mut h = handler();
        h.draw_arc(0.0, 0.0, 20.0, 20.0, 0.0, 90.0, false);
        let mut renderer = Renderer::new(RecordingSurface::with_capabilities(SurfaceCapabilities::PRINT));
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();

        assert!(!ops.contains(&SurfaceOp::MoveTo(Point::ZERO)));
        assert_eq!(painted(ops), vec![&SurfaceOp::Fill, &SurfaceOp::Stroke, &SurfaceOp::Stroke]);
        // radii: start on the right, through the center, end at the top
        assert!(ops.contains(&SurfaceOp::MoveTo(Point::new(20.5, 10.5))));
        assert!(ops.contains(&SurfaceOp::LineTo(Point::new(10.5, 10.5))));
        assert!(ops.iter().any(|op| matches!(op, SurfaceOp::LineTo(p) if (p.x - 10.5).abs() < 1e-9 && (p.y - 0.5).abs() < 1e-9)));
        assert_eq!(renderer.last_report().failed, 0);
    }

    #[test]
    fn test_open_arc_no_center_lines() {
        let mut h = handler();
        h.draw_arc(0.0, 0.0, 20.0, 20.0, 0.0, 180.0, true);
        let mut renderer = Renderer::new(RecordingSurface::with_capabilities(SurfaceCapabilities::PRINT));
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();
        assert!(!ops.iter().any(|op| matches!(op, SurfaceOp::LineTo(_))));
        assert_eq!(painted(ops), vec![&SurfaceOp::FillAndStroke]);
    }

    #[test]
    fn test_text_lines_and_underline() {
        let mut h = handler();
        h.print("_link_\nplain", 10.0, 20.0, AlignHorizontal::Center);
        let line_height = h.text_height_max_with_space();
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let ops = renderer.surface().ops();

        let texts: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::FillText(text, at) => Some((text.as_str(), *at)),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![("link", Point::new(10.0, 20.0)), ("plain", Point::new(10.0, 20.0 + line_height))]);
        assert!(ops.contains(&SurfaceOp::SetTextAlign(AlignHorizontal::Center)));
        // "link" is 4 * 12 * 0.6 = 28.8 wide, centered on x = 10
        assert!(ops.contains(&SurfaceOp::MoveTo(Point::new(-3.5, 21.5))));
        assert!(ops.contains(&SurfaceOp::LineTo(Point::new(24.5, 21.5))));
        assert_eq!(painted(ops), vec![&SurfaceOp::Stroke]);
    }

    #[test]
    fn test_tabs_replaced_without_tab_glyph() {
        let mut h = handler();
        h.print("a\tb", 0.0, 0.0, AlignHorizontal::Left);
        let mut renderer = Renderer::new(RecordingSurface::with_capabilities(SurfaceCapabilities::PRINT));
        h.draw_all(&mut renderer);
        assert!(renderer.surface().ops().contains(&SurfaceOp::FillText("a b".to_string(), Point::ZERO)));
    }

    #[test]
    fn test_empty_text_line_skipped() {
        let mut h = handler();
        h.print("a\n\nb", 0.0, 0.0, AlignHorizontal::Left);
        let mut renderer = Renderer::new(RecordingSurface::new());
        h.draw_all(&mut renderer);
        let count = renderer.surface().ops().iter().filter(|op| matches!(op, SurfaceOp::FillText(..))).count();
        assert_eq!(count, 2);
    }
}
