//! The primitive drawing API used by diagram elements.
//!
//! A [`DrawHandler`] owns the current style, the layered command buffer and
//! the zoom state of one element. Primitive calls never render: they capture a
//! snapshot of the current style and enqueue a [`DrawCommand`]. Rendering
//! happens later in [`DrawHandler::draw_all`], against any [`Replay`] target.

use crate::color::StyleColor;
use crate::command::{DrawBuffer, DrawCommand, Layer, Primitive};
use crate::config::DrawConfig;
use crate::error::{StyleError, StyleResult};
use crate::style::{LineType, Style};
use crate::text::{AlignHorizontal, FormatLabel, MarkupAnalyzer, SimpleMarkup, StyledText, TextMetrics};
use crate::theme::{BACKGROUND_COLOR_KEY, ColorStyle, FOREGROUND_COLOR_KEY, Theme, Transparency};
use crate::zoom::ZoomContext;
use kurbo::{Line, Point, Rect, Size};
use std::sync::Arc;

/// Upper bound shared by line width and font size.
const MAX_STYLE_VALUE: f64 = 5000.0;

/// Reference string for the generic line height: one ascender, one descender.
const HEIGHT_REFERENCE: &str = "Hy";

/// Target of a replay pass, implemented by backend renderers.
pub trait Replay {
    /// Called once before the commands of a pass are replayed.
    fn begin_pass(&mut self, zoom: &ZoomContext);

    /// Render one command. `overlay` replaces the command's foreground color
    /// when set. Implementations isolate failures per command.
    fn replay(&mut self, command: &DrawCommand, overlay: Option<StyleColor>, zoom: &ZoomContext);

    /// Called once after the last command of a pass.
    fn end_pass(&mut self) {}
}

/// Optional per-call style settings for the `*_with` primitive variants.
///
/// Applied to the current style before the primitive is issued; they stay in
/// effect afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleOverrides<'a> {
    pub bg: Option<&'a str>,
    pub fg: Option<&'a str>,
    pub line_type: Option<&'a str>,
    pub line_width: Option<f64>,
    pub transparency: Option<f64>,
}

/// Style state, command buffer and zoom of one drawable element.
pub struct DrawHandler {
    style: Style,
    overlay: Option<StyleColor>,
    buffer: DrawBuffer,
    zoom: ZoomContext,
    theme: Arc<Theme>,
    config: DrawConfig,
    metrics: Box<dyn TextMetrics>,
    markup: Box<dyn MarkupAnalyzer>,
}

impl DrawHandler {
    /// Create a handler with the default configuration and [`SimpleMarkup`].
    pub fn new(theme: Arc<Theme>, metrics: Box<dyn TextMetrics>) -> Self {
        Self::with_config(theme, metrics, DrawConfig::default())
    }

    pub fn with_config(theme: Arc<Theme>, metrics: Box<dyn TextMetrics>, config: DrawConfig) -> Self {
        let font_size = config.default_font_size.unwrap_or_else(|| metrics.default_font_size());
        let default_bg = theme.get_color(ColorStyle::DefaultBackground);
        let mut style = Style::new(
            theme.get_color(ColorStyle::DefaultForeground),
            default_bg,
            1.0,
            LineType::Solid,
            font_size,
        );
        style.set_default_background(default_bg);
        Self {
            style,
            overlay: None,
            buffer: DrawBuffer::new(),
            zoom: ZoomContext::new(config.zoom_factor, config.scaling_factor),
            theme,
            config,
            metrics,
            markup: Box::new(SimpleMarkup),
        }
    }

    /// Replace the markup analyzer used by [`print`](Self::print).
    pub fn with_markup(mut self, markup: Box<dyn MarkupAnalyzer>) -> Self {
        self.markup = markup;
        self
    }

    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    /// Switch themes. Already captured snapshots keep their colors.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    // ---- buffer control ----

    /// All background commands are replayed before the foreground commands,
    /// so text issued before a rectangle can still be placed behind it.
    pub fn set_layer(&mut self, layer: Layer) {
        self.buffer.set_layer(layer);
    }

    pub fn layer(&self) -> Layer {
        self.buffer.layer()
    }

    /// With drawing disabled primitives are dropped; useful for running the
    /// draw code only to compute sizes.
    pub fn set_enable_drawing(&mut self, enabled: bool) {
        self.buffer.set_enable_drawing(enabled);
    }

    /// Forget all buffered commands. Call before re-issuing primitives for
    /// changed content.
    pub fn clear_cache(&mut self) {
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &DrawBuffer {
        &self.buffer
    }

    fn add_drawable(&mut self, primitive: Primitive) {
        let command = DrawCommand::new(self.style.clone(), primitive);
        self.buffer.add_drawable(command);
    }

    // ---- zoom ----

    pub fn zoom(&self) -> &ZoomContext {
        &self.zoom
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom.zoom_factor()
    }

    pub fn set_zoom_factor(&mut self, zoom_factor: f64) {
        self.zoom.set_zoom_factor(zoom_factor);
    }

    /// Backend base scale, installed by each renderer on its next pass.
    pub fn set_new_scaling(&mut self, scaling_factor: f64) {
        self.zoom.set_scaling(scaling_factor);
    }

    // ---- replay ----

    /// Replay every buffered command: background layer first, then foreground,
    /// each in insertion order.
    pub fn draw_all(&self, target: &mut impl Replay) {
        target.begin_pass(&self.zoom);
        for command in self.buffer.iter() {
            target.replay(command, self.overlay, &self.zoom);
        }
        target.end_pass();
    }

    /// Like [`draw_all`](Self::draw_all), setting or clearing the selection
    /// overlay first.
    pub fn draw_all_selected(&mut self, target: &mut impl Replay, selected: bool) {
        self.overlay = if selected {
            Some(self.theme.get_color(ColorStyle::SelectionForeground))
        } else {
            None
        };
        self.draw_all(target);
    }

    /// Foreground color that currently overrides every command's foreground.
    pub fn overlay_foreground(&self) -> Option<StyleColor> {
        self.overlay
    }

    // ---- text metrics ----

    /// Split markup into lines and analyze each of them.
    pub fn analyze_lines(&self, multi_line_with_markup: &str) -> Vec<StyledText> {
        multi_line_with_markup.lines().map(|line| self.markup.analyze_line(line)).collect()
    }

    fn text_dimension(&self, line: &StyledText) -> Size {
        self.metrics.text_dimension(line, self.style.font_size())
    }

    /// Width of a single line with markup.
    pub fn text_width(&self, single_line_with_markup: &str) -> f64 {
        self.text_width_styled(&self.markup.analyze_line(single_line_with_markup))
    }

    /// Width of a single already analyzed line.
    pub fn text_width_styled(&self, line: &StyledText) -> f64 {
        self.text_dimension(line).width
    }

    /// Height of a single line with markup.
    pub fn text_height(&self, single_line_with_markup: &str) -> f64 {
        self.text_height_styled(&self.markup.analyze_line(single_line_with_markup))
    }

    pub fn text_height_styled(&self, line: &StyledText) -> f64 {
        self.text_dimension(line).height
    }

    /// Generic line height at the current font size. Use this for vertical
    /// layout; backends cannot report per-string ascent and descent.
    pub fn text_height_max(&self) -> f64 {
        self.text_dimension(&StyledText::plain(HEIGHT_REFERENCE)).height
    }

    pub fn text_height_max_with_space(&self) -> f64 {
        self.text_height_max() + self.distance_between_text_lines()
    }

    pub fn distance_between_text_lines(&self) -> f64 {
        self.config.distance_between_text_lines
    }

    pub fn distance_border_to_text(&self) -> f64 {
        self.config.distance_border_to_text
    }

    pub fn default_font_size(&self) -> f64 {
        self.config
            .default_font_size
            .unwrap_or_else(|| self.metrics.default_font_size())
    }

    // ---- style ----

    /// Set the foreground from a token: the default-foreground key resolves
    /// through the theme, anything else is parsed as a color literal. Invalid
    /// literals fall back to the theme default.
    pub fn set_foreground_color_str(&mut self, color: &str) {
        if color == FOREGROUND_COLOR_KEY {
            self.set_foreground_color(Some(self.theme.get_color(ColorStyle::DefaultForeground)));
        } else {
            let parsed = self.theme.for_string(color, Transparency::Foreground.alpha());
            if parsed.is_none() {
                log::debug!("invalid foreground color {color:?}, using theme default");
            }
            self.set_foreground_color(parsed);
        }
    }

    /// `None` selects the theme's default foreground.
    pub fn set_foreground_color(&mut self, color: Option<StyleColor>) {
        let color = color.unwrap_or_else(|| self.theme.get_color(ColorStyle::DefaultForeground));
        self.style.set_foreground(color);
    }

    /// Set the background from a token without losing a previously set
    /// transparency.
    ///
    /// While the background was never set explicitly the background preset
    /// alpha is used, otherwise the current background's own alpha is kept.
    /// This makes `bg=` and `transparency=` independent of their order.
    pub fn set_background_color_and_keep_transparency(&mut self, color: &str) {
        if color == BACKGROUND_COLOR_KEY {
            self.set_background_color(None);
            return;
        }
        let alpha = if self.style.has_default_background() {
            Transparency::Background.alpha()
        } else {
            self.style.background().a
        };
        let parsed = self.theme.for_string(color, alpha);
        if parsed.is_none() {
            log::debug!("invalid background color {color:?}, using theme default");
        }
        self.set_background_color(parsed);
    }

    /// `None` selects the theme's default background.
    pub fn set_background_color(&mut self, color: Option<StyleColor>) {
        match color {
            Some(color) => self.style.set_background(color),
            None => self
                .style
                .set_default_background(self.theme.get_color(ColorStyle::DefaultBackground)),
        }
    }

    /// Set the background transparency in percent: 0 is opaque, 100 fully
    /// transparent. Only the background alpha changes.
    pub fn set_transparency(&mut self, transparency: f64) -> StyleResult<()> {
        if !(0.0..=100.0).contains(&transparency) {
            return Err(StyleError::Transparency(transparency));
        }
        let alpha = (255.0 - transparency * 2.55).trunc() as u8;
        let background = self.style.background().with_alpha(alpha);
        self.style.set_background(background);
        Ok(())
    }

    pub fn foreground_color(&self) -> StyleColor {
        self.style.foreground()
    }

    pub fn background_color(&self) -> StyleColor {
        self.style.background()
    }

    pub fn reset_color_settings(&mut self) {
        self.set_foreground_color_str(FOREGROUND_COLOR_KEY);
        self.set_background_color_and_keep_transparency(BACKGROUND_COLOR_KEY);
    }

    pub fn set_font_size(&mut self, font_size: f64) -> StyleResult<()> {
        assert_style_range(font_size)?;
        self.style.set_font_size(font_size);
        Ok(())
    }

    pub fn font_size(&self) -> f64 {
        self.style.font_size()
    }

    pub fn set_line_type(&mut self, line_type: LineType) {
        self.style.set_line_type(line_type);
    }

    /// Lenient variant for markup tokens; unknown tokens select a solid line.
    pub fn set_line_type_str(&mut self, line_type: &str) {
        self.style.set_line_type(LineType::from_token(line_type));
    }

    pub fn line_type(&self) -> LineType {
        self.style.line_type()
    }

    pub fn set_line_width(&mut self, line_width: f64) -> StyleResult<()> {
        assert_style_range(line_width)?;
        self.style.set_line_width(line_width);
        Ok(())
    }

    pub fn line_width(&self) -> f64 {
        self.style.line_width()
    }

    /// Theme colors, solid line of width 1, default font size.
    pub fn reset_style(&mut self) {
        self.reset_color_settings();
        self.style.set_font_size(self.default_font_size());
        self.style.set_line_type(LineType::Solid);
        self.style.set_line_width(1.0);
    }

    /// Independent copy of the current style.
    pub fn style_clone(&self) -> Style {
        self.style.clone()
    }

    pub fn set_style(&mut self, style: &Style) {
        self.style = style.clone();
    }

    fn apply_overrides(&mut self, overrides: &StyleOverrides<'_>) -> StyleResult<()> {
        if let Some(line_width) = overrides.line_width {
            self.set_line_width(line_width)?;
        }
        if let Some(line_type) = overrides.line_type {
            self.set_line_type_str(line_type);
        }
        if let Some(fg) = overrides.fg {
            self.set_foreground_color_str(fg);
        }
        if let Some(bg) = overrides.bg {
            self.set_background_color_and_keep_transparency(bg);
        }
        if let Some(transparency) = overrides.transparency {
            self.set_transparency(transparency)?;
        }
        Ok(())
    }

    // ---- primitives ----

    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.draw_lines(&[Point::new(x1, y1), Point::new(x2, y2)]);
    }

    pub fn draw_line_seg(&mut self, line: Line) {
        self.draw_lines(&[line.p0, line.p1]);
    }

    /// Line with optional foreground, line type and width overrides.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line_with(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        fg: Option<&str>,
        line_type: Option<&str>,
        line_width: Option<f64>,
    ) -> StyleResult<()> {
        self.apply_overrides(&StyleOverrides {
            fg,
            line_type,
            line_width,
            ..StyleOverrides::default()
        })?;
        self.draw_line(x1, y1, x2, y2);
        Ok(())
    }

    /// Polyline through `points`. Equal first and last points close the shape,
    /// which is then filled with the background color. Fewer than two points
    /// draw nothing.
    pub fn draw_lines(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        self.add_drawable(Primitive::Lines {
            points: points.to_vec(),
        });
    }

    /// Connected segments, flattened to their end points.
    pub fn draw_line_segments(&mut self, lines: &[Line]) {
        let points: Vec<Point> = lines.iter().flat_map(|l| [l.p0, l.p1]).collect();
        self.draw_lines(&points);
    }

    pub fn draw_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.add_drawable(Primitive::Rectangle {
            rect: Rect::new(x, y, x + width, y + height),
        });
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.draw_rectangle(rect.x0, rect.y0, rect.width(), rect.height());
    }

    pub fn draw_rectangle_with(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        overrides: &StyleOverrides<'_>,
    ) -> StyleResult<()> {
        self.apply_overrides(overrides)?;
        self.draw_rectangle(x, y, width, height);
        Ok(())
    }

    pub fn draw_rectangle_round(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        self.add_drawable(Primitive::RectangleRound {
            rect: Rect::new(x, y, x + width, y + height),
            radius,
        });
    }

    pub fn draw_rectangle_round_with(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        overrides: &StyleOverrides<'_>,
    ) -> StyleResult<()> {
        self.apply_overrides(overrides)?;
        self.draw_rectangle_round(x, y, width, height, radius);
        Ok(())
    }

    /// Circle around the center `(x, y)`.
    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.add_drawable(Primitive::Circle {
            center: Point::new(x, y),
            radius,
        });
    }

    pub fn draw_circle_with(&mut self, x: f64, y: f64, radius: f64, overrides: &StyleOverrides<'_>) -> StyleResult<()> {
        self.apply_overrides(overrides)?;
        self.draw_circle(x, y, radius);
        Ok(())
    }

    /// Ellipse inscribed in the box with top-left `(x, y)`.
    pub fn draw_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.add_drawable(Primitive::Ellipse {
            rect: Rect::new(x, y, x + width, y + height),
        });
    }

    pub fn draw_ellipse_with(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        overrides: &StyleOverrides<'_>,
    ) -> StyleResult<()> {
        self.apply_overrides(overrides)?;
        self.draw_ellipse(x, y, width, height);
        Ok(())
    }

    /// Arc of the ellipse inscribed in `(x, y, width, height)`.
    ///
    /// `start` is in degrees, 0 pointing right and 90 pointing up. `extent`
    /// is measured from `start` and limited to a full turn. Arcs that are not
    /// `open` are drawn as pie slices closed through the center.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(&mut self, x: f64, y: f64, width: f64, height: f64, start: f64, extent: f64, open: bool) {
        self.add_drawable(Primitive::Arc {
            rect: Rect::new(x, y, x + width, y + height),
            start,
            extent: extent.clamp(-360.0, 360.0),
            open,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc_with(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        start: f64,
        extent: f64,
        open: bool,
        overrides: &StyleOverrides<'_>,
    ) -> StyleResult<()> {
        self.apply_overrides(overrides)?;
        self.draw_arc(x, y, width, height, start, extent, open);
        Ok(())
    }

    /// Embed a pre-encoded base64 image stretched to the given box.
    pub fn draw_base64_image(&mut self, x: f64, y: f64, width: f64, height: f64, data: &str) {
        self.add_drawable(Primitive::Image {
            rect: Rect::new(x, y, x + width, y + height),
            data: data.to_string(),
        });
    }

    /// Print text that may span several lines (separated by `\n`). Each line
    /// is analyzed for markup and aligned on its own.
    pub fn print(&mut self, multi_line_with_markup: &str, x: f64, y: f64, align: AlignHorizontal) {
        let lines = self.analyze_lines(multi_line_with_markup);
        self.print_helper(lines, Point::new(x, y), align);
    }

    pub fn print_with_fg(&mut self, multi_line_with_markup: &str, x: f64, y: f64, align: AlignHorizontal, fg: Option<&str>) {
        if let Some(fg) = fg {
            self.set_foreground_color_str(fg);
        }
        self.print(multi_line_with_markup, x, y, align);
    }

    /// Print one line exactly as given.
    pub fn print_styled(&mut self, line: &StyledText, x: f64, y: f64, align: AlignHorizontal) {
        self.print_helper(vec![line.clone()], Point::new(x, y), align);
    }

    /// Print unanalyzed lines, all with the same formats.
    pub fn print_lines(&mut self, lines: &[&str], formats: &[FormatLabel], point: Point, align: AlignHorizontal) {
        let lines = lines
            .iter()
            .map(|line| StyledText::new(formats.iter().copied(), *line))
            .collect();
        self.print_helper(lines, point, align);
    }

    fn print_helper(&mut self, lines: Vec<StyledText>, origin: Point, align: AlignHorizontal) {
        let line_height = self.text_height_max_with_space();
        self.add_drawable(Primitive::Text {
            lines,
            origin,
            align,
            line_height,
        });
    }
}

fn assert_style_range(value: f64) -> StyleResult<()> {
    if !(0.0..=MAX_STYLE_VALUE).contains(&value) {
        return Err(StyleError::OutOfRange {
            value,
            min: 0.0,
            max: MAX_STYLE_VALUE,
        });
    }
    Ok(())
}
