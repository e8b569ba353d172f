//! Deferred draw commands and the layered command buffer.

use crate::style::Style;
use crate::text::{AlignHorizontal, StyledText};
use kurbo::{Point, Rect};

/// Paint order bucket. All background commands are replayed before any
/// foreground command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    #[default]
    Background,
    Foreground,
}

/// Geometry of a deferred primitive, in unzoomed diagram coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Polyline; closed and fillable when the first and last point are equal.
    Lines { points: Vec<Point> },
    Rectangle { rect: Rect },
    RectangleRound { rect: Rect, radius: f64 },
    Circle { center: Point, radius: f64 },
    /// Ellipse inscribed in `rect`.
    Ellipse { rect: Rect },
    /// Arc of the ellipse inscribed in `rect`. Angles in degrees, 0 = +x,
    /// 90 = up.
    Arc {
        rect: Rect,
        start: f64,
        extent: f64,
        open: bool,
    },
    /// Lines of text laid out top to bottom from `origin`, `line_height`
    /// apart.
    Text {
        lines: Vec<StyledText>,
        origin: Point,
        align: AlignHorizontal,
        line_height: f64,
    },
    /// Pre-encoded image payload, handed to the backend untouched.
    Image { rect: Rect, data: String },
}

impl Primitive {
    /// Short name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Lines { .. } => "lines",
            Primitive::Rectangle { .. } => "rectangle",
            Primitive::RectangleRound { .. } => "rounded rectangle",
            Primitive::Circle { .. } => "circle",
            Primitive::Ellipse { .. } => "ellipse",
            Primitive::Arc { .. } => "arc",
            Primitive::Text { .. } => "text",
            Primitive::Image { .. } => "image",
        }
    }
}

/// A primitive together with the style captured when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub style: Style,
    pub primitive: Primitive,
}

impl DrawCommand {
    pub fn new(style: Style, primitive: Primitive) -> Self {
        Self { style, primitive }
    }
}

/// Two ordered command lists, one per [`Layer`].
#[derive(Debug, Clone)]
pub struct DrawBuffer {
    background: Vec<DrawCommand>,
    foreground: Vec<DrawCommand>,
    layer: Layer,
    enabled: bool,
}

impl Default for DrawBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawBuffer {
    pub fn new() -> Self {
        Self {
            background: Vec::new(),
            foreground: Vec::new(),
            layer: Layer::Background,
            enabled: true,
        }
    }

    /// Layer that subsequent [`add_drawable`](Self::add_drawable) calls append to.
    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// While disabled, added commands are dropped instead of buffered.
    pub fn set_enable_drawing(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.enabled
    }

    pub fn add_drawable(&mut self, command: DrawCommand) {
        if !self.enabled {
            log::trace!("drawing disabled, dropping {}", command.primitive.kind());
            return;
        }
        match self.layer {
            Layer::Background => self.background.push(command),
            Layer::Foreground => self.foreground.push(command),
        }
    }

    /// Drop every buffered command of both layers.
    pub fn clear(&mut self) {
        self.background.clear();
        self.foreground.clear();
    }

    /// Commands of one layer in insertion order.
    pub fn layer_commands(&self, layer: Layer) -> &[DrawCommand] {
        match layer {
            Layer::Background => &self.background,
            Layer::Foreground => &self.foreground,
        }
    }

    /// Replay order: background commands, then foreground commands.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.background.iter().chain(self.foreground.iter())
    }

    pub fn len(&self) -> usize {
        self.background.len() + self.foreground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.background.is_empty() && self.foreground.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::StyleColor;
    use crate::style::LineType;

    fn command(x: f64) -> DrawCommand {
        let style = Style::new(StyleColor::black(), StyleColor::white(), 1.0, LineType::Solid, 12.0);
        DrawCommand::new(style, Primitive::Circle { center: Point::new(x, 0.0), radius: 1.0 })
    }

    fn xs<'a>(commands: impl Iterator<Item = &'a DrawCommand>) -> Vec<f64> {
        commands
            .map(|c| match c.primitive {
                Primitive::Circle { center, .. } => center.x,
                _ => f64::NAN,
            })
            .collect()
    }

    #[test]
    fn test_background_replays_first() {
        let mut buffer = DrawBuffer::new();
        buffer.set_layer(Layer::Foreground);
        buffer.add_drawable(command(1.0));
        buffer.set_layer(Layer::Background);
        buffer.add_drawable(command(2.0));
        buffer.set_layer(Layer::Foreground);
        buffer.add_drawable(command(3.0));
        buffer.set_layer(Layer::Background);
        buffer.add_drawable(command(4.0));

        assert_eq!(xs(buffer.iter()), vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_disabled_drops_commands() {
        let mut buffer = DrawBuffer::new();
        buffer.set_enable_drawing(false);
        buffer.add_drawable(command(1.0));
        buffer.set_enable_drawing(true);
        assert!(buffer.is_empty());
        buffer.add_drawable(command(2.0));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut buffer = DrawBuffer::new();
        buffer.add_drawable(command(1.0));
        buffer.set_layer(Layer::Foreground);
        buffer.add_drawable(command(2.0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.layer(), Layer::Foreground);
    }
}
