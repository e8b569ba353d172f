//! Composite figures built from the primitive API.
//!
//! Each figure is sized by a single `dimension`; the helper functions expose
//! the derived measures so callers can compute minimum element sizes.

use crate::handler::DrawHandler;
use kurbo::Point;

/// Folder-like package outline: a title tab on top of the body.
///
/// Returns the closed outline points.
pub fn draw_package(
    drawer: &mut DrawHandler,
    upper_left: Point,
    title_height: f64,
    title_width: f64,
    full_height: f64,
    full_width: f64,
) -> Vec<Point> {
    let Point { x, y } = upper_left;
    let points = vec![
        upper_left,
        Point::new(x + title_width, y),
        Point::new(x + title_width, y + title_height),
        Point::new(x + full_width, y + title_height),
        Point::new(x + full_width, y + full_height),
        Point::new(x, y + full_height),
        upper_left,
    ];
    drawer.draw_lines(&points);
    drawer.draw_line(x, y + title_height, x + title_width, y + title_height);
    points
}

/// Stick figure centered on `h_center`, head touching `y_top`.
pub fn draw_actor(drawer: &mut DrawHandler, h_center: f64, y_top: f64, dimension: f64) {
    let head = head_radius(dimension);
    let arms = arm_length(dimension);
    let body_end = y_top + head_to_body_length(dimension);
    drawer.draw_circle(h_center, y_top + head, head);
    drawer.draw_line(h_center - arms, y_top + arm_height(dimension), h_center + arms, y_top + arm_height(dimension));
    drawer.draw_line(h_center, y_top + head * 2.0, h_center, body_end);
    let legs_end = y_top + head_to_leg_length(dimension);
    drawer.draw_line(h_center, body_end, h_center - leg_span(dimension), legs_end);
    drawer.draw_line(h_center, body_end, h_center + leg_span(dimension), legs_end);
}

/// Total actor height from the top of the head to the feet.
pub fn head_to_leg_length(dimension: f64) -> f64 {
    leg_span(dimension) * 2.0 + head_to_body_length(dimension)
}

fn leg_span(dimension: f64) -> f64 {
    dimension
}

fn head_to_body_length(dimension: f64) -> f64 {
    dimension * 2.0 + head_radius(dimension) * 2.0
}

fn arm_height(dimension: f64) -> f64 {
    arm_length(dimension)
}

/// Half the actor's arm span.
pub fn arm_length(dimension: f64) -> f64 {
    dimension * 1.5
}

fn head_radius(dimension: f64) -> f64 {
    dimension / 2.0
}

/// Circle resting on a horizontal base line.
pub fn draw_entity(drawer: &mut DrawHandler, h_center: f64, y_top: f64, dimension: f64) {
    let r = entity_circle_radius(dimension);
    drawer.draw_circle(h_center, y_top + r, r);
    drawer.draw_line(h_center - r, y_top + r * 2.0, h_center + r, y_top + r * 2.0);
}

pub fn entity_circle_radius(dimension: f64) -> f64 {
    dimension * 1.5
}

/// Circle attached to a vertical bar on its left.
pub fn draw_boundary(drawer: &mut DrawHandler, h_center: f64, y_top: f64, dimension: f64) {
    let r = boundary_circle_radius(dimension);
    let bar_x = h_center - r - middle_line_length(dimension) + middle_line_left_padding(dimension);
    drawer.draw_circle(h_center, y_top + r, r);
    drawer.draw_line(bar_x, y_top, bar_x, y_top + r * 2.0);
    drawer.draw_line(bar_x, y_top + r, h_center - r, y_top + r);
}

pub fn boundary_circle_radius(dimension: f64) -> f64 {
    dimension * 1.5
}

/// Length of the connector between the boundary bar and circle.
pub fn middle_line_length(dimension: f64) -> f64 {
    dimension
}

fn middle_line_left_padding(dimension: f64) -> f64 {
    dimension / 2.0
}

/// Circle with an arrow head on its top edge.
pub fn draw_control(drawer: &mut DrawHandler, h_center: f64, y_top: f64, dimension: f64) {
    let span = arrow_span(dimension);
    let r = control_circle_radius(dimension);
    drawer.draw_circle(h_center, y_top + span + r, r);
    drawer.draw_line(h_center + span, y_top, h_center, y_top + span);
    drawer.draw_line(h_center, y_top + span, h_center + span, y_top + span * 2.0);
}

pub fn control_circle_radius(dimension: f64) -> f64 {
    dimension * 1.5
}

pub fn arrow_span(dimension: f64) -> f64 {
    dimension / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Primitive;
    use crate::text::ApproximateMetrics;
    use crate::theme::Theme;
    use std::sync::Arc;

    fn handler() -> DrawHandler {
        DrawHandler::new(Arc::new(Theme::light()), Box::new(ApproximateMetrics::default()))
    }

    #[test]
    fn test_package_outline_is_closed() {
        let mut h = handler();
        let points = draw_package(&mut h, Point::new(0.0, 0.0), 10.0, 30.0, 50.0, 80.0);
        assert_eq!(points.first(), points.last());
        assert_eq!(h.buffer().len(), 2);
    }

    #[test]
    fn test_actor_primitives() {
        let mut h = handler();
        draw_actor(&mut h, 20.0, 0.0, 10.0);
        let kinds: Vec<&str> = h.buffer().iter().map(|c| c.primitive.kind()).collect();
        assert_eq!(kinds, vec!["circle", "lines", "lines", "lines", "lines"]);
        assert!((head_to_leg_length(10.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_geometry() {
        let mut h = handler();
        draw_boundary(&mut h, 50.0, 0.0, 10.0);
        let first = h.buffer().iter().next().unwrap();
        match first.primitive {
            Primitive::Circle { center, radius } => {
                assert!((center.y - 15.0).abs() < f64::EPSILON);
                assert!((radius - 15.0).abs() < f64::EPSILON);
            }
            ref other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_entity_and_control() {
        let mut h = handler();
        draw_entity(&mut h, 0.0, 0.0, 4.0);
        draw_control(&mut h, 0.0, 0.0, 4.0);
        assert_eq!(h.buffer().len(), 5);
        assert!((arrow_span(4.0) - 2.0).abs() < f64::EPSILON);
    }
}
