//! Path math shared by all surfaces.

use inkplot_core::LineType;
use kurbo::{Arc as KurboArc, BezPath, PathEl, Point, Rect, Vec2};
use std::f64::consts::TAU;

/// A 1px line centered on an integer coordinate covers two half pixels;
/// shifting by half a pixel makes it cover exactly one.
pub const HALF_PX: f64 = 0.5;

/// Control point offset of a cubic Bezier quarter ellipse.
pub const KAPPA: f64 = 0.5522848;

/// Snap an already zoomed coordinate to the pixel grid.
pub fn snap(v: f64) -> f64 {
    v.trunc() + HALF_PX
}

/// Ellipse inscribed in `rect`, as four cubic segments starting at the left
/// edge midpoint and running through the top, right and bottom midpoints.
pub fn ellipse_path(rect: Rect) -> BezPath {
    let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
    let ox = w / 2.0 * KAPPA;
    let oy = h / 2.0 * KAPPA;
    let xe = x + w;
    let ye = y + h;
    let xm = x + w / 2.0;
    let ym = y + h / 2.0;

    let mut path = BezPath::new();
    path.move_to((x, ym));
    path.curve_to((x, ym - oy), (xm - ox, y), (xm, y));
    path.curve_to((xm + ox, y), (xe, ym - oy), (xe, ym));
    path.curve_to((xe, ym + oy), (xm + ox, ye), (xm, ye));
    path.curve_to((xm - ox, ye), (x, ym + oy), (x, ym));
    path.close_path();
    path
}

/// Rectangle with quadratic corners of `radius`, clamped to half the
/// smaller side.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
    let r = radius.max(0.0).min(w.abs() / 2.0).min(h.abs() / 2.0);

    let mut path = BezPath::new();
    path.move_to((x + r, y));
    path.line_to((x + w - r, y));
    path.quad_to((x + w, y), (x + w, y + r));
    path.line_to((x + w, y + h - r));
    path.quad_to((x + w, y + h), (x + w - r, y + h));
    path.line_to((x + r, y + h));
    path.quad_to((x, y + h), (x, y + h - r));
    path.line_to((x, y + r));
    path.quad_to((x, y), (x + r, y));
    path.close_path();
    path
}

/// Signed sweep of a canvas `arc(start, end, anticlockwise)` call.
///
/// Positive sweeps run clockwise on a y-down surface.
pub fn arc_sweep(start_angle: f64, end_angle: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        let diff = start_angle - end_angle;
        if diff >= TAU { -TAU } else { -diff.rem_euclid(TAU) }
    } else {
        let diff = end_angle - start_angle;
        if diff >= TAU { TAU } else { diff.rem_euclid(TAU) }
    }
}

/// Start point and cubic segments of a canvas-style circular arc.
pub fn arc_segments(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
) -> (Point, Vec<PathEl>) {
    let arc = KurboArc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle,
        sweep_angle: arc_sweep(start_angle, end_angle, anticlockwise),
        x_rotation: 0.0,
    };
    let start = center + Vec2::new(radius * start_angle.cos(), radius * start_angle.sin());
    (start, arc.append_iter(0.1).collect())
}

/// End points of the arc of the ellipse centered at `center` with radii
/// `rx`/`ry`, for diagram angles in degrees (0 = right, 90 = up).
pub fn arc_end_points(center: Point, rx: f64, ry: f64, start: f64, extent: f64) -> (Point, Point) {
    let at = |deg: f64| {
        let rad = deg.to_radians();
        Point::new(center.x + rx * rad.cos(), center.y - ry * rad.sin())
    };
    (at(start), at(start + extent))
}

/// Dash pattern for a line type, scaled with the line width.
///
/// Odd-length patterns are repeated once so on/off phases alternate the same
/// way on every surface.
pub fn dash_pattern(line_type: LineType, line_width: f64) -> Vec<f64> {
    let dot = line_width.max(2.0);
    let dash = 6.0 * (line_width / 2.0).max(1.0);
    let pattern = match line_type {
        LineType::Solid => return Vec::new(),
        LineType::Dashed => vec![dash],
        LineType::Dotted => vec![dot],
        LineType::DotDashed => vec![dot, dash],
        LineType::DotDotDashed => vec![dot, dot, dash],
    };
    if pattern.len() % 2 == 1 {
        pattern.iter().chain(pattern.iter()).copied().collect()
    } else {
        pattern
    }
}
