//! Link geometry: side anchors and cubic curves between them.
//!
//! A link leaves its source card perpendicular to the source side and
//! enters the target perpendicular to the target side. Both control points
//! sit a fixed distance out along the side normals, so the curve shape does
//! not depend on where the cards are relative to each other.

use crate::model::{Document, Edge, Node, Side};
use kurbo::{CubicBez, ParamCurveNearest, Point, Rect, Vec2};

/// Midpoint of the given side of the card's bounding box.
pub fn anchor(node: &Node, side: Side) -> Point {
    anchor_rect(node.bounds(), side)
}

/// Midpoint of the given side of a rectangle.
pub fn anchor_rect(r: Rect, side: Side) -> Point {
    let c = r.center();
    match side {
        Side::Top => Point::new(c.x, r.y0),
        Side::Bottom => Point::new(c.x, r.y1),
        Side::Left => Point::new(r.x0, c.y),
        Side::Right => Point::new(r.x1, c.y),
    }
}

/// Unit outward normal of a side.
pub fn side_normal(side: Side) -> Vec2 {
    match side {
        Side::Top => Vec2::new(0.0, -1.0),
        Side::Bottom => Vec2::new(0.0, 1.0),
        Side::Left => Vec2::new(-1.0, 0.0),
        Side::Right => Vec2::new(1.0, 0.0),
    }
}

/// Cubic curve from `from` to `to`.
///
/// `to_side` is `None` for a link still being drawn: the end control point
/// then coincides with the pointer.
pub fn curve(
    from: Point,
    from_side: Side,
    to: Point,
    to_side: Option<Side>,
    offset: f64,
) -> CubicBez {
    let c1 = from + side_normal(from_side) * offset;
    let c2 = match to_side {
        Some(side) => to + side_normal(side) * offset,
        None => to,
    };
    CubicBez::new(from, c1, c2, to)
}

/// Curve of a committed link, or `None` when either endpoint card is
/// missing. Such links are skipped at render time, never repaired.
pub fn edge_curve(doc: &Document, edge: &Edge, offset: f64) -> Option<CubicBez> {
    let from = doc.node(edge.from_node)?;
    let to = doc.node(edge.to_node)?;
    Some(curve(
        anchor(from, edge.from_side),
        edge.from_side,
        anchor(to, edge.to_side),
        Some(edge.to_side),
        offset,
    ))
}

/// Shortest distance from `p` to the curve.
pub fn distance_to_curve(c: &CubicBez, p: Point) -> f64 {
    c.nearest(p, 1e-3).distance_sq.sqrt()
}

/// SVG path data (`M … C …`) for hosts that draw links as SVG.
pub fn svg_path(c: &CubicBez) -> String {
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        c.p0.x, c.p0.y, c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y
    )
}
