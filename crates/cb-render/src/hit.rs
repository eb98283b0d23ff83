//! Hit testing: canvas point → what the pointer is over.
//!
//! Cards are walked front-to-back (last painted = topmost). For each card
//! the handles are tried before the body so that a press on the card rim
//! starts a connection or resize rather than a move. Links lie beneath the
//! cards and are only tried when no card claims the point.

use cb_core::CanvasConfig;
use cb_core::geometry::{anchor, distance_to_curve, edge_curve};
use cb_core::id::{EdgeId, NodeId};
use cb_core::model::{Document, Node, Side};
use kurbo::{Point, Rect};

/// Which dimension a resize handle changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    /// Right edge.
    Width,
    /// Bottom edge.
    Height,
    /// Bottom-right corner.
    Both,
}

/// The interactive element under a point. Each handle is identified by its
/// owning card plus its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Empty,
    Node(NodeId),
    Resize(NodeId, ResizeHandle),
    Connect(NodeId, Side),
    Edge(EdgeId),
}

impl HitTarget {
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            HitTarget::Node(id) | HitTarget::Resize(id, _) | HitTarget::Connect(id, _) => Some(id),
            HitTarget::Empty | HitTarget::Edge(_) => None,
        }
    }
}

/// Hit radii in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOptions {
    pub handle_radius: f64,
    pub edge_tolerance: f64,
    pub curve_offset: f64,
}

impl HitOptions {
    /// Convert the screen-pixel radii of `config` to canvas units at `scale`,
    /// so handles keep a constant on-screen size at every zoom level.
    pub fn for_scale(config: &CanvasConfig, scale: f64) -> Self {
        Self {
            handle_radius: config.handle_radius / scale,
            edge_tolerance: config.edge_hit_tolerance / scale,
            curve_offset: config.curve_offset,
        }
    }
}

/// Find the topmost interactive element at canvas point `p`.
pub fn hit_test(doc: &Document, p: Point, opts: &HitOptions) -> HitTarget {
    for node in doc.nodes.iter().rev() {
        if let Some(hit) = hit_node(node, p, opts.handle_radius) {
            return hit;
        }
    }

    // Later links are painted over earlier ones.
    for edge in doc.edges.iter().rev() {
        if let Some(c) = edge_curve(doc, edge, opts.curve_offset)
            && distance_to_curve(&c, p) <= opts.edge_tolerance
        {
            return HitTarget::Edge(edge.id);
        }
    }

    HitTarget::Empty
}

fn hit_node(node: &Node, p: Point, r: f64) -> Option<HitTarget> {
    for side in Side::ALL {
        if anchor(node, side).distance(p) <= r {
            return Some(HitTarget::Connect(node.id, side));
        }
    }

    let b = node.bounds();
    let corner = Rect::new(b.x1 - r, b.y1 - r, b.x1 + r, b.y1 + r);
    if contains(&corner, p) {
        return Some(HitTarget::Resize(node.id, ResizeHandle::Both));
    }
    let right = Rect::new(b.x1 - r, b.y0, b.x1 + r, b.y1);
    if contains(&right, p) {
        return Some(HitTarget::Resize(node.id, ResizeHandle::Width));
    }
    let bottom = Rect::new(b.x0, b.y1 - r, b.x1, b.y1 + r);
    if contains(&bottom, p) {
        return Some(HitTarget::Resize(node.id, ResizeHandle::Height));
    }

    contains(&b, p).then_some(HitTarget::Node(node.id))
}

/// Closed-interval containment (kurbo's `Rect::contains` excludes the far edges).
fn contains(r: &Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
