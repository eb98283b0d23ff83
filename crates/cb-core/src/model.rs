//! Core document model for card canvases.
//!
//! A document is a flat list of cards (`Node`) and directed links (`Edge`).
//! Links reference cards by ID and attach to one of the four compass sides.
//! Links whose endpoint is missing are tolerated: renderers skip them, and
//! only an explicit card deletion removes the links that reference it.

use crate::id::{EdgeId, NodeId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Smallest card width any committed mutation may produce.
pub const MIN_NODE_WIDTH: f64 = 120.0;
/// Smallest card height any committed mutation may produce.
pub const MIN_NODE_HEIGHT: f64 = 60.0;
pub const DEFAULT_NODE_WIDTH: f64 = 180.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;

// ─── Sides & colors ──────────────────────────────────────────────────────

/// Compass side of a card where a link departs or arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Palette slot of a card. Purely cosmetic.
///
/// Unknown names decode to `Default` so a document written by a newer
/// palette still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum CardColor {
    #[default]
    Default,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl CardColor {
    pub const ALL: [CardColor; 7] = [
        CardColor::Default,
        CardColor::Red,
        CardColor::Orange,
        CardColor::Yellow,
        CardColor::Green,
        CardColor::Blue,
        CardColor::Purple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CardColor::Default => "default",
            CardColor::Red => "red",
            CardColor::Orange => "orange",
            CardColor::Yellow => "yellow",
            CardColor::Green => "green",
            CardColor::Blue => "blue",
            CardColor::Purple => "purple",
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or_default()
    }
}

impl From<String> for CardColor {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<CardColor> for &'static str {
    fn from(color: CardColor) -> Self {
        color.as_str()
    }
}

// ─── Cards ───────────────────────────────────────────────────────────────

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

/// A rectangular text card. Position and size are in canvas units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: CardColor,
}

impl Node {
    /// A default-sized, empty, default-colored card with its top-left at `(x, y)`.
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            text: String::new(),
            color: CardColor::Default,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    /// Raise width/height to the given floor.
    pub fn clamp_size(&mut self, min: Size) {
        self.width = self.width.max(min.width);
        self.height = self.height.max(min.height);
    }
}

// ─── Links ───────────────────────────────────────────────────────────────

/// A directed link between two card sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub from_node: NodeId,
    pub from_side: Side,
    pub to_node: NodeId,
    pub to_side: Side,
}

/// The identity tuple two links may never share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from_node: NodeId,
    pub from_side: Side,
    pub to_node: NodeId,
    pub to_side: Side,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from_node: self.from_node,
            from_side: self.from_side,
            to_node: self.to_node,
            to_side: self.to_side,
        }
    }

    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from_node == node || self.to_node == node
    }
}

/// Outcome of inserting a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Added(EdgeId),
    /// An identical tuple already exists; the edge set is unchanged.
    Duplicate(EdgeId),
}

// ─── Selection ───────────────────────────────────────────────────────────

/// What the user last clicked. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

impl Selection {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Selection::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn edge(&self) -> Option<EdgeId> {
        match self {
            Selection::Edge(id) => Some(*id),
            _ => None,
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The persisted aggregate: every card and every link of one canvas block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_edge(&self, key: &EdgeKey) -> Option<EdgeId> {
        self.edges.iter().find(|e| e.key() == *key).map(|e| e.id)
    }

    /// A node ID not used by any card in this document.
    pub fn fresh_node_id(&self) -> NodeId {
        NodeId::fresh(|id| self.node(id).is_some())
    }

    /// An edge ID not used by any link in this document.
    pub fn fresh_edge_id(&self) -> EdgeId {
        EdgeId::fresh(|id| self.edge(id).is_some())
    }

    // ── In-place mutations ──

    /// Append a card. A card with the same ID is replaced in place.
    pub fn add_node(&mut self, node: Node) {
        match self.node_mut(node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    /// Apply `update` to a card. Returns `false` if the card is missing or
    /// the update left it unchanged.
    pub fn update_node(&mut self, id: NodeId, update: impl FnOnce(&mut Node)) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let before = node.clone();
        update(node);
        *node != before
    }

    /// Remove a card and every link that references it.
    /// Returns the number of links removed alongside, or `None` if the card
    /// did not exist.
    pub fn remove_node(&mut self, id: NodeId) -> Option<usize> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        self.nodes.remove(pos);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        Some(before - self.edges.len())
    }

    /// Insert a link unless an identical tuple already exists.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeInsert {
        if let Some(existing) = self.contains_edge(&edge.key()) {
            return EdgeInsert::Duplicate(existing);
        }
        let id = edge.id;
        self.edges.push(edge);
        EdgeInsert::Added(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        before != self.edges.len()
    }

    // ── Pure transforms ──

    pub fn with_node_added(&self, node: Node) -> Self {
        let mut next = self.clone();
        next.add_node(node);
        next
    }

    pub fn with_node_updated(&self, id: NodeId, update: impl FnOnce(&mut Node)) -> Self {
        let mut next = self.clone();
        next.update_node(id, update);
        next
    }

    pub fn with_node_removed(&self, id: NodeId) -> Self {
        let mut next = self.clone();
        next.remove_node(id);
        next
    }

    pub fn with_edge_added(&self, edge: Edge) -> (Self, EdgeInsert) {
        let mut next = self.clone();
        let outcome = next.add_edge(edge);
        (next, outcome)
    }

    pub fn with_edge_removed(&self, id: EdgeId) -> Self {
        let mut next = self.clone();
        next.remove_edge(id);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn card(name: &str, x: f64, y: f64) -> Node {
        Node::new(NodeId::intern(name), x, y)
    }

    fn link(name: &str, from: &str, from_side: Side, to: &str, to_side: Side) -> Edge {
        Edge {
            id: EdgeId::intern(name),
            from_node: NodeId::intern(from),
            from_side,
            to_node: NodeId::intern(to),
            to_side,
        }
    }

    fn triangle() -> Document {
        let mut doc = Document::new();
        doc.add_node(card("a", 0.0, 0.0));
        doc.add_node(card("b", 300.0, 0.0));
        doc.add_node(card("c", 0.0, 300.0));
        doc.add_edge(link("ab", "a", Side::Right, "b", Side::Left));
        doc.add_edge(link("bc", "b", Side::Bottom, "c", Side::Top));
        doc.add_edge(link("ca", "c", Side::Top, "a", Side::Bottom));
        doc
    }

    #[test]
    fn cascade_delete_removes_only_referencing_edges() {
        let mut doc = triangle();
        let removed = doc.remove_node(NodeId::intern("a"));
        assert_eq!(removed, Some(2));
        let remaining: Vec<&str> = doc.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["bc"]);
        assert!(doc.node(NodeId::intern("a")).is_none());
    }

    #[test]
    fn removing_missing_node_is_noop() {
        let mut doc = triangle();
        assert_eq!(doc.remove_node(NodeId::intern("zzz")), None);
        assert_eq!(doc, triangle());
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut doc = triangle();
        let before = doc.edges.clone();
        let outcome = doc.add_edge(link("ab2", "a", Side::Right, "b", Side::Left));
        assert_eq!(outcome, EdgeInsert::Duplicate(EdgeId::intern("ab")));
        assert_eq!(doc.edges, before);
    }

    #[test]
    fn same_nodes_different_sides_is_not_a_duplicate() {
        let mut doc = triangle();
        let outcome = doc.add_edge(link("ab_top", "a", Side::Top, "b", Side::Left));
        assert_eq!(outcome, EdgeInsert::Added(EdgeId::intern("ab_top")));
        assert_eq!(doc.edges.len(), 4);
    }

    #[test]
    fn edge_removal_leaves_nodes_alone() {
        let mut doc = triangle();
        assert!(doc.remove_edge(EdgeId::intern("bc")));
        assert!(!doc.remove_edge(EdgeId::intern("bc")));
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.edges.len(), 2);
    }

    #[test]
    fn pure_transforms_leave_source_untouched() {
        let doc = triangle();
        let moved = doc.with_node_updated(NodeId::intern("b"), |n| n.x = 500.0);
        assert_eq!(doc.node(NodeId::intern("b")).unwrap().x, 300.0);
        assert_eq!(moved.node(NodeId::intern("b")).unwrap().x, 500.0);

        let (with_edge, outcome) =
            doc.with_edge_added(link("ac", "a", Side::Bottom, "c", Side::Top));
        assert!(matches!(outcome, EdgeInsert::Added(_)));
        assert_eq!(doc.edges.len(), 3);
        assert_eq!(with_edge.edges.len(), 4);

        let without = doc.with_node_removed(NodeId::intern("c"));
        assert_eq!(without.edges.len(), 1);
        assert_eq!(doc.with_edge_removed(EdgeId::intern("ab")).edges.len(), 2);
        assert_eq!(doc.with_node_added(card("d", 1.0, 1.0)).nodes.len(), 4);
    }

    #[test]
    fn update_reports_change() {
        let mut doc = triangle();
        let id = NodeId::intern("a");
        assert!(!doc.update_node(id, |n| n.x = 0.0));
        assert!(doc.update_node(id, |n| n.text = "hello".into()));
        assert!(!doc.update_node(NodeId::intern("nope"), |n| n.x = 1.0));
    }

    #[test]
    fn fresh_node_id_avoids_existing() {
        let doc = triangle();
        let id = doc.fresh_node_id();
        assert!(doc.node(id).is_none());
    }

    #[test]
    fn color_names_roundtrip_and_unknown_falls_back() {
        for color in CardColor::ALL {
            assert_eq!(CardColor::from_name(color.as_str()), color);
        }
        assert_eq!(CardColor::from_name("chartreuse"), CardColor::Default);
    }
}
