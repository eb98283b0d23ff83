//! Document + gesture overlay → Vello drawing commands.
//!
//! The committed document is painted with the in-flight gesture layered on
//! top: a card being dragged or resized is drawn at its candidate bounds
//! (and its links follow it), alignment guides and the provisional link are
//! drawn last. The committed document itself is never touched here.

use crate::palette::palette;
use cb_core::geometry::{anchor_rect, curve, side_normal};
use cb_core::id::NodeId;
use cb_core::model::{Document, Edge, Node, Selection, Side};
use cb_core::snap::Guides;
use cb_core::viewport::Viewport;
use kurbo::{Affine, BezPath, Circle, CubicBez, Line, Point, Rect, Size, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

/// A link being drawn from a card handle toward the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProvisionalEdge {
    pub from: NodeId,
    pub from_side: Side,
    /// Pointer position in canvas units.
    pub to: Point,
}

/// Transient, non-committed state painted over the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlay {
    /// Candidate bounds of the card under a move or resize gesture.
    pub candidate: Option<(NodeId, Rect)>,
    pub guides: Guides,
    pub provisional: Option<ProvisionalEdge>,
    pub selection: Selection,
    /// Last pointer position in canvas units.
    pub pointer: Option<Point>,
}

impl Overlay {
    /// Bounds a card should be drawn with: its candidate if it is being
    /// dragged, otherwise its committed bounds.
    pub fn bounds_of(&self, node: &Node) -> Rect {
        match self.candidate {
            Some((id, rect)) if id == node.id => rect,
            _ => node.bounds(),
        }
    }

    /// Whether `node`'s connection handles are visible. `reach` is the handle
    /// radius in canvas units.
    ///
    /// While a link is drawn every card but the source shows them, so the
    /// release target can be seen. Otherwise the selected card and the card
    /// under the pointer do.
    pub fn shows_connectors(&self, node: &Node, reach: f64) -> bool {
        if let Some(p) = self.provisional {
            return p.from != node.id;
        }
        self.selection.node() == Some(node.id)
            || self
                .pointer
                .is_some_and(|p| self.bounds_of(node).inflate(reach, reach).contains(p))
    }

    fn rect_of(&self, doc: &Document, id: NodeId) -> Option<Rect> {
        doc.node(id).map(|n| self.bounds_of(n))
    }
}

/// Counts of what one paint pass drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintStats {
    pub cards: usize,
    pub links: usize,
    /// Cards drawn with their connection handles.
    pub connectors: usize,
    /// Links skipped because an endpoint card is missing.
    pub dangling: usize,
}

const HEADER_HEIGHT: f64 = 12.0;
const CORNER_RADIUS: f64 = 8.0;
const ARROW_SIZE: f64 = 10.0;

fn rgba([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

/// Paint the document and overlay into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`. `view_size` is the
/// element size in pixels and bounds the guide lines; `handle_radius` is in
/// screen pixels.
pub fn paint_scene(
    scene: &mut Scene,
    doc: &Document,
    overlay: &Overlay,
    viewport: &Viewport,
    view_size: Size,
    curve_offset: f64,
    handle_radius: f64,
) -> PaintStats {
    let transform = Affine::translate((viewport.x, viewport.y)) * Affine::scale(viewport.scale);
    let hairline = 1.0 / viewport.scale;
    let mut stats = PaintStats::default();

    // Links beneath cards.
    for edge in &doc.edges {
        match link_curve(doc, overlay, edge, curve_offset) {
            Some(c) => {
                let selected = overlay.selection.edge() == Some(edge.id);
                paint_link(scene, transform, &c, edge.to_side, selected, hairline);
                stats.links += 1;
            }
            None => {
                log::trace!("skip dangling link {}", edge.id);
                stats.dangling += 1;
            }
        }
    }

    let reach = handle_radius * hairline;
    for node in &doc.nodes {
        let bounds = overlay.bounds_of(node);
        let selected = overlay.selection.node() == Some(node.id);
        paint_card(scene, transform, node, bounds, selected, hairline);
        stats.cards += 1;
        if overlay.shows_connectors(node, reach) {
            paint_connectors(scene, transform, bounds, reach * 0.75, hairline);
            stats.connectors += 1;
        }
    }

    if let Some(p) = overlay.provisional
        && let Some(from) = overlay.rect_of(doc, p.from)
    {
        let c = curve(anchor_rect(from, p.from_side), p.from_side, p.to, None, curve_offset);
        let dashed =
            Stroke::new(2.0 * hairline).with_dashes(0.0, [6.0 * hairline, 4.0 * hairline]);
        scene.stroke(&dashed, transform, Color::from_rgb8(0x4D, 0xAB, 0xF7), None, &c);
    }

    let visible = Rect::from_points(
        viewport.to_canvas(Point::ZERO),
        viewport.to_canvas(Point::new(view_size.width, view_size.height)),
    );
    paint_guides(scene, transform, &overlay.guides, visible, hairline);

    stats
}

fn link_curve(doc: &Document, overlay: &Overlay, edge: &Edge, offset: f64) -> Option<CubicBez> {
    let from = overlay.rect_of(doc, edge.from_node)?;
    let to = overlay.rect_of(doc, edge.to_node)?;
    Some(curve(
        anchor_rect(from, edge.from_side),
        edge.from_side,
        anchor_rect(to, edge.to_side),
        Some(edge.to_side),
        offset,
    ))
}

fn paint_link(
    scene: &mut Scene,
    transform: Affine,
    c: &CubicBez,
    to_side: Side,
    selected: bool,
    hairline: f64,
) {
    let color = if selected {
        Color::from_rgb8(0x22, 0x8B, 0xE6)
    } else {
        Color::from_rgb8(0x86, 0x86, 0x8B)
    };
    let width = if selected { 3.0 } else { 2.0 } * hairline;
    scene.stroke(&Stroke::new(width), transform, color, None, c);

    // Arrowhead points into the target side.
    let tip = c.p3;
    let dir = -side_normal(to_side);
    let back = tip - dir * ARROW_SIZE;
    let perp = dir.turn_90() * (ARROW_SIZE / 2.0);
    let mut head = BezPath::new();
    head.move_to(tip);
    head.line_to(back + perp);
    head.line_to(back - perp);
    head.close_path();
    scene.fill(Fill::NonZero, transform, color, None, &head);
}

fn paint_card(
    scene: &mut Scene,
    transform: Affine,
    node: &Node,
    bounds: Rect,
    selected: bool,
    hairline: f64,
) {
    let colors = palette(node.color);
    let shape = bounds.to_rounded_rect(CORNER_RADIUS);
    scene.fill(Fill::NonZero, transform, rgba(colors.fill), None, &shape);

    let header = Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y0 + HEADER_HEIGHT)
        .to_rounded_rect((CORNER_RADIUS, CORNER_RADIUS, 0.0, 0.0));
    scene.fill(Fill::NonZero, transform, rgba(colors.header), None, &header);

    let (border, width) = if selected {
        (Color::from_rgb8(0x22, 0x8B, 0xE6), 2.0 * hairline)
    } else {
        (rgba(colors.border), hairline)
    };
    scene.stroke(&Stroke::new(width), transform, border, None, &shape);

    log::trace!(
        "CARD {} {:?} at ({}, {})",
        node.id,
        node.text,
        bounds.x0,
        bounds.y0
    );
    // Glyph shaping needs a font context owned by the host; text is drawn by the host layer.
}

fn paint_connectors(scene: &mut Scene, transform: Affine, bounds: Rect, r: f64, hairline: f64) {
    let accent = Color::from_rgb8(0x22, 0x8B, 0xE6);
    for side in Side::ALL {
        let dot = Circle::new(anchor_rect(bounds, side), r);
        scene.fill(Fill::NonZero, transform, Color::from_rgb8(0xFF, 0xFF, 0xFF), None, &dot);
        scene.stroke(&Stroke::new(1.5 * hairline), transform, accent, None, &dot);
    }
}

fn paint_guides(
    scene: &mut Scene,
    transform: Affine,
    guides: &Guides,
    visible: Rect,
    hairline: f64,
) {
    let color = Color::from_rgb8(0xFF, 0x3B, 0x8D);
    let stroke = Stroke::new(hairline);
    if let Some(x) = guides.vertical {
        let line = Line::new((x, visible.y0), (x, visible.y1));
        scene.stroke(&stroke, transform, color, None, &line);
    }
    if let Some(y) = guides.horizontal {
        let line = Line::new((visible.x0, y), (visible.x1, y));
        scene.stroke(&stroke, transform, color, None, &line);
    }
}
