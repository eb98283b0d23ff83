//! Pointer gesture state machine.
//!
//! Exactly one gesture is active at a time. A gesture starts on pointer-down
//! (only from `Idle`), runs on every pointer-move, and ends on the global
//! pointer-up or on `cancel()`. While it runs, the card's candidate bounds and
//! the alignment guides live in `Scratch`; the committed document is only
//! changed by the mutations returned at the end of the gesture.
//!
//! | Pressed on          | Gesture                       | Commits on release |
//! |---------------------|-------------------------------|--------------------|
//! | empty canvas        | `Panning`                     | (viewport only)    |
//! | card body           | `MovingNode`                  | `MoveNode`         |
//! | right / bottom rim  | `ResizingWidth` / `…Height`   | `ResizeNode`       |
//! | bottom-right corner | `ResizingBoth`                | `ResizeNode`       |
//! | side handle         | `DrawingEdge`                 | `AddEdge`          |

use crate::input::InputEvent;
use crate::sync::CanvasMutation;
use cb_core::geometry::anchor;
use cb_core::id::NodeId;
use cb_core::model::{Document, Edge, Side};
use cb_core::snap::{Guides, SnapEngine};
use cb_core::viewport::ViewportController;
use cb_render::hit::{HitTarget, ResizeHandle};
use cb_render::paint::ProvisionalEdge;
use kurbo::{Point, Rect, Size};
use smallvec::{SmallVec, smallvec};

/// Which gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureKind {
    #[default]
    Idle,
    Panning,
    MovingNode,
    ResizingWidth,
    ResizingHeight,
    ResizingBoth,
    DrawingEdge,
}

#[derive(Debug, Clone, Copy, Default)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        /// Pointer position at the previous move, in client pixels.
        last: Point,
    },
    MovingNode {
        id: NodeId,
        start: Point,
        origin: Point,
        size: Size,
    },
    Resizing {
        id: NodeId,
        handle: ResizeHandle,
        start: Point,
        origin: Point,
        size: Size,
    },
    DrawingEdge {
        from: NodeId,
        side: Side,
    },
}

impl Gesture {
    fn kind(&self) -> GestureKind {
        match self {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Panning { .. } => GestureKind::Panning,
            Gesture::MovingNode { .. } => GestureKind::MovingNode,
            Gesture::Resizing { handle, .. } => match handle {
                ResizeHandle::Width => GestureKind::ResizingWidth,
                ResizeHandle::Height => GestureKind::ResizingHeight,
                ResizeHandle::Both => GestureKind::ResizingBoth,
            },
            Gesture::DrawingEdge { .. } => GestureKind::DrawingEdge,
        }
    }
}

/// Non-committed gesture state, painted over the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scratch {
    /// Candidate bounds of the card being moved or resized.
    pub candidate: Option<(NodeId, Rect)>,
    pub guides: Guides,
    /// Last pointer position in canvas units.
    pub pointer: Option<Point>,
}

/// Everything a gesture reads or drives while it runs.
pub struct GestureContext<'a> {
    /// The committed document as it is now.
    pub document: &'a Document,
    pub viewport: &'a mut ViewportController,
    pub snap: &'a SnapEngine,
    /// Resize floor.
    pub min_size: Size,
}

pub type Mutations = SmallVec<[CanvasMutation; 1]>;

#[derive(Debug, Default)]
pub struct Interaction {
    gesture: Gesture,
    scratch: Scratch,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureKind {
        self.gesture.kind()
    }

    /// Whether the host should route window-level pointer-move/up here.
    pub fn captures_pointer(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// The card the active gesture acts on, if any.
    pub fn target(&self) -> Option<NodeId> {
        match self.gesture {
            Gesture::MovingNode { id, .. } | Gesture::Resizing { id, .. } => Some(id),
            Gesture::DrawingEdge { from, .. } => Some(from),
            Gesture::Idle | Gesture::Panning { .. } => None,
        }
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// The link being drawn, if any, ending at the last pointer position.
    pub fn provisional_edge(&self) -> Option<ProvisionalEdge> {
        match (self.gesture, self.scratch.pointer) {
            (Gesture::DrawingEdge { from, side }, Some(to)) => Some(ProvisionalEdge {
                from,
                from_side: side,
                to,
            }),
            _ => None,
        }
    }

    /// Abandon the active gesture without committing anything.
    pub fn cancel(&mut self) {
        if self.captures_pointer() {
            log::debug!("gesture {:?} cancelled", self.state());
        }
        self.finish();
    }

    /// Feed one pointer event. `hit` is what lies under the pointer, and only
    /// matters for pointer-down and pointer-up.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        hit: HitTarget,
        cx: &mut GestureContext<'_>,
    ) -> Mutations {
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                self.begin(Point::new(x, y), hit, cx);
                SmallVec::new()
            }
            InputEvent::PointerMove { x, y } => {
                self.update(Point::new(x, y), cx);
                SmallVec::new()
            }
            InputEvent::PointerUp { x, y } => {
                self.scratch.pointer = Some(cx.viewport.screen_to_canvas(x, y));
                let mutations = self.end(hit, cx.document);
                self.finish();
                mutations
            }
            InputEvent::PointerCancel => {
                self.cancel();
                SmallVec::new()
            }
            _ => SmallVec::new(),
        }
    }

    fn begin(&mut self, at: Point, hit: HitTarget, cx: &mut GestureContext<'_>) {
        if self.captures_pointer() {
            log::trace!("pointer-down ignored during {:?}", self.state());
            return;
        }
        self.scratch = Scratch {
            pointer: Some(cx.viewport.screen_to_canvas(at.x, at.y)),
            ..Scratch::default()
        };

        self.gesture = match hit {
            HitTarget::Empty => Gesture::Panning { last: at },
            HitTarget::Node(id) => match cx.document.node(id) {
                Some(node) => Gesture::MovingNode {
                    id,
                    start: at,
                    origin: node.origin(),
                    size: node.size(),
                },
                None => Gesture::Idle,
            },
            HitTarget::Resize(id, handle) => match cx.document.node(id) {
                Some(node) => Gesture::Resizing {
                    id,
                    handle,
                    start: at,
                    origin: node.origin(),
                    size: node.size(),
                },
                None => Gesture::Idle,
            },
            HitTarget::Connect(id, side) => match cx.document.node(id) {
                Some(node) => {
                    self.scratch.pointer = Some(anchor(node, side));
                    Gesture::DrawingEdge { from: id, side }
                }
                None => Gesture::Idle,
            },
            // Links are selected, not dragged.
            HitTarget::Edge(_) => Gesture::Idle,
        };
        if self.captures_pointer() {
            log::debug!("gesture {:?} started on {hit:?}", self.state());
        }
    }

    fn update(&mut self, at: Point, cx: &mut GestureContext<'_>) {
        let pointer = cx.viewport.screen_to_canvas(at.x, at.y);
        self.scratch.pointer = Some(pointer);

        match self.gesture {
            Gesture::Idle | Gesture::DrawingEdge { .. } => {}
            // Incremental, so a zoom in the middle of a pan is kept.
            Gesture::Panning { last } => {
                let delta = at - last;
                cx.viewport.pan_by(delta.x, delta.y);
                self.gesture = Gesture::Panning { last: at };
            }
            Gesture::MovingNode {
                id,
                start,
                origin,
                size,
            } => {
                let delta = (at - start) / cx.viewport.scale();
                let candidate = Rect::from_origin_size(origin + delta, size);
                let snapped = cx.snap.snap(id, candidate, &cx.document.nodes);
                self.scratch.candidate = Some((id, Rect::from_origin_size(snapped.position, size)));
                self.scratch.guides = snapped.guides;
            }
            Gesture::Resizing {
                id,
                handle,
                start,
                origin,
                size,
            } => {
                let delta = (at - start) / cx.viewport.scale();
                let (dw, dh) = match handle {
                    ResizeHandle::Width => (delta.x, 0.0),
                    ResizeHandle::Height => (0.0, delta.y),
                    ResizeHandle::Both => (delta.x, delta.y),
                };
                let next = Size::new(
                    (size.width + dw).max(cx.min_size.width),
                    (size.height + dh).max(cx.min_size.height),
                );
                self.scratch.candidate = Some((id, Rect::from_origin_size(origin, next)));
            }
        }
    }

    fn end(&self, hit: HitTarget, doc: &Document) -> Mutations {
        match self.gesture {
            Gesture::Idle | Gesture::Panning { .. } => SmallVec::new(),
            Gesture::MovingNode { .. } => match self.scratch.candidate {
                Some((id, r)) => smallvec![CanvasMutation::MoveNode {
                    id,
                    x: r.x0,
                    y: r.y0
                }],
                None => SmallVec::new(),
            },
            Gesture::Resizing { .. } => match self.scratch.candidate {
                Some((id, r)) => smallvec![CanvasMutation::ResizeNode {
                    id,
                    width: r.width(),
                    height: r.height(),
                }],
                None => SmallVec::new(),
            },
            Gesture::DrawingEdge { from, side } => match hit {
                HitTarget::Connect(to, to_side) if to != from => {
                    smallvec![CanvasMutation::AddEdge {
                        edge: Edge {
                            id: doc.fresh_edge_id(),
                            from_node: from,
                            from_side: side,
                            to_node: to,
                            to_side,
                        },
                    }]
                }
                _ => {
                    log::debug!("link from {from}.{} dropped on {hit:?}", side.as_str());
                    SmallVec::new()
                }
            },
        }
    }

    fn finish(&mut self) {
        self.gesture = Gesture::Idle;
        self.scratch.candidate = None;
        self.scratch.guides = Guides::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::model::Node;
    use cb_core::snap::SnapSettings;
    use cb_core::viewport::ZoomLimits;
    use kurbo::Vec2;
    use pretty_assertions::assert_eq;

    struct Rig {
        doc: Document,
        viewport: ViewportController,
        snap: SnapEngine,
        interaction: Interaction,
    }

    impl Rig {
        fn new() -> Self {
            let mut doc = Document::new();
            doc.add_node(Node::new(NodeId::intern("a"), 0.0, 0.0));
            doc.add_node(Node::new(NodeId::intern("b"), 300.0, 0.0));
            Self {
                doc,
                viewport: ViewportController::new(ZoomLimits::default()),
                snap: SnapEngine {
                    settings: SnapSettings::default(),
                    grid_size: 20.0,
                    threshold: 12.0,
                },
                interaction: Interaction::new(),
            }
        }

        fn send(&mut self, event: InputEvent, hit: HitTarget) -> Mutations {
            let mut cx = GestureContext {
                document: &self.doc,
                viewport: &mut self.viewport,
                snap: &self.snap,
                min_size: Size::new(120.0, 60.0),
            };
            self.interaction.handle(&event, hit, &mut cx)
        }

        fn move_to(&mut self, x: f64, y: f64) {
            self.send(InputEvent::PointerMove { x, y }, HitTarget::Empty);
        }
    }

    #[test]
    fn pan_moves_viewport_by_raw_screen_delta() {
        let mut rig = Rig::new();
        rig.viewport.viewport.scale = 2.0;
        rig.send(InputEvent::pointer_down(500.0, 500.0), HitTarget::Empty);
        assert_eq!(rig.interaction.state(), GestureKind::Panning);
        rig.move_to(530.0, 480.0);
        assert_eq!(rig.viewport.viewport.offset(), Vec2::new(30.0, -20.0));
        let out = rig.send(InputEvent::PointerUp { x: 530.0, y: 480.0 }, HitTarget::Empty);
        assert!(out.is_empty());
        assert!(!rig.interaction.captures_pointer());
    }

    #[test]
    fn zoom_during_pan_survives_next_move() {
        let mut rig = Rig::new();
        rig.send(InputEvent::pointer_down(400.0, 300.0), HitTarget::Empty);
        rig.move_to(410.0, 300.0);
        let under_cursor = rig.viewport.screen_to_canvas(410.0, 300.0);

        assert!(rig.viewport.zoom_at(410.0, 300.0, 1.0));
        rig.move_to(410.0, 300.0);
        let after = rig.viewport.screen_to_canvas(410.0, 300.0);
        assert!((after - under_cursor).hypot() < 1e-9, "drifted to {after:?}");

        // Later moves still pan by the raw screen delta.
        let offset = rig.viewport.viewport.offset();
        rig.move_to(420.0, 295.0);
        assert_eq!(rig.viewport.viewport.offset(), offset + Vec2::new(10.0, -5.0));
    }

    #[test]
    fn gesture_target_names_the_card_in_play() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        assert_eq!(rig.interaction.target(), None);
        rig.send(InputEvent::pointer_down(180.0, 40.0), HitTarget::Connect(a, Side::Right));
        assert_eq!(rig.interaction.target(), Some(a));
        rig.interaction.cancel();
        rig.send(InputEvent::pointer_down(900.0, 900.0), HitTarget::Empty);
        assert_eq!(rig.interaction.target(), None);
    }

    #[test]
    fn move_is_scaled_by_inverse_zoom() {
        let mut rig = Rig::new();
        rig.viewport.viewport.scale = 2.0;
        let a = NodeId::intern("a");
        rig.send(InputEvent::pointer_down(50.0, 50.0), HitTarget::Node(a));
        rig.move_to(90.0, 70.0);
        assert_eq!(
            rig.interaction.scratch().candidate,
            Some((a, Rect::new(20.0, 10.0, 200.0, 90.0)))
        );
        // The committed document is untouched until release.
        assert_eq!(rig.doc.node(a).unwrap().origin(), Point::ZERO);

        let out = rig.send(InputEvent::PointerUp { x: 90.0, y: 70.0 }, HitTarget::Node(a));
        assert_eq!(
            out.into_vec(),
            vec![CanvasMutation::MoveNode {
                id: a,
                x: 20.0,
                y: 10.0
            }]
        );
        assert_eq!(rig.interaction.scratch().candidate, None);
    }

    #[test]
    fn click_without_drag_commits_nothing() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        rig.send(InputEvent::pointer_down(50.0, 50.0), HitTarget::Node(a));
        let out = rig.send(InputEvent::PointerUp { x: 50.0, y: 50.0 }, HitTarget::Node(a));
        assert!(out.is_empty());
    }

    #[test]
    fn resize_is_clamped_to_floor() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        rig.send(
            InputEvent::pointer_down(180.0, 80.0),
            HitTarget::Resize(a, ResizeHandle::Both),
        );
        assert_eq!(rig.interaction.state(), GestureKind::ResizingBoth);
        rig.move_to(-400.0, -400.0);
        let out = rig.send(InputEvent::PointerUp { x: -400.0, y: -400.0 }, HitTarget::Empty);
        assert_eq!(
            out.into_vec(),
            vec![CanvasMutation::ResizeNode {
                id: a,
                width: 120.0,
                height: 60.0
            }]
        );
    }

    #[test]
    fn width_handle_leaves_height_alone() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        rig.send(
            InputEvent::pointer_down(180.0, 40.0),
            HitTarget::Resize(a, ResizeHandle::Width),
        );
        rig.move_to(230.0, 140.0);
        assert_eq!(
            rig.interaction.scratch().candidate,
            Some((a, Rect::new(0.0, 0.0, 230.0, 80.0)))
        );
    }

    #[test]
    fn drawing_edge_tracks_pointer_and_completes_on_other_card() {
        let mut rig = Rig::new();
        let (a, b) = (NodeId::intern("a"), NodeId::intern("b"));
        rig.send(
            InputEvent::pointer_down(180.0, 40.0),
            HitTarget::Connect(a, Side::Right),
        );
        assert_eq!(
            rig.interaction.provisional_edge().map(|p| p.to),
            Some(Point::new(180.0, 40.0))
        );
        rig.move_to(250.0, 60.0);
        assert_eq!(
            rig.interaction.provisional_edge().map(|p| p.to),
            Some(Point::new(250.0, 60.0))
        );

        let out = rig.send(
            InputEvent::PointerUp { x: 300.0, y: 40.0 },
            HitTarget::Connect(b, Side::Left),
        );
        assert_eq!(out.len(), 1);
        let CanvasMutation::AddEdge { edge } = &out[0] else {
            panic!("expected AddEdge, got {out:?}");
        };
        assert_eq!(
            (edge.from_node, edge.from_side, edge.to_node, edge.to_side),
            (a, Side::Right, b, Side::Left)
        );
        assert_eq!(rig.interaction.provisional_edge(), None);
    }

    #[test]
    fn drawing_edge_onto_same_card_or_body_cancels() {
        let mut rig = Rig::new();
        let (a, b) = (NodeId::intern("a"), NodeId::intern("b"));
        rig.send(
            InputEvent::pointer_down(180.0, 40.0),
            HitTarget::Connect(a, Side::Right),
        );
        let out = rig.send(
            InputEvent::PointerUp { x: 90.0, y: 0.0 },
            HitTarget::Connect(a, Side::Top),
        );
        assert!(out.is_empty());

        rig.send(
            InputEvent::pointer_down(180.0, 40.0),
            HitTarget::Connect(a, Side::Right),
        );
        let out = rig.send(InputEvent::PointerUp { x: 350.0, y: 40.0 }, HitTarget::Node(b));
        assert!(out.is_empty());
        assert_eq!(rig.interaction.state(), GestureKind::Idle);
    }

    #[test]
    fn second_pointer_down_is_ignored_during_gesture() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        rig.send(InputEvent::pointer_down(500.0, 500.0), HitTarget::Empty);
        rig.send(InputEvent::pointer_down(50.0, 50.0), HitTarget::Node(a));
        assert_eq!(rig.interaction.state(), GestureKind::Panning);
    }

    #[test]
    fn cancel_discards_scratch() {
        let mut rig = Rig::new();
        let a = NodeId::intern("a");
        rig.send(InputEvent::pointer_down(50.0, 50.0), HitTarget::Node(a));
        rig.move_to(100.0, 100.0);
        assert!(rig.interaction.scratch().candidate.is_some());
        let out = rig.send(InputEvent::PointerCancel, HitTarget::Empty);
        assert!(out.is_empty());
        assert_eq!(rig.interaction.state(), GestureKind::Idle);
        assert_eq!(rig.interaction.scratch().candidate, None);
        assert!(rig.interaction.scratch().guides.is_empty());
    }

    #[test]
    fn pointer_is_tracked_while_idle() {
        let mut rig = Rig::new();
        rig.move_to(12.0, 34.0);
        assert_eq!(rig.interaction.scratch().pointer, Some(Point::new(12.0, 34.0)));
        assert!(!rig.interaction.captures_pointer());
    }
}
