//! Canvas engine: committed document + viewport + gestures + persistence.
//!
//! The engine is the single mutable context every event handler reads. Input
//! flows one way:
//!
//! - **Events → mutations**: pointer events are hit-tested against the
//!   committed document and fed to the gesture state machine, which returns
//!   `CanvasMutation`s when a gesture commits. Keyboard shortcuts and host
//!   toolbar calls produce the same mutations directly.
//!
//! - **Mutations → host**: every mutation that changes the document re-arms
//!   the persistence debounce; `tick` exports the document once the canvas
//!   has been quiet long enough.

use crate::input::InputEvent;
use crate::interaction::{GestureContext, Interaction};
use crate::persist::{CanvasHost, Notice, PersistenceBridge};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use cb_core::config::CanvasConfig;
use cb_core::geometry::{anchor_rect, curve};
use cb_core::id::{EdgeId, NodeId};
use cb_core::model::*;
use cb_core::parser::parse_document;
use cb_core::snap::{SnapEngine, SnapSettings};
use cb_core::viewport::{ViewportController, ZoomLimits};
use cb_render::hit::{HitOptions, HitTarget, hit_test};
use cb_render::paint::Overlay;
use kurbo::{CubicBez, Point, Size};

/// A change to the committed document.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasMutation {
    MoveNode { id: NodeId, x: f64, y: f64 },
    ResizeNode { id: NodeId, width: f64, height: f64 },
    AddNode { node: Box<Node> },
    /// Removes the card and every link touching it.
    RemoveNode { id: NodeId },
    AddEdge { edge: Edge },
    RemoveEdge { id: EdgeId },
    SetText { id: NodeId, text: String },
    SetColor { id: NodeId, color: CardColor },
}

impl CanvasMutation {
    fn is_finite(&self) -> bool {
        match self {
            CanvasMutation::MoveNode { x, y, .. } => x.is_finite() && y.is_finite(),
            CanvasMutation::ResizeNode { width, height, .. } => {
                width.is_finite() && height.is_finite()
            }
            CanvasMutation::AddNode { node } => [node.x, node.y, node.width, node.height]
                .iter()
                .all(|v| v.is_finite()),
            _ => true,
        }
    }
}

/// The engine holds the authoritative document and everything that
/// interprets input against it.
pub struct CanvasEngine<H: CanvasHost> {
    /// The committed document (single source of truth).
    pub document: Document,
    pub viewport: ViewportController,
    interaction: Interaction,
    selection: Selection,
    /// Card whose text is being edited by the host.
    editing: Option<NodeId>,
    snap: SnapEngine,
    config: CanvasConfig,
    persist: PersistenceBridge<H>,
}

impl<H: CanvasHost> CanvasEngine<H> {
    /// Build an engine from the host's stored content. Invalid content
    /// yields an empty canvas.
    pub fn from_content(content: &str, config: CanvasConfig, host: H) -> Self {
        let mut engine = Self::new(config, host);
        engine.document = engine.load(content);
        engine
    }

    pub fn new(config: CanvasConfig, host: H) -> Self {
        Self {
            document: Document::new(),
            viewport: ViewportController::new(ZoomLimits::from_config(&config)),
            interaction: Interaction::new(),
            selection: Selection::None,
            editing: None,
            snap: SnapEngine::from_config(&config),
            persist: PersistenceBridge::new(host, config.debounce_ms),
            config,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Card currently in text-edit mode.
    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn host(&self) -> &H {
        self.persist.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.persist.host_mut()
    }

    /// Whether a change is waiting for the debounce to expire.
    pub fn has_pending_export(&self) -> bool {
        self.persist.is_pending()
    }

    /// Host time at which `tick` will export the pending change.
    pub fn export_deadline(&self) -> Option<f64> {
        self.persist.deadline()
    }

    fn min_size(&self) -> Size {
        Size::new(self.config.min_width, self.config.min_height)
    }

    /// Parse host content and raise every card to the configured floor.
    fn load(&self, content: &str) -> Document {
        let mut document = parse_document(content);
        let floor = self.min_size();
        for node in &mut document.nodes {
            node.clamp_size(floor);
        }
        document
    }

    /// Place the canvas element: client-space top-left and pixel size.
    pub fn set_element_rect(&mut self, origin: Point, size: Size) {
        self.viewport.set_origin(origin);
        self.viewport.set_size(size);
    }

    /// What lies under the client point `(sx, sy)`.
    pub fn hit_test(&self, sx: f64, sy: f64) -> HitTarget {
        let p = self.viewport.screen_to_canvas(sx, sy);
        let opts = HitOptions::for_scale(&self.config, self.viewport.scale());
        hit_test(&self.document, p, &opts)
    }

    /// Committed state plus gesture scratch, for painting.
    pub fn overlay(&self) -> Overlay {
        let scratch = self.interaction.scratch();
        Overlay {
            candidate: scratch.candidate,
            guides: scratch.guides,
            provisional: self.interaction.provisional_edge(),
            selection: self.selection,
            pointer: scratch.pointer,
        }
    }

    /// Curve of a link as it should be drawn now, following any card that
    /// is mid-drag. `None` for unknown or dangling links.
    pub fn link_curve(&self, id: EdgeId) -> Option<CubicBez> {
        let edge = self.document.edge(id)?;
        let overlay = self.overlay();
        let from = overlay.bounds_of(self.document.node(edge.from_node)?);
        let to = overlay.bounds_of(self.document.node(edge.to_node)?);
        Some(curve(
            anchor_rect(from, edge.from_side),
            edge.from_side,
            anchor_rect(to, edge.to_side),
            Some(edge.to_side),
            self.config.curve_offset,
        ))
    }

    /// Topmost card within handle reach of the last pointer position.
    fn hovered_card(&self) -> Option<NodeId> {
        let p = self.interaction.scratch().pointer?;
        let reach = self.config.handle_radius / self.viewport.scale();
        self.document
            .nodes
            .iter()
            .rev()
            .find(|n| n.bounds().inflate(reach, reach).contains(p))
            .map(|n| n.id)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Process one input event at host time `now_ms`. Returns `true` when
    /// the canvas needs a repaint.
    pub fn handle_event(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        log::trace!("event {event:?}");
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                let hit = self.hit_test(*x, *y);
                if !self.interaction.captures_pointer() {
                    self.select_hit(hit);
                }
                self.drive(event, hit, now_ms);
                true
            }
            InputEvent::PointerMove { .. } => {
                let hovered = self.hovered_card();
                self.drive(event, HitTarget::Empty, now_ms);
                // Hovering a different card changes which handles are shown.
                self.interaction.captures_pointer() || self.hovered_card() != hovered
            }
            InputEvent::PointerUp { x, y } => {
                let was_active = self.interaction.captures_pointer();
                let hit = self.hit_test(*x, *y);
                self.drive(event, hit, now_ms);
                was_active
            }
            InputEvent::PointerCancel => {
                let was_active = self.interaction.captures_pointer();
                self.interaction.cancel();
                was_active
            }
            InputEvent::DoubleClick { x, y } => self.double_click(*x, *y, now_ms),
            InputEvent::Wheel { x, y, delta_y } => {
                if *delta_y == 0.0 {
                    return false;
                }
                let direction = if *delta_y < 0.0 { 1.0 } else { -1.0 };
                self.viewport.zoom_at(*x, *y, direction)
            }
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => self.key(key, *ctrl, *shift, *alt, *meta, now_ms),
        }
    }

    fn drive(&mut self, event: &InputEvent, hit: HitTarget, now_ms: f64) {
        let min_size = self.min_size();
        let mut cx = GestureContext {
            document: &self.document,
            viewport: &mut self.viewport,
            snap: &self.snap,
            min_size,
        };
        let mutations = self.interaction.handle(event, hit, &mut cx);
        for mutation in mutations {
            self.apply_mutation(mutation, now_ms);
        }
    }

    fn select_hit(&mut self, hit: HitTarget) {
        self.selection = match hit {
            HitTarget::Empty => Selection::None,
            HitTarget::Edge(id) => Selection::Edge(id),
            HitTarget::Node(id) | HitTarget::Resize(id, _) | HitTarget::Connect(id, _) => {
                Selection::Node(id)
            }
        };
        if self.editing.is_some() && self.editing != self.selection.node() {
            self.end_text_edit();
        }
    }

    fn double_click(&mut self, sx: f64, sy: f64, now_ms: f64) -> bool {
        match self.hit_test(sx, sy) {
            HitTarget::Empty => {
                let centre = self.viewport.screen_to_canvas(sx, sy);
                self.create_node_centred(centre, now_ms);
                true
            }
            HitTarget::Node(id) => self.begin_text_edit(id),
            _ => false,
        }
    }

    fn key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        now_ms: f64,
    ) -> bool {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return false;
        };
        // Keystrokes belong to the text editor while a card is being edited.
        if self.editing.is_some() {
            return action == ShortcutAction::Deselect && self.end_text_edit();
        }
        log::debug!("shortcut {action:?}");
        match action {
            // The pressed card may be the one a gesture is acting on.
            ShortcutAction::Delete if self.interaction.captures_pointer() => false,
            ShortcutAction::Delete => self.delete_selection(now_ms),
            ShortcutAction::Deselect => {
                if self.interaction.captures_pointer() {
                    self.interaction.cancel();
                    return true;
                }
                let had = self.selection != Selection::None;
                self.selection = Selection::None;
                had
            }
            ShortcutAction::ZoomIn => self.viewport.zoom_step(1.0),
            ShortcutAction::ZoomOut => self.viewport.zoom_step(-1.0),
            ShortcutAction::ZoomReset => {
                self.viewport.reset();
                true
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation to the committed document. Returns `true` if the
    /// document changed, in which case an export is scheduled.
    pub fn apply_mutation(&mut self, mutation: CanvasMutation, now_ms: f64) -> bool {
        if !mutation.is_finite() {
            log::warn!("rejected non-finite mutation {mutation:?}");
            return false;
        }
        let changed = match mutation {
            CanvasMutation::MoveNode { id, x, y } => self.document.update_node(id, |n| {
                n.x = x;
                n.y = y;
            }),
            CanvasMutation::ResizeNode { id, width, height } => {
                let floor = self.min_size();
                self.document.update_node(id, |n| {
                    n.width = width;
                    n.height = height;
                    n.clamp_size(floor);
                })
            }
            CanvasMutation::AddNode { mut node } => {
                node.clamp_size(self.min_size());
                self.document.add_node(*node);
                true
            }
            CanvasMutation::RemoveNode { id } => match self.document.remove_node(id) {
                Some(links) => {
                    log::debug!("removed card {id} and {links} link(s)");
                    if self.interaction.target() == Some(id) {
                        self.interaction.cancel();
                    }
                    if self.selection.node() == Some(id) {
                        self.selection = Selection::None;
                    }
                    if self.editing == Some(id) {
                        self.editing = None;
                    }
                    true
                }
                None => false,
            },
            CanvasMutation::AddEdge { edge } => match self.document.add_edge(edge) {
                EdgeInsert::Added(id) => {
                    log::debug!("added link {id}");
                    true
                }
                EdgeInsert::Duplicate(existing) => {
                    log::warn!("duplicate link rejected (same as {existing})");
                    self.persist.notify(Notice::DuplicateEdge);
                    false
                }
            },
            CanvasMutation::RemoveEdge { id } => {
                let removed = self.document.remove_edge(id);
                if removed && self.selection.edge() == Some(id) {
                    self.selection = Selection::None;
                }
                removed
            }
            CanvasMutation::SetText { id, text } => {
                self.document.update_node(id, |n| n.text = text)
            }
            CanvasMutation::SetColor { id, color } => {
                self.document.update_node(id, |n| n.color = color)
            }
        };
        if changed {
            self.persist.mark_changed(now_ms);
        }
        changed
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Export the document if the debounce has expired.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.persist.tick(now_ms, &self.document)
    }

    /// Export a pending change immediately. Call before unmounting.
    pub fn flush(&mut self) -> bool {
        self.persist.flush(&self.document)
    }

    /// Replace the document with new content pushed by the host. Any gesture
    /// in flight and any unexported local change are dropped.
    pub fn replace_content(&mut self, content: &str) {
        self.interaction.cancel();
        self.persist.discard();
        self.document = self.load(content);
        if let Some(id) = self.selection.node()
            && self.document.node(id).is_none()
        {
            self.selection = Selection::None;
        }
        if let Some(id) = self.selection.edge()
            && self.document.edge(id).is_none()
        {
            self.selection = Selection::None;
        }
        if let Some(id) = self.editing
            && self.document.node(id).is_none()
        {
            self.editing = None;
        }
    }

    // ─── Host chrome ─────────────────────────────────────────────────────

    fn create_node_centred(&mut self, centre: Point, now_ms: f64) -> NodeId {
        let id = self.document.fresh_node_id();
        let (w, h) = (self.config.default_width, self.config.default_height);
        let mut node = Node::new(id, centre.x - w / 2.0, centre.y - h / 2.0);
        node.width = w;
        node.height = h;
        self.apply_mutation(CanvasMutation::AddNode { node: Box::new(node) }, now_ms);
        self.selection = Selection::Node(id);
        self.editing = Some(id);
        log::debug!("created card {id} at ({}, {})", centre.x - w / 2.0, centre.y - h / 2.0);
        id
    }

    /// Toolbar "add card": a default card centred in the visible area, in
    /// text-edit mode.
    pub fn add_node_at_view_center(&mut self, now_ms: f64) -> NodeId {
        let size = self.viewport.size();
        let centre = self
            .viewport
            .viewport
            .to_canvas(Point::new(size.width / 2.0, size.height / 2.0));
        self.create_node_centred(centre, now_ms)
    }

    pub fn set_node_text(&mut self, id: NodeId, text: &str, now_ms: f64) -> bool {
        self.apply_mutation(
            CanvasMutation::SetText {
                id,
                text: text.to_string(),
            },
            now_ms,
        )
    }

    pub fn set_node_color(&mut self, id: NodeId, color: CardColor, now_ms: f64) -> bool {
        self.apply_mutation(CanvasMutation::SetColor { id, color }, now_ms)
    }

    pub fn delete_node(&mut self, id: NodeId, now_ms: f64) -> bool {
        self.apply_mutation(CanvasMutation::RemoveNode { id }, now_ms)
    }

    pub fn delete_edge(&mut self, id: EdgeId, now_ms: f64) -> bool {
        self.apply_mutation(CanvasMutation::RemoveEdge { id }, now_ms)
    }

    /// Delete whatever is selected, unless its text is being edited.
    pub fn delete_selection(&mut self, now_ms: f64) -> bool {
        match self.selection {
            Selection::Node(id) if self.editing != Some(id) => self.delete_node(id, now_ms),
            Selection::Edge(id) => self.delete_edge(id, now_ms),
            _ => false,
        }
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn snap_settings(&self) -> SnapSettings {
        self.snap.settings
    }

    pub fn set_snap_settings(&mut self, settings: SnapSettings) {
        log::debug!("snap settings {settings:?}");
        self.snap.settings = settings;
    }

    /// Put a card into text-edit mode. Returns `false` if it does not exist.
    pub fn begin_text_edit(&mut self, id: NodeId) -> bool {
        if self.document.node(id).is_none() {
            return false;
        }
        self.selection = Selection::Node(id);
        self.editing = Some(id);
        true
    }

    pub fn end_text_edit(&mut self) -> bool {
        self.editing.take().is_some()
    }
}
