//! WASM bridge for Cardboard: exposes the card canvas engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the
//! `<canvas>` element, forwards DOM events here, calls `tick` from its
//! animation frame, and receives the serialized document through the
//! change callback passed to the constructor.

mod render2d;

use cb_core::config::CanvasConfig;
use cb_core::emitter::emit_document;
use cb_core::geometry::svg_path;
use cb_core::id::{EdgeId, NodeId};
use cb_core::model::{CardColor, Selection};
use cb_core::snap::SnapSettings;
use cb_editor::input::{InputEvent, Modifiers};
use cb_editor::persist::{CanvasHost, Notice};
use cb_editor::sync::CanvasEngine;
use kurbo::{Point, Size};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// Forwards engine output to JavaScript callbacks.
struct JsHost {
    on_change: js_sys::Function,
    on_notice: Option<js_sys::Function>,
}

impl CanvasHost for JsHost {
    fn on_change(&mut self, serialized: &str) {
        if let Err(err) = self
            .on_change
            .call1(&JsValue::NULL, &JsValue::from_str(serialized))
        {
            log::error!("change callback threw: {err:?}");
        }
    }

    fn notify(&mut self, notice: Notice) {
        let Some(callback) = &self.on_notice else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(notice_name(notice))) {
            log::error!("notice callback threw: {err:?}");
        }
    }
}

/// The WASM-facing canvas controller.
///
/// All interaction from the host page goes through this struct. Handlers
/// return `true` when the canvas should be re-rendered.
#[wasm_bindgen]
pub struct CardCanvas {
    engine: CanvasEngine<JsHost>,
    dark_mode: bool,
}

#[wasm_bindgen]
impl CardCanvas {
    /// Mount a canvas on the stored `content`. `config_json` may override
    /// any `CanvasConfig` field; invalid config falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(content: &str, on_change: js_sys::Function, config_json: Option<String>) -> Self {
        init_logging();

        let config = match config_json.as_deref().map(CanvasConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                log::warn!("ignoring canvas config: {err}");
                CanvasConfig::default()
            }
            None => CanvasConfig::default(),
        };
        let host = JsHost {
            on_change,
            on_notice: None,
        };
        Self {
            engine: CanvasEngine::from_content(content, config, host),
            dark_mode: false,
        }
    }

    /// Register a callback receiving notices such as `"duplicateEdge"`.
    pub fn set_notice_callback(&mut self, callback: js_sys::Function) {
        self.engine.host_mut().on_notice = Some(callback);
    }

    /// Element placement from `getBoundingClientRect()`.
    pub fn set_element_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.engine
            .set_element_rect(Point::new(left, top), Size::new(width, height));
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Render to a Canvas2D context sized to the element.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let size = self.engine.viewport.size();
        let config = self.engine.config();
        render2d::render_scene(
            ctx,
            &self.engine.document,
            &self.engine.overlay(),
            &self.engine.viewport.viewport,
            size.width,
            size.height,
            config.grid_size,
            config.curve_offset,
            config.handle_radius,
            self.engine.editing(),
            &theme,
        );
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        now_ms: f64,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.engine
            .handle_event(&InputEvent::PointerDown { x, y, modifiers }, now_ms)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.engine
            .handle_event(&InputEvent::PointerMove { x, y }, now_ms)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.engine.handle_event(&InputEvent::PointerUp { x, y }, now_ms)
    }

    /// `pointercancel` or window blur.
    pub fn handle_pointer_cancel(&mut self, now_ms: f64) -> bool {
        self.engine.handle_event(&InputEvent::PointerCancel, now_ms)
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.engine
            .handle_event(&InputEvent::DoubleClick { x, y }, now_ms)
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.engine
            .handle_event(&InputEvent::Wheel { x, y, delta_y }, 0.0)
    }

    /// Returns `true` if the key was consumed (the host should
    /// `preventDefault`).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        now_ms: f64,
    ) -> bool {
        let event = InputEvent::Key {
            key: key.to_string(),
            ctrl,
            shift,
            alt,
            meta,
        };
        self.engine.handle_event(&event, now_ms)
    }

    /// Whether window-level pointer-move/up listeners should be attached.
    pub fn captures_pointer(&self) -> bool {
        self.engine.interaction().captures_pointer()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Export if the debounce has expired. Call once per animation frame.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.engine.tick(now_ms)
    }

    /// Export any pending change now. Call before unmounting.
    pub fn flush(&mut self) -> bool {
        self.engine.flush()
    }

    pub fn has_pending_change(&self) -> bool {
        self.engine.has_pending_export()
    }

    /// Host time at which the pending change will be exported, so the host
    /// can schedule one timer instead of polling `tick`.
    pub fn get_export_deadline(&self) -> Option<f64> {
        self.engine.export_deadline()
    }

    /// The committed document, serialized.
    pub fn get_content(&self) -> String {
        emit_document(&self.engine.document).unwrap_or_else(|_| EMPTY_DOCUMENT.to_string())
    }

    /// Replace the document with content pushed by the host.
    pub fn set_content(&mut self, content: &str) {
        self.engine.replace_content(content);
    }

    // ─── Host chrome ─────────────────────────────────────────────────────

    /// Add a default card in the middle of the view. Returns its ID.
    pub fn add_node_at_view_center(&mut self, now_ms: f64) -> String {
        self.engine
            .add_node_at_view_center(now_ms)
            .as_str()
            .to_string()
    }

    pub fn set_node_text(&mut self, node_id: &str, text: &str, now_ms: f64) -> bool {
        self.engine
            .set_node_text(NodeId::intern(node_id), text, now_ms)
    }

    /// `color` is one of the palette names; unknown names map to `default`.
    pub fn set_node_color(&mut self, node_id: &str, color: &str, now_ms: f64) -> bool {
        self.engine
            .set_node_color(NodeId::intern(node_id), CardColor::from_name(color), now_ms)
    }

    pub fn delete_node(&mut self, node_id: &str, now_ms: f64) -> bool {
        self.engine.delete_node(NodeId::intern(node_id), now_ms)
    }

    pub fn delete_edge(&mut self, edge_id: &str, now_ms: f64) -> bool {
        self.engine.delete_edge(EdgeId::intern(edge_id), now_ms)
    }

    pub fn delete_selected(&mut self, now_ms: f64) -> bool {
        self.engine.delete_selection(now_ms)
    }

    pub fn set_snap_settings(&mut self, grid: bool, neighbors: bool) {
        self.engine
            .set_snap_settings(SnapSettings { grid, neighbors });
    }

    /// JSON `{"grid":bool,"neighbors":bool}`.
    pub fn get_snap_settings(&self) -> String {
        let s = self.engine.snap_settings();
        format!(r#"{{"grid":{},"neighbors":{}}}"#, s.grid, s.neighbors)
    }

    pub fn begin_text_edit(&mut self, node_id: &str) -> bool {
        self.engine.begin_text_edit(NodeId::intern(node_id))
    }

    pub fn end_text_edit(&mut self) -> bool {
        self.engine.end_text_edit()
    }

    /// ID of the card in text-edit mode, or `""`.
    pub fn get_editing_id(&self) -> String {
        self.engine
            .editing()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// JSON `{"kind":"none"|"node"|"edge","id":...}`.
    pub fn get_selection(&self) -> String {
        selection_json(self.engine.selection())
    }

    /// Client-space rectangle of a card, for positioning the host's text
    /// editor. JSON `{"x","y","width","height"}` or `"null"`.
    pub fn get_node_screen_rect(&self, node_id: &str) -> String {
        let Some(node) = self.engine.document.node(NodeId::intern(node_id)) else {
            return "null".to_string();
        };
        let b = node.bounds();
        let top_left = self.engine.viewport.canvas_to_screen(b.origin());
        let scale = self.engine.viewport.scale();
        let rect = ScreenRect {
            x: top_left.x,
            y: top_left.y,
            width: b.width() * scale,
            height: b.height() * scale,
        };
        serde_json::to_string(&rect).unwrap_or_else(|_| "null".to_string())
    }

    /// SVG path data for a link, following any card being dragged, or `""`
    /// if the link is unknown or dangling.
    pub fn get_edge_path(&self, edge_id: &str) -> String {
        self.engine
            .link_curve(EdgeId::intern(edge_id))
            .map(|c| svg_path(&c))
            .unwrap_or_default()
    }

    /// JSON `{"x","y","scale"}`.
    pub fn get_viewport(&self) -> String {
        let v = self.engine.viewport.viewport;
        format!(r#"{{"x":{},"y":{},"scale":{}}}"#, v.x, v.y, v.scale)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.engine.viewport.zoom_step(1.0)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.engine.viewport.zoom_step(-1.0)
    }

    pub fn reset_view(&mut self) {
        self.engine.viewport.reset();
    }
}

const EMPTY_DOCUMENT: &str = r#"{"nodes":[],"edges":[]}"#;

#[derive(Serialize)]
struct ScreenRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct SelectionJson<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

fn selection_json(selection: Selection) -> String {
    let (kind, id) = match &selection {
        Selection::None => ("none", None),
        Selection::Node(id) => ("node", Some(id.as_str())),
        Selection::Edge(id) => ("edge", Some(id.as_str())),
    };
    serde_json::to_string(&SelectionJson { kind, id })
        .unwrap_or_else(|_| r#"{"kind":"none"}"#.to_string())
}

fn notice_name(notice: Notice) -> &'static str {
    match notice {
        Notice::DuplicateEdge => "duplicateEdge",
    }
}

// ─── Logging & panic hook ────────────────────────────────────────────────

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        // A second canvas on the page finds the logger already installed.
        let _ = console_log::init_with_level(log::Level::Info);
        console_error_panic_hook::set_once();
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Normalize stored content. Invalid content yields the empty document.
#[wasm_bindgen]
pub fn normalize_content(content: &str) -> String {
    let doc = cb_core::parser::parse_document(content);
    emit_document(&doc).unwrap_or_else(|_| EMPTY_DOCUMENT.to_string())
}

/// Validate stored content. Returns JSON `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(content: &str) -> String {
    match cb_core::parser::try_parse_document(content) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
