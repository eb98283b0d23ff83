//! Debounced export of the committed document to the host.
//!
//! Every committed change (re)arms a trailing-edge timer; once the canvas
//! has been quiet for the delay, the document is serialized and handed to
//! the host once. Time is passed in by the caller (`now_ms`), so the bridge
//! has no clock of its own and behaves identically natively and on wasm.

use cb_core::emitter::emit_document;
use cb_core::model::Document;

/// Host-side notifications that are not document changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A link with the same endpoints and sides already exists.
    DuplicateEdge,
}

/// The embedding application.
pub trait CanvasHost {
    /// Receives the serialized document after a quiet period.
    fn on_change(&mut self, serialized: &str);

    fn notify(&mut self, _notice: Notice) {}
}

/// Trailing-edge debounce deadline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debouncer {
    delay_ms: f64,
    /// When the pending export becomes due. `None` when nothing is pending.
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn schedule(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn due(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Debouncer plus host callback.
pub struct PersistenceBridge<H: CanvasHost> {
    host: H,
    debounce: Debouncer,
}

impl<H: CanvasHost> PersistenceBridge<H> {
    pub fn new(host: H, delay_ms: f64) -> Self {
        Self {
            host,
            debounce: Debouncer::new(delay_ms),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Whether a change is waiting to be exported.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// When the pending export fires, if any.
    pub fn deadline(&self) -> Option<f64> {
        self.debounce.deadline()
    }

    /// Record a committed change at `now_ms`.
    pub fn mark_changed(&mut self, now_ms: f64) {
        self.debounce.schedule(now_ms);
    }

    /// Export if the quiet period has elapsed. Returns whether it exported.
    pub fn tick(&mut self, now_ms: f64, doc: &Document) -> bool {
        if !self.debounce.due(now_ms) {
            return false;
        }
        self.export(doc);
        true
    }

    /// Export a pending change right away (unmount, blur).
    pub fn flush(&mut self, doc: &Document) -> bool {
        if !self.debounce.is_pending() {
            return false;
        }
        self.debounce.cancel();
        self.export(doc);
        true
    }

    /// Drop a pending change without exporting it (content replaced by host).
    pub fn discard(&mut self) {
        self.debounce.cancel();
    }

    pub fn notify(&mut self, notice: Notice) {
        self.host.notify(notice);
    }

    fn export(&mut self, doc: &Document) {
        match emit_document(doc) {
            Ok(serialized) => {
                log::debug!(
                    "export {} cards, {} links ({} bytes)",
                    doc.nodes.len(),
                    doc.edges.len(),
                    serialized.len()
                );
                self.host.on_change(&serialized);
            }
            Err(err) => log::error!("export failed: {err}"),
        }
    }
}
