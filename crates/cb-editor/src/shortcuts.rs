//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Keys typed
//! while a card's text is being edited never reach this map; the engine
//! filters them first.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Remove the selected card (with its links) or the selected link.
    Delete,
    /// Leave text editing, or clear the selection.
    Deselect,
    ZoomIn,
    ZoomOut,
    /// Back to the identity viewport.
    ZoomReset,
}

/// Resolves key events into shortcut actions.
///
/// Zoom keys work bare and with ⌘/Ctrl, so `Ctrl +` behaves the same as `+`
/// inside the canvas.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"+"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        _shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        match key {
            "=" | "+" if !alt => Some(ShortcutAction::ZoomIn),
            "-" | "_" if !alt => Some(ShortcutAction::ZoomOut),
            "0" if !alt => Some(ShortcutAction::ZoomReset),
            // ⌘Delete belongs to the browser / host app.
            "Delete" | "Backspace" if !cmd && !alt => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
