//! Input abstraction layer.
//!
//! Normalizes DOM pointer, wheel and keyboard events into a single
//! `InputEvent` enum consumed by the canvas engine. Pointer coordinates are
//! client-space screen pixels; the engine converts them through the viewport.

/// Keyboard modifier state at the time of a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A normalized input event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas element.
    PointerDown { x: f64, y: f64, modifiers: Modifiers },

    /// Pointer moved anywhere in the window while a gesture is active, or
    /// over the canvas otherwise.
    PointerMove { x: f64, y: f64 },

    /// Pointer released anywhere in the window.
    PointerUp { x: f64, y: f64 },

    /// The gesture was interrupted (pointercancel, window blur).
    PointerCancel,

    DoubleClick { x: f64, y: f64 },

    /// Wheel over the canvas. Negative `delta_y` (wheel up) zooms in.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// Keyboard event (`KeyboardEvent.key` plus modifiers).
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl InputEvent {
    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some((*x, *y)),
            Self::PointerCancel | Self::Key { .. } => None,
        }
    }
}
