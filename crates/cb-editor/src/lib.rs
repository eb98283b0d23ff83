pub mod input;
pub mod interaction;
pub mod persist;
pub mod shortcuts;
pub mod sync;

pub use input::{InputEvent, Modifiers};
pub use interaction::{GestureKind, Interaction, Scratch};
pub use persist::{CanvasHost, Debouncer, Notice, PersistenceBridge};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use sync::{CanvasEngine, CanvasMutation};
