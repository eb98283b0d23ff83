pub mod config;
pub mod emitter;
pub mod geometry;
pub mod id;
pub mod model;
pub mod parser;
pub mod snap;
pub mod viewport;

pub use config::{CanvasConfig, ConfigError};
pub use emitter::emit_document;
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use parser::{DocumentError, parse_document, try_parse_document};
pub use snap::{Guides, SnapEngine, SnapResult, SnapSettings, snap_to_grid};
pub use viewport::{Viewport, ViewportController, ZoomLimits};

// Re-export kurbo primitives so downstream crates agree on one geometry vocabulary
pub use kurbo::{CubicBez, Point, Rect, Size, Vec2};
