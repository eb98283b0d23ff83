pub mod hit;
pub mod paint;
pub mod palette;

pub use hit::{HitOptions, HitTarget, ResizeHandle, hit_test};
pub use paint::{Overlay, PaintStats, ProvisionalEdge, paint_scene};
pub use palette::{CardPalette, palette};
