//! Alignment snapping for card moves.
//!
//! Snapping is advisory: it only nudges the candidate position of the card
//! being dragged, it never blocks a move. The pipeline is grid first, then
//! neighbor alignment, so when both fire the neighbor result wins.

use crate::config::CanvasConfig;
use crate::id::NodeId;
use crate::model::Node;
use kurbo::{Point, Rect};

/// Round `v` to the nearest multiple of `grid`.
pub fn snap_to_grid(v: f64, grid: f64) -> f64 {
    (v / grid).round() * grid
}

/// Which snap modes are active. Toggled independently from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapSettings {
    pub grid: bool,
    pub neighbors: bool,
}

/// Alignment guides shown while dragging. At most one per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Guides {
    /// Canvas x of the vertical guide line.
    pub vertical: Option<f64>,
    /// Canvas y of the horizontal guide line.
    pub horizontal: Option<f64>,
}

impl Guides {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub position: Point,
    pub guides: Guides,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEngine {
    pub settings: SnapSettings,
    pub grid_size: f64,
    pub threshold: f64,
}

impl SnapEngine {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            settings: SnapSettings {
                grid: config.grid_snap,
                neighbors: config.neighbor_snap,
            },
            grid_size: config.grid_size,
            threshold: config.snap_threshold,
        }
    }

    /// Adjust the candidate rectangle of card `moving` against the grid and
    /// the other cards of the document.
    pub fn snap(&self, moving: NodeId, candidate: Rect, nodes: &[Node]) -> SnapResult {
        let mut x = candidate.x0;
        let mut y = candidate.y0;
        let (w, h) = (candidate.width(), candidate.height());

        if self.settings.grid {
            x = snap_to_grid(x, self.grid_size);
            y = snap_to_grid(y, self.grid_size);
        }

        let mut guides = Guides::default();
        if self.settings.neighbors {
            let others = || nodes.iter().filter(|n| n.id != moving);
            if let Some((nx, line)) =
                align_axis(x, w, others().map(|n| (n.x, n.width)), self.threshold)
            {
                x = nx;
                guides.vertical = Some(line);
            }
            if let Some((ny, line)) =
                align_axis(y, h, others().map(|n| (n.y, n.height)), self.threshold)
            {
                y = ny;
                guides.horizontal = Some(line);
            }
        }

        SnapResult {
            position: Point::new(x, y),
            guides,
        }
    }
}

/// Start, centre, and end of a span along one axis.
fn lines(start: f64, len: f64) -> [f64; 3] {
    [start, start + len / 2.0, start + len]
}

/// Find the first target line within `threshold` of one of the moving
/// span's lines. Targets are visited in order; within a target its
/// start/centre/end lines are tried against the moving start/centre/end.
/// Returns the corrected span start and the matched line.
fn align_axis(
    start: f64,
    len: f64,
    targets: impl Iterator<Item = (f64, f64)>,
    threshold: f64,
) -> Option<(f64, f64)> {
    let moving = lines(start, len);
    for (t_start, t_len) in targets {
        for target in lines(t_start, t_len) {
            for (i, line) in moving.iter().enumerate() {
                if (line - target).abs() < threshold {
                    // Shift the span so this moving line lands on the target.
                    let offset = moving[i] - start;
                    return Some((target - offset, target));
                }
            }
        }
    }
    None
}
