//! Pan/zoom transform between screen pixels and canvas units.
//!
//! A canvas point `c` is drawn at element-relative screen position
//! `c * scale + (x, y)`. The element itself sits at `origin` in client
//! (page) coordinates, which is where pointer events are reported.

use crate::config::CanvasConfig;
use kurbo::{Point, Size, Vec2};

/// The ephemeral view transform. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Element-relative screen point → canvas point.
    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }

    /// Canvas point → element-relative screen point.
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }
}

/// Zoom step factors and scale clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl ZoomLimits {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
        }
    }

    /// Next scale for one zoom step: in when `direction > 0`, out otherwise.
    pub fn step(&self, scale: f64, direction: f64) -> f64 {
        let factor = if direction > 0.0 {
            self.zoom_in_factor
        } else {
            self.zoom_out_factor
        };
        (scale * factor).clamp(self.min_scale, self.max_scale)
    }
}

/// Owns the viewport plus the element placement needed to interpret
/// client-space pointer coordinates.
#[derive(Debug, Clone)]
pub struct ViewportController {
    pub viewport: Viewport,
    /// Client-space top-left of the canvas element.
    origin: Point,
    /// Element size in screen pixels, used for keyboard zoom around the centre.
    size: Size,
    limits: ZoomLimits,
}

impl ViewportController {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            viewport: Viewport::default(),
            origin: Point::ZERO,
            size: Size::ZERO,
            limits,
        }
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    /// Client point → element-relative point.
    pub fn to_element(&self, sx: f64, sy: f64) -> Point {
        Point::new(sx - self.origin.x, sy - self.origin.y)
    }

    /// `cx = (sx - originX - x) / scale`, likewise for y.
    pub fn screen_to_canvas(&self, sx: f64, sy: f64) -> Point {
        self.viewport.to_canvas(self.to_element(sx, sy))
    }

    /// Canvas point → client point.
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        self.viewport.to_screen(p) + self.origin.to_vec2()
    }

    /// Pure translation by a raw screen delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.x += dx;
        self.viewport.y += dy;
    }

    /// Zoom one step toward the client point `(sx, sy)`.
    ///
    /// The canvas point under the cursor before the call is under the cursor
    /// after it. Returns `false` when the scale was already at its limit.
    pub fn zoom_at(&mut self, sx: f64, sy: f64, direction: f64) -> bool {
        let p = self.to_element(sx, sy);
        self.zoom_around(p, direction)
    }

    /// Zoom one step around the element centre (keyboard zoom).
    pub fn zoom_step(&mut self, direction: f64) -> bool {
        let centre = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.zoom_around(centre, direction)
    }

    fn zoom_around(&mut self, p: Point, direction: f64) -> bool {
        let Viewport { x, y, scale } = self.viewport;
        let next = self.limits.step(scale, direction);
        if next == scale {
            return false;
        }
        let ratio = next / scale;
        self.viewport = Viewport {
            x: p.x - (p.x - x) * ratio,
            y: p.y - (p.y - y) * ratio,
            scale: next,
        };
        log::trace!("zoom {scale:.3} → {next:.3} at ({:.1}, {:.1})", p.x, p.y);
        true
    }

    pub fn reset(&mut self) {
        self.viewport = Viewport::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn controller() -> ViewportController {
        ViewportController::new(ZoomLimits::default())
    }

    #[test]
    fn screen_to_canvas_accounts_for_origin_offset_and_scale() {
        let mut vc = controller();
        vc.set_origin(Point::new(100.0, 50.0));
        vc.viewport = Viewport {
            x: 20.0,
            y: 10.0,
            scale: 2.0,
        };
        let c = vc.screen_to_canvas(220.0, 160.0);
        assert!((c.x - 50.0).abs() < EPS);
        assert!((c.y - 50.0).abs() < EPS);
        let back = vc.canvas_to_screen(c);
        assert!((back.x - 220.0).abs() < EPS && (back.y - 160.0).abs() < EPS);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let mut vc = controller();
        vc.set_origin(Point::new(30.0, 40.0));
        vc.viewport = Viewport {
            x: -75.0,
            y: 12.5,
            scale: 1.3,
        };
        let (sx, sy) = (412.0, 233.0);
        let before = vc.screen_to_canvas(sx, sy);
        for direction in [1.0, 1.0, -1.0, 1.0, -1.0, -1.0, -1.0] {
            vc.zoom_at(sx, sy, direction);
            let after = vc.screen_to_canvas(sx, sy);
            assert!((after.x - before.x).abs() < 1e-9, "x drifted: {after:?}");
            assert!((after.y - before.y).abs() < 1e-9, "y drifted: {after:?}");
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vc = controller();
        for _ in 0..100 {
            vc.zoom_at(0.0, 0.0, 1.0);
        }
        assert_eq!(vc.scale(), 3.0);
        assert!(!vc.zoom_at(0.0, 0.0, 1.0));
        for _ in 0..100 {
            vc.zoom_at(0.0, 0.0, -1.0);
        }
        assert!((vc.scale() - 0.2).abs() < EPS);
    }

    #[test]
    fn zoom_factors() {
        let mut vc = controller();
        vc.zoom_at(0.0, 0.0, 1.0);
        assert!((vc.scale() - 1.1).abs() < EPS);
        vc.reset();
        vc.zoom_at(0.0, 0.0, -1.0);
        assert!((vc.scale() - 0.9).abs() < EPS);
    }

    #[test]
    fn pan_is_pure_translation() {
        let mut vc = controller();
        vc.viewport.scale = 2.5;
        vc.pan_by(15.0, -4.0);
        assert_eq!(
            vc.viewport,
            Viewport {
                x: 15.0,
                y: -4.0,
                scale: 2.5
            }
        );
    }

    #[test]
    fn keyboard_zoom_pivots_on_centre() {
        let mut vc = controller();
        vc.set_size(Size::new(800.0, 600.0));
        let centre = vc.viewport.to_canvas(Point::new(400.0, 300.0));
        vc.zoom_step(1.0);
        let after = vc.viewport.to_canvas(Point::new(400.0, 300.0));
        assert!((after - centre).hypot() < EPS);
    }
}
