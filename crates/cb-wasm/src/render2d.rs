//! Canvas2D renderer.
//!
//! Draws the committed document plus the gesture overlay to an HTML
//! `<canvas>` via `CanvasRenderingContext2d`. Everything after the
//! background is drawn in canvas units under the viewport transform.

use cb_core::geometry::{anchor_rect, curve, side_normal};
use cb_core::id::NodeId;
use cb_core::model::{Document, Node, Side};
use cb_core::viewport::Viewport;
use cb_render::paint::Overlay;
use cb_render::palette::{css, palette};
use kurbo::{CubicBez, Rect};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub link: &'static str,
    pub accent: &'static str,
    pub guide: &'static str,
    pub text: &'static str,
    pub handle_fill: &'static str,
}

impl CanvasTheme {
    /// Light theme, warm white canvas.
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.08)",
            link: "#86868B",
            accent: "#228BE6",
            guide: "#FF3B8D",
            text: "#1D1D1F",
            handle_fill: "#FFFFFF",
        }
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.06)",
            link: "#8E8E93",
            accent: "#4DABF7",
            guide: "#FF6FA8",
            text: "#1D1D1F",
            handle_fill: "#2C2C2E",
        }
    }
}

const CORNER_RADIUS: f64 = 8.0;
const HEADER_HEIGHT: f64 = 12.0;
const TEXT_PADDING: f64 = 10.0;
const LINE_HEIGHT: f64 = 18.0;
const FONT: &str = "14px Inter, system-ui, sans-serif";

/// Render the document and gesture overlay.
#[allow(clippy::too_many_arguments)]
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    doc: &Document,
    overlay: &Overlay,
    viewport: &Viewport,
    canvas_width: f64,
    canvas_height: f64,
    grid_size: f64,
    curve_offset: f64,
    handle_radius: f64,
    editing: Option<NodeId>,
    theme: &CanvasTheme,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    draw_grid(ctx, viewport, canvas_width, canvas_height, grid_size, theme);

    ctx.save();
    let _ = ctx.set_transform(viewport.scale, 0.0, 0.0, viewport.scale, viewport.x, viewport.y);
    let px = 1.0 / viewport.scale;

    // Links beneath cards; dangling ones are skipped.
    for edge in &doc.edges {
        let (Some(from), Some(to)) = (doc.node(edge.from_node), doc.node(edge.to_node)) else {
            continue;
        };
        let c = curve(
            anchor_rect(overlay.bounds_of(from), edge.from_side),
            edge.from_side,
            anchor_rect(overlay.bounds_of(to), edge.to_side),
            Some(edge.to_side),
            curve_offset,
        );
        let selected = overlay.selection.edge() == Some(edge.id);
        let (color, width) = if selected {
            (theme.accent, 3.0 * px)
        } else {
            (theme.link, 2.0 * px)
        };
        draw_curve(ctx, &c, color, width);
        draw_arrowhead(ctx, &c, edge.to_side, color, 10.0 * px);
    }

    let reach = handle_radius * px;
    for node in &doc.nodes {
        let bounds = overlay.bounds_of(node);
        let selected = overlay.selection.node() == Some(node.id);
        draw_card(ctx, node, bounds, selected, editing == Some(node.id), px, theme);
        if overlay.shows_connectors(node, reach) {
            draw_connectors(ctx, bounds, reach * 0.75, px, theme);
        }
        if selected && overlay.provisional.is_none() {
            draw_resize_handle(ctx, bounds, reach * 0.75, px, theme);
        }
    }

    if let Some(p) = overlay.provisional
        && let Some(from) = doc.node(p.from)
    {
        let c = curve(
            anchor_rect(overlay.bounds_of(from), p.from_side),
            p.from_side,
            p.to,
            None,
            curve_offset,
        );
        ctx.save();
        let _ = ctx.set_line_dash(&js_sys::Array::of2(
            &JsValue::from_f64(6.0 * px),
            &JsValue::from_f64(4.0 * px),
        ));
        draw_curve(ctx, &c, theme.accent, 2.0 * px);
        ctx.restore();
    }

    // Guides span the visible area.
    let top_left = viewport.to_canvas((0.0, 0.0).into());
    let bottom_right = viewport.to_canvas((canvas_width, canvas_height).into());
    ctx.set_stroke_style_str(theme.guide);
    ctx.set_line_width(px);
    if let Some(x) = overlay.guides.vertical {
        ctx.begin_path();
        ctx.move_to(x, top_left.y);
        ctx.line_to(x, bottom_right.y);
        ctx.stroke();
    }
    if let Some(y) = overlay.guides.horizontal {
        ctx.begin_path();
        ctx.move_to(top_left.x, y);
        ctx.line_to(bottom_right.x, y);
        ctx.stroke();
    }

    ctx.restore();
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn draw_card(
    ctx: &CanvasRenderingContext2d,
    node: &Node,
    b: Rect,
    selected: bool,
    editing: bool,
    px: f64,
    theme: &CanvasTheme,
) {
    let colors = palette(node.color);
    let (x, y, w, h) = (b.x0, b.y0, b.width(), b.height());

    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, CORNER_RADIUS);
    ctx.set_fill_style_str(&css(colors.fill));
    ctx.fill();
    ctx.clip();

    ctx.set_fill_style_str(&css(colors.header));
    ctx.fill_rect(x, y, w, HEADER_HEIGHT);

    // The host overlays its own editor while the card is being edited.
    if !editing && !node.text.is_empty() {
        ctx.set_font(FONT);
        ctx.set_fill_style_str(theme.text);
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        let max_width = w - 2.0 * TEXT_PADDING;
        let mut ty = y + HEADER_HEIGHT + TEXT_PADDING / 2.0;
        for line in wrap_lines(ctx, &node.text, max_width) {
            if ty > y + h {
                break;
            }
            let _ = ctx.fill_text(&line, x + TEXT_PADDING, ty);
            ty += LINE_HEIGHT;
        }
    }
    ctx.restore();

    rounded_rect_path(ctx, x, y, w, h, CORNER_RADIUS);
    if selected {
        ctx.set_stroke_style_str(theme.accent);
        ctx.set_line_width(2.0 * px);
    } else {
        ctx.set_stroke_style_str(&css(colors.border));
        ctx.set_line_width(px);
    }
    ctx.stroke();
}

/// Connection dots on each side.
fn draw_connectors(ctx: &CanvasRenderingContext2d, b: Rect, r: f64, px: f64, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.handle_fill);
    ctx.set_stroke_style_str(theme.accent);
    ctx.set_line_width(1.5 * px);
    for side in Side::ALL {
        let p = anchor_rect(b, side);
        ctx.begin_path();
        let _ = ctx.arc(p.x, p.y, r, 0.0, std::f64::consts::TAU);
        ctx.fill();
        ctx.stroke();
    }
}

fn draw_resize_handle(
    ctx: &CanvasRenderingContext2d,
    b: Rect,
    half: f64,
    px: f64,
    theme: &CanvasTheme,
) {
    ctx.set_fill_style_str(theme.handle_fill);
    ctx.set_stroke_style_str(theme.accent);
    ctx.set_line_width(1.5 * px);
    ctx.fill_rect(b.x1 - half, b.y1 - half, 2.0 * half, 2.0 * half);
    ctx.stroke_rect(b.x1 - half, b.y1 - half, 2.0 * half, 2.0 * half);
}

fn draw_curve(ctx: &CanvasRenderingContext2d, c: &CubicBez, color: &str, width: f64) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.move_to(c.p0.x, c.p0.y);
    ctx.bezier_curve_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y);
    ctx.stroke();
}

/// Arrowhead at the curve end, pointing into `to_side`.
fn draw_arrowhead(
    ctx: &CanvasRenderingContext2d,
    c: &CubicBez,
    to_side: Side,
    color: &str,
    size: f64,
) {
    let tip = c.p3;
    let dir = -side_normal(to_side);
    let back = tip - dir * size;
    let perp = dir.turn_90() * (size / 2.0);

    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to((back + perp).x, (back + perp).y);
    ctx.line_to((back - perp).x, (back - perp).y);
    ctx.close_path();
    ctx.fill();
}

/// Dot grid in screen space, aligned with the canvas grid.
fn draw_grid(
    ctx: &CanvasRenderingContext2d,
    viewport: &Viewport,
    width: f64,
    height: f64,
    grid_size: f64,
    theme: &CanvasTheme,
) {
    let spacing = grid_size * viewport.scale;
    if spacing < 6.0 {
        return;
    }
    ctx.set_fill_style_str(theme.grid);
    let mut x = viewport.x.rem_euclid(spacing);
    while x < width {
        let mut y = viewport.y.rem_euclid(spacing);
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

/// Greedy word wrap using the context's current font.
fn wrap_lines(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> Vec<String> {
    let width_of = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && width_of(&candidate) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}
