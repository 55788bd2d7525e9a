//! Canvas2D software renderer.
//!
//! Walks a `Frame` display list and draws to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Coordinates are canvas pixels; the host
//! scrolls the element, not the drawing.

use refmap_core::geometry::Rect;
use refmap_core::Color;
use refmap_render::LinkGeometry;
use refmap_render::frame::{AnchorItem, BlockItem, Frame, LinkItem};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const BLOCK_RADIUS: f64 = 8.0;
const LINK_WIDTH: f64 = 2.0;
const LINK_IDLE_ALPHA: f64 = 0.3;
const HEADER_FONT: &str = "600 14px Inter, system-ui, sans-serif";
const LABEL_FONT: &str = "11px Inter, system-ui, sans-serif";

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub block_bg: &'static str,
    pub block_text: &'static str,
    pub anchor_fill: &'static str,
    pub link: &'static str,
    pub selection: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            block_bg: "#FFFFFF",
            block_text: "#1D1D1F",
            anchor_fill: "#FFFFFF",
            link: "#333333",
            selection: "#4FC3F7",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            block_bg: "#2C2C2E",
            block_text: "#F5F5F7",
            anchor_fill: "#3A3A3C",
            link: "#D1D1D6",
            selection: "#4FC3F7",
        }
    }
}

/// Render a whole frame.
pub fn render_frame(ctx: &CanvasRenderingContext2d, frame: &Frame, theme: &CanvasTheme) {
    let (width, height) = (frame.canvas.width as f64, frame.canvas.height as f64);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, width, height);
    draw_grid(ctx, width, height, theme);

    for block in &frame.blocks {
        draw_block(ctx, block, theme);
    }
    for link in &frame.links {
        draw_link(ctx, link, theme);
    }
    if let Some(preview) = &frame.preview {
        draw_preview(ctx, preview, theme);
    }
    if let Some(marquee) = frame.marquee {
        draw_marquee_rect(ctx, marquee, theme);
    }
}

fn css(c: Color) -> String {
    format!("rgba({}, {}, {}, {:.3})", c.r, c.g, c.b, c.a as f32 / 255.0)
}

fn draw_grid(ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.grid);
    let spacing = 40.0;
    let mut x = 0.0;
    while x < width {
        let mut y = 0.0;
        while y < height {
            ctx.fill_rect(x - 1.0, y - 1.0, 2.0, 2.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Blocks ──────────────────────────────────────────────────────────────

fn draw_block(ctx: &CanvasRenderingContext2d, block: &BlockItem, theme: &CanvasTheme) {
    let r = block.rect;
    let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);

    ctx.save();
    if block.active {
        ctx.set_shadow_color("rgba(0, 0, 0, 0.18)");
        ctx.set_shadow_blur(12.0);
        ctx.set_shadow_offset_y(4.0);
    }
    rounded_rect_path(ctx, x, y, w, h, BLOCK_RADIUS);
    ctx.set_fill_style_str(theme.block_bg);
    ctx.fill();
    ctx.set_shadow_color("transparent");

    // Tinted header strip.
    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, BLOCK_RADIUS);
    ctx.clip();
    ctx.set_fill_style_str(&css(block.color.with_opacity(0.15)));
    ctx.fill_rect(x, y, w, 50.0);
    ctx.restore();

    ctx.set_stroke_style_str(&css(block.color));
    ctx.set_line_width(if block.selected { 3.0 } else { 1.5 });
    rounded_rect_path(ctx, x, y, w, h, BLOCK_RADIUS);
    ctx.stroke();

    if block.selected {
        ctx.set_stroke_style_str(theme.selection);
        ctx.set_line_width(2.0);
        rounded_rect_path(ctx, x - 3.0, y - 3.0, w + 6.0, h + 6.0, BLOCK_RADIUS + 3.0);
        ctx.stroke();
    }

    ctx.set_font(HEADER_FONT);
    ctx.set_fill_style_str(theme.block_text);
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text_with_max_width(&block.name, x + 14.0, y + 25.0, w - 28.0);

    draw_handle(ctx, block.handle, block.color);
    for anchor in &block.anchors {
        draw_anchor(ctx, anchor, block.color, theme);
    }
    ctx.restore();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, h: Rect, color: Color) {
    let (x, y, right, bottom) = (h.x as f64, h.y as f64, h.right() as f64, h.bottom() as f64);
    ctx.begin_path();
    ctx.move_to(right, y);
    ctx.line_to(right, bottom);
    ctx.line_to(x, bottom);
    ctx.close_path();
    ctx.set_fill_style_str(&css(color.with_opacity(0.5)));
    ctx.fill();
}

fn draw_anchor(ctx: &CanvasRenderingContext2d, anchor: &AnchorItem, color: Color, theme: &CanvasTheme) {
    let (cx, cy, r) = (anchor.center.x as f64, anchor.center.y as f64, anchor.radius as f64);
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, r, 0.0, std::f64::consts::TAU);
    if anchor.highlighted {
        ctx.set_fill_style_str(&css(color));
    } else {
        ctx.set_fill_style_str(theme.anchor_fill);
    }
    ctx.fill();
    ctx.set_stroke_style_str(&css(color));
    ctx.set_line_width(2.0);
    ctx.stroke();
}

// ─── Links ───────────────────────────────────────────────────────────────

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkItem, theme: &CanvasTheme) {
    ctx.save();
    ctx.set_global_alpha(if link.hovered { 1.0 } else { LINK_IDLE_ALPHA });
    stroke_shaft(ctx, &link.geometry, theme.link);
    draw_arrowhead(ctx, &link.geometry, theme.link);

    if link.hovered
        && let Some(label) = &link.label
    {
        let mid = link.geometry.midpoint();
        ctx.set_font(LABEL_FONT);
        ctx.set_fill_style_str(theme.link);
        ctx.set_text_align("center");
        ctx.set_text_baseline("bottom");
        let _ = ctx.fill_text(label, mid.x as f64, mid.y as f64 - 6.0);
    }
    ctx.restore();
}

fn draw_preview(ctx: &CanvasRenderingContext2d, preview: &LinkGeometry, theme: &CanvasTheme) {
    ctx.save();
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(6.0),
        &JsValue::from_f64(4.0),
    ));
    stroke_shaft(ctx, preview, theme.selection);
    let _ = ctx.set_line_dash(&js_sys::Array::new());
    draw_arrowhead(ctx, preview, theme.selection);
    ctx.restore();
}

/// The shaft is skipped when the nodes are too close for one.
fn stroke_shaft(ctx: &CanvasRenderingContext2d, g: &LinkGeometry, color: &str) {
    if g.is_degenerate() {
        return;
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(LINK_WIDTH);
    ctx.begin_path();
    ctx.move_to(g.start.x as f64, g.start.y as f64);
    ctx.line_to(g.end.x as f64, g.end.y as f64);
    ctx.stroke();
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, g: &LinkGeometry, color: &str) {
    let [tip, left, right] = g.arrowhead();
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.move_to(tip.x as f64, tip.y as f64);
    ctx.line_to(left.x as f64, left.y as f64);
    ctx.line_to(right.x as f64, right.y as f64);
    ctx.close_path();
    ctx.fill();
}

// ─── Overlays ────────────────────────────────────────────────────────────

fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, r: Rect, theme: &CanvasTheme) {
    let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    if w < 1.0 && h < 1.0 {
        return;
    }
    ctx.save();
    ctx.set_fill_style_str("rgba(79, 195, 247, 0.08)");
    ctx.fill_rect(x, y, w, h);
    ctx.set_stroke_style_str(theme.selection);
    ctx.set_line_width(1.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0),
        &JsValue::from_f64(4.0),
    ));
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    let _ = ctx.arc_to(x + w, y, x + w, y + r, r);
    ctx.line_to(x + w, y + h - r);
    let _ = ctx.arc_to(x + w, y + h, x + w - r, y + h, r);
    ctx.line_to(x + r, y + h);
    let _ = ctx.arc_to(x, y + h, x, y + h - r, r);
    ctx.line_to(x, y + r);
    let _ = ctx.arc_to(x, y, x + r, y, r);
    ctx.close_path();
}
