//! Frame → Vello drawing commands.
//!
//! Paint order: blocks (fill, border, resize handle, anchor nodes), links,
//! the live preview, and the marquee on top.

use crate::frame::{AnchorItem, BlockItem, Frame, LinkItem};
use crate::links::LinkGeometry;
use kurbo::{Affine, BezPath, Circle, Line, Rect, Stroke};
use peniko::{Color, Fill};
use refmap_core::geometry;
use vello::Scene;

const BLOCK_RADIUS: f64 = 8.0;
const LINK_WIDTH: f64 = 2.0;
const LINK_IDLE_OPACITY: f32 = 0.3;

/// Paint a frame into a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`.
/// The caller presents the scene via wgpu.
pub fn paint_frame(scene: &mut Scene, frame: &Frame) {
    for block in &frame.blocks {
        paint_block(scene, block);
    }
    for link in &frame.links {
        paint_link(scene, link);
    }
    if let Some(preview) = &frame.preview {
        paint_preview(scene, preview);
    }
    if let Some(marquee) = frame.marquee {
        paint_marquee(scene, marquee);
    }
}

// ─── Blocks ──────────────────────────────────────────────────────────────────

fn paint_block(scene: &mut Scene, block: &BlockItem) {
    let shape = to_kurbo_rect(block.rect).to_rounded_rect(BLOCK_RADIUS);
    let base = block.color;
    let fill_alpha = if block.active { 0.22 } else { 0.12 };
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_color(base.with_opacity(fill_alpha)),
        None,
        &shape,
    );

    let border = if block.selected { 3.0 } else { 1.5 };
    scene.stroke(
        &Stroke::new(border),
        Affine::IDENTITY,
        to_color(base),
        None,
        &shape,
    );

    paint_handle(scene, block);

    log::trace!("block label {:?} at ({}, {})", block.name, block.rect.x, block.rect.y);
    // Text needs a font context; the browser bridge draws labels itself.

    for anchor in &block.anchors {
        paint_anchor(scene, anchor, base);
    }
}

fn paint_handle(scene: &mut Scene, block: &BlockItem) {
    let h = block.handle;
    let mut grip = BezPath::new();
    grip.move_to((h.right() as f64, h.y as f64));
    grip.line_to((h.right() as f64, h.bottom() as f64));
    grip.line_to((h.x as f64, h.bottom() as f64));
    grip.close_path();
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_color(block.color.with_opacity(0.5)),
        None,
        &grip,
    );
}

fn paint_anchor(scene: &mut Scene, anchor: &AnchorItem, accent: refmap_core::Color) {
    let circle = Circle::new(
        (anchor.center.x as f64, anchor.center.y as f64),
        anchor.radius as f64,
    );
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        Color::from_rgb8(255, 255, 255),
        None,
        &circle,
    );
    let width = if anchor.highlighted { 3.0 } else { 2.0 };
    scene.stroke(&Stroke::new(width), Affine::IDENTITY, to_color(accent), None, &circle);
}

// ─── Links ───────────────────────────────────────────────────────────────────

fn link_color(opacity: f32) -> Color {
    Color::from_rgba8(0x33, 0x33, 0x33, (255.0 * opacity) as u8)
}

fn paint_link(scene: &mut Scene, link: &LinkItem) {
    let opacity = if link.hovered { 1.0 } else { LINK_IDLE_OPACITY };
    paint_arrow(scene, &link.geometry, link_color(opacity), &Stroke::new(LINK_WIDTH));
}

fn paint_preview(scene: &mut Scene, preview: &LinkGeometry) {
    let accent = to_color(refmap_core::Color::DEFAULT_TOPIC);
    let stroke = Stroke::new(LINK_WIDTH).with_dashes(0.0, [6.0, 4.0]);
    paint_arrow(scene, preview, accent, &stroke);
}

fn paint_arrow(scene: &mut Scene, geometry: &LinkGeometry, color: Color, stroke: &Stroke) {
    if !geometry.is_degenerate() {
        let shaft = Line::new(to_kurbo_point(geometry.start), to_kurbo_point(geometry.end));
        scene.stroke(stroke, Affine::IDENTITY, color, None, &shaft);
    }
    let [tip, a, b] = geometry.arrowhead();
    let mut head = BezPath::new();
    head.move_to(to_kurbo_point(tip));
    head.line_to(to_kurbo_point(a));
    head.line_to(to_kurbo_point(b));
    head.close_path();
    scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &head);
}

// ─── Marquee ─────────────────────────────────────────────────────────────────

fn paint_marquee(scene: &mut Scene, rect: geometry::Rect) {
    let shape = to_kurbo_rect(rect);
    let c = refmap_core::Color::DEFAULT_TOPIC;
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_color(c.with_opacity(0.1)),
        None,
        &shape,
    );
    scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, to_color(c), None, &shape);
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn to_color(c: refmap_core::Color) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn to_kurbo_point(p: geometry::Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

fn to_kurbo_rect(r: geometry::Rect) -> Rect {
    Rect::new(
        r.x as f64,
        r.y as f64,
        r.right() as f64,
        r.bottom() as f64,
    )
}
