//! Floating panel placement.
//!
//! One algorithm serves reference tooltips, link tooltips and context menus:
//! put the panel on the preferred side of an anchor, flip to the opposite
//! side if it does not fit, then slide (never flip) along the cross axis to
//! stay inside the viewport margins. A final clamp of both axes makes the
//! result contained whenever the panel is no larger than the viewport minus
//! twice the margin.
//!
//! Panels that have not been measured yet are placed with an estimated size;
//! [`FloatingPanel::measure`] re-runs placement once the real size is known.

use crate::config::TooltipConfig;
use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Side of the anchor the panel should appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Above => Side::Below,
            Side::Below => Side::Above,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Side::Above | Side::Below)
    }
}

/// Clamp into `[lo, hi]`; `lo` wins when the range is empty.
fn clamp_span(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TooltipPlacer {
    pub config: TooltipConfig,
}

impl TooltipPlacer {
    pub fn new(config: TooltipConfig) -> Self {
        Self { config }
    }

    /// `size` if usable, the configured estimate otherwise.
    pub fn effective_size(&self, size: Option<Size>) -> Size {
        match size {
            Some(s) if !s.is_degenerate() => s,
            _ => self.config.estimated_size,
        }
    }

    fn fits(&self, pos: Point, size: Size, viewport: Rect) -> bool {
        let m = self.config.margin;
        pos.x >= viewport.x + m
            && pos.y >= viewport.y + m
            && pos.x + size.width <= viewport.right() - m
            && pos.y + size.height <= viewport.bottom() - m
    }

    /// Clamp both axes into the viewport margins.
    pub fn contain(&self, pos: Point, size: Size, viewport: Rect) -> Point {
        let m = self.config.margin;
        Point::new(
            clamp_span(pos.x, viewport.x + m, viewport.right() - m - size.width),
            clamp_span(pos.y, viewport.y + m, viewport.bottom() - m - size.height),
        )
    }

    fn on_side(anchor: Rect, size: Size, side: Side, gap: f32) -> Point {
        let c = anchor.center();
        match side {
            Side::Below => Point::new(c.x - size.width / 2.0, anchor.bottom() + gap),
            Side::Above => Point::new(c.x - size.width / 2.0, anchor.y - gap - size.height),
            Side::Right => Point::new(anchor.right() + gap, c.y - size.height / 2.0),
            Side::Left => Point::new(anchor.x - gap - size.width, c.y - size.height / 2.0),
        }
    }

    /// Place a panel next to `anchor`, preferring `prefer`.
    pub fn place(
        &self,
        anchor: Rect,
        size: Size,
        viewport: Rect,
        prefer: Side,
        gap: f32,
    ) -> Point {
        let m = self.config.margin;
        let room = |side: Side| match side {
            Side::Below => viewport.bottom() - m - anchor.bottom() - gap,
            Side::Above => anchor.y - gap - viewport.y - m,
            Side::Right => viewport.right() - m - anchor.right() - gap,
            Side::Left => anchor.x - gap - viewport.x - m,
        };
        let need = if prefer.is_vertical() {
            size.height
        } else {
            size.width
        };

        let side = if room(prefer) >= need || room(prefer) >= room(prefer.opposite()) {
            prefer
        } else {
            prefer.opposite()
        };
        self.contain(Self::on_side(anchor, size, side, gap), size, viewport)
    }

    /// Detail panel for a reference node, below the node when it fits.
    pub fn place_reference_tooltip(
        &self,
        node_center: Point,
        node_radius: f32,
        size: Option<Size>,
        viewport: Rect,
    ) -> Point {
        let anchor = Rect::new(
            node_center.x - node_radius,
            node_center.y - node_radius,
            node_radius * 2.0,
            node_radius * 2.0,
        );
        let size = self.effective_size(size);
        self.place(anchor, size, viewport, Side::Below, self.config.anchor_gap)
    }

    /// Panel for a hovered link, offset perpendicular to the link at the
    /// cursor. The left-hand side of the link direction is preferred.
    pub fn place_connection_tooltip(
        &self,
        cursor: Point,
        from: Point,
        to: Point,
        size: Option<Size>,
        viewport: Rect,
    ) -> Point {
        let size = self.effective_size(size);
        let (dx, dy) = to.delta_from(from);
        let len = dx.hypot(dy);
        let (px, py) = if len > f32::EPSILON {
            (-dy / len, dx / len)
        } else {
            (0.0, 1.0)
        };
        let offset = self.config.link_offset;

        let mut pos = cursor.offset(px * offset, py * offset);
        if !self.fits(pos, size, viewport) {
            pos = cursor.offset(-px * offset, -py * offset);
        }
        self.contain(pos, size, viewport)
    }

    /// Context menu at the cursor: opens downward, flips up if the bottom
    /// edge is too close, slides horizontally.
    pub fn place_context_menu(&self, cursor: Point, size: Option<Size>, viewport: Rect) -> Point {
        let size = self.effective_size(size);
        let m = self.config.margin;
        let y = if cursor.y + size.height <= viewport.bottom() - m {
            cursor.y
        } else {
            cursor.y - size.height
        };
        let x = clamp_span(cursor.x, viewport.x + m, viewport.right() - m - size.width);
        self.contain(Point::new(x, y), size, viewport)
    }
}

/// What a floating panel is anchored to; enough to re-run placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelAnchor {
    Reference { center: Point, radius: f32 },
    Link { cursor: Point, from: Point, to: Point },
    Cursor { at: Point },
}

/// A placed panel that remembers its anchor so it can be re-placed when
/// measured or when the viewport changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatingPanel {
    pub anchor: PanelAnchor,
    /// `None` until the host reports a real size.
    pub measured: Option<Size>,
    pub position: Point,
}

impl FloatingPanel {
    pub fn open(placer: &TooltipPlacer, anchor: PanelAnchor, viewport: Rect) -> Self {
        let mut panel = Self {
            anchor,
            measured: None,
            position: Point::ZERO,
        };
        panel.reposition(placer, viewport);
        panel
    }

    /// Size used for the current placement.
    pub fn size(&self, placer: &TooltipPlacer) -> Size {
        placer.effective_size(self.measured)
    }

    pub fn rect(&self, placer: &TooltipPlacer) -> Rect {
        Rect::from_origin_size(self.position, self.size(placer))
    }

    /// Record the real size and re-place. Returns whether the position moved.
    pub fn measure(&mut self, placer: &TooltipPlacer, size: Size, viewport: Rect) -> bool {
        if size.is_degenerate() {
            return false;
        }
        self.measured = Some(size);
        let before = self.position;
        self.reposition(placer, viewport);
        before != self.position
    }

    pub fn reposition(&mut self, placer: &TooltipPlacer, viewport: Rect) {
        self.position = match self.anchor {
            PanelAnchor::Reference { center, radius } => {
                placer.place_reference_tooltip(center, radius, self.measured, viewport)
            }
            PanelAnchor::Link { cursor, from, to } => {
                placer.place_connection_tooltip(cursor, from, to, self.measured, viewport)
            }
            PanelAnchor::Cursor { at } => placer.place_context_menu(at, self.measured, viewport),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1024.0, 768.0)
    }

    #[test]
    fn reference_tooltip_prefers_below() {
        let placer = TooltipPlacer::default();
        let pos = placer.place_reference_tooltip(
            Point::new(500.0, 200.0),
            15.0,
            Some(Size::new(200.0, 100.0)),
            viewport(),
        );
        assert_eq!(pos, Point::new(400.0, 223.0));
    }

    #[test]
    fn reference_tooltip_flips_above_near_bottom() {
        let placer = TooltipPlacer::default();
        let pos = placer.place_reference_tooltip(
            Point::new(500.0, 700.0),
            15.0,
            Some(Size::new(200.0, 100.0)),
            viewport(),
        );
        assert_eq!(pos, Point::new(400.0, 577.0));
    }

    #[test]
    fn reference_tooltip_slides_off_left_edge() {
        let placer = TooltipPlacer::default();
        let pos = placer.place_reference_tooltip(
            Point::new(10.0, 200.0),
            15.0,
            Some(Size::new(200.0, 100.0)),
            viewport(),
        );
        assert_eq!(pos.x, 20.0);
    }

    #[test]
    fn link_tooltip_uses_left_perpendicular() {
        let placer = TooltipPlacer::default();
        // Link pointing right: left-hand perpendicular is (0, 1), i.e. down.
        let pos = placer.place_connection_tooltip(
            Point::new(300.0, 300.0),
            Point::new(100.0, 300.0),
            Point::new(600.0, 300.0),
            None,
            viewport(),
        );
        assert_eq!(pos, Point::new(300.0, 315.0));
    }

    #[test]
    fn link_tooltip_flips_to_other_side() {
        let placer = TooltipPlacer::default();
        let pos = placer.place_connection_tooltip(
            Point::new(300.0, 700.0),
            Point::new(100.0, 700.0),
            Point::new(600.0, 700.0),
            Some(Size::new(300.0, 100.0)),
            viewport(),
        );
        // The flipped spot is still too low, so the final clamp applies.
        assert_eq!(pos, Point::new(300.0, 648.0));
    }

    #[test]
    fn zero_length_link_does_not_panic() {
        let placer = TooltipPlacer::default();
        let p = Point::new(50.0, 50.0);
        let pos = placer.place_connection_tooltip(p, p, p, None, viewport());
        assert_eq!(pos, Point::new(50.0, 65.0));
    }

    #[test]
    fn context_menu_flips_up_and_slides_left() {
        let placer = TooltipPlacer::default();
        let size = Size::new(180.0, 120.0);
        let pos = placer.place_context_menu(Point::new(1000.0, 700.0), Some(size), viewport());
        assert_eq!(pos, Point::new(824.0, 580.0));
    }

    #[test]
    fn measuring_replaces_estimate() {
        let placer = TooltipPlacer::default();
        let anchor = PanelAnchor::Cursor {
            at: Point::new(900.0, 100.0),
        };
        let mut panel = FloatingPanel::open(&placer, anchor, viewport());
        // Estimated 300 wide: slid to 1024 - 20 - 300.
        assert_eq!(panel.position, Point::new(704.0, 100.0));
        assert!(panel.measure(&placer, Size::new(100.0, 40.0), viewport()));
        assert_eq!(panel.position, Point::new(900.0, 100.0));
        assert!(!panel.measure(&placer, Size::new(0.0, 0.0), viewport()));
    }
}
