//! Geometry utilities: points, rectangles, circle-edge and arrowhead offsets,
//! grid snapping.
//!
//! Everything here is a pure function over canvas pixels (`f32`, y grows
//! downward).

use serde::{Deserialize, Serialize};

/// A point on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Component-wise `self - other`.
    pub fn delta_from(self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A size that cannot be used for layout (first-frame measurement).
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Normalized rectangle spanning two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    /// Zero-size rectangle at a point (cursor anchors).
    pub fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow on every side by `d` (negative shrinks).
    pub fn inflate(&self, d: f32) -> Self {
        Self::new(
            self.x - d,
            self.y - d,
            self.width + 2.0 * d,
            self.height + 2.0 * d,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        rects_overlap(self, other)
    }
}

/// Point on a circle of `radius` around `center`, along `angle` (radians).
///
/// Link strokes start and stop here so they meet a node's visual boundary
/// instead of its center.
pub fn circle_edge_point(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(
        center.x + angle.cos() * radius,
        center.y + angle.sin() * radius,
    )
}

/// End of a link stroke arriving at `target_center` along `angle`.
///
/// Pulled back by `circle_radius + arrowhead_length` so the arrowhead drawn
/// from this point ends with its tip on the node's rim.
pub fn arrow_adjusted_endpoint(
    target_center: Point,
    angle: f32,
    circle_radius: f32,
    arrowhead_length: f32,
) -> Point {
    let back = circle_radius + arrowhead_length;
    Point::new(
        target_center.x - angle.cos() * back,
        target_center.y - angle.sin() * back,
    )
}

/// Direction from `from` to `to`, radians. Identical points give `0.0`.
pub fn angle_between(from: Point, to: Point) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = b.delta_from(a);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}

/// Strict intersection test. Rectangles that only share an edge do not
/// overlap, so grid-adjacent blocks may touch.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    !(a.right() <= b.x || a.x >= b.right() || a.bottom() <= b.y || a.y >= b.bottom())
}

/// `round(value / cell) * cell`.
pub fn snap_to_grid(value: f32, cell: f32) -> f32 {
    (value / cell).round() * cell
}

/// Whole cells needed to cover `pixels`.
pub fn cells_to_cover(pixels: f32, cell: f32) -> u32 {
    (pixels / cell).ceil().max(0.0) as u32
}
