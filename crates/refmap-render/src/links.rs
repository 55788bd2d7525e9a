//! Link endpoint geometry.
//!
//! A link is a straight shaft from the source node's rim to a point pulled
//! back from the target's rim by the arrowhead length, plus a triangular head
//! whose tip touches the target rim.

use refmap_core::LinkStyle;
use refmap_core::geometry::{
    Point, angle_between, arrow_adjusted_endpoint, circle_edge_point, distance,
    point_segment_distance,
};
use serde::Serialize;

/// Half the width of the arrowhead base.
pub const ARROWHEAD_HALF_WIDTH: f32 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkGeometry {
    /// Shaft start, on the source rim.
    pub start: Point,
    /// Shaft end, where the arrowhead base sits.
    pub end: Point,
    /// Arrowhead tip.
    pub tip: Point,
    /// Direction of travel, radians.
    pub angle: f32,
}

impl LinkGeometry {
    /// Link between two node centers.
    pub fn between(from: Point, to: Point, style: &LinkStyle) -> Self {
        let angle = angle_between(from, to);
        Self {
            start: circle_edge_point(from, style.circle_radius, angle),
            end: arrow_adjusted_endpoint(to, angle, style.circle_radius, style.arrowhead_length),
            tip: arrow_adjusted_endpoint(to, angle, style.circle_radius, 0.0),
            angle,
        }
    }

    /// Preview that follows a free pointer: the tip sits on the pointer.
    pub fn to_pointer(from: Point, pointer: Point, style: &LinkStyle) -> Self {
        let angle = angle_between(from, pointer);
        Self {
            start: circle_edge_point(from, style.circle_radius, angle),
            end: arrow_adjusted_endpoint(pointer, angle, 0.0, style.arrowhead_length),
            tip: pointer,
            angle,
        }
    }

    /// Nodes so close that the shaft runs backwards (or the centers
    /// coincide). Such links are drawn as a bare head, if at all.
    pub fn is_degenerate(&self) -> bool {
        let forward = (self.end.x - self.start.x) * self.angle.cos()
            + (self.end.y - self.start.y) * self.angle.sin();
        forward <= 0.0
    }

    pub fn length(&self) -> f32 {
        distance(self.start, self.tip)
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.tip.x) / 2.0,
            (self.start.y + self.tip.y) / 2.0,
        )
    }

    /// Tip and the two base corners of the arrowhead.
    pub fn arrowhead(&self) -> [Point; 3] {
        let (px, py) = (-self.angle.sin(), self.angle.cos());
        [
            self.tip,
            self.end
                .offset(px * ARROWHEAD_HALF_WIDTH, py * ARROWHEAD_HALF_WIDTH),
            self.end
                .offset(-px * ARROWHEAD_HALF_WIDTH, -py * ARROWHEAD_HALF_WIDTH),
        ]
    }

    /// Distance from `p` to the visible stroke (shaft and head).
    pub fn distance_to(&self, p: Point) -> f32 {
        point_segment_distance(p, self.start, self.tip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn horizontal_link_endpoints() {
        let style = LinkStyle::default();
        let g = LinkGeometry::between(Point::new(100.0, 100.0), Point::new(300.0, 100.0), &style);
        assert!(close(g.start, Point::new(115.0, 100.0)));
        assert!(close(g.end, Point::new(264.0, 100.0)));
        assert!(close(g.tip, Point::new(285.0, 100.0)));
        assert!(!g.is_degenerate());
        let [tip, a, b] = g.arrowhead();
        assert!(close(tip, g.tip));
        assert!(close(a, Point::new(264.0, 104.5)));
        assert!(close(b, Point::new(264.0, 95.5)));
    }

    #[test]
    fn coincident_nodes_are_degenerate() {
        let style = LinkStyle::default();
        let p = Point::new(50.0, 50.0);
        let g = LinkGeometry::between(p, p, &style);
        assert_eq!(g.angle, 0.0);
        assert!(g.is_degenerate());
        assert!(g.start.x.is_finite() && g.end.x.is_finite());
    }

    #[test]
    fn pointer_preview_tip_on_pointer() {
        let style = LinkStyle::default();
        let g = LinkGeometry::to_pointer(Point::new(0.0, 0.0), Point::new(0.0, 200.0), &style);
        assert!(close(g.start, Point::new(0.0, 15.0)));
        assert!(close(g.end, Point::new(0.0, 179.0)));
        assert!(close(g.tip, Point::new(0.0, 200.0)));
    }

    #[test]
    fn hover_distance_measures_to_shaft() {
        let style = LinkStyle::default();
        let g = LinkGeometry::between(Point::new(0.0, 0.0), Point::new(400.0, 0.0), &style);
        assert!((g.distance_to(Point::new(200.0, 8.0)) - 8.0).abs() < 1e-4);
        assert!(g.distance_to(Point::new(200.0, 30.0)) > style.hover_tolerance);
    }
}
