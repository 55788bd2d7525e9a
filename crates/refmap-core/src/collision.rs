//! Collision resolution for a moving block.
//!
//! Single pass: every static block that overlaps the candidate pushes it out
//! along the shortest of the four directions that still clears the block
//! once the result is clamped onto the canvas. Two blocks always end apart,
//! also against the margins. With three or more crowding the same spot a
//! later push can re-create an earlier overlap; the caller gets a
//! best-effort origin in that case.

use crate::geometry::{Point, Rect, rects_overlap};
use crate::layout::CanvasBounds;

/// Exits left, right, up and down, in tie-break order.
fn exits(moving: &Rect, fixed: &Rect) -> [(f32, f32); 4] {
    [
        (fixed.x - moving.right(), 0.0),
        (fixed.right() - moving.x, 0.0),
        (0.0, fixed.y - moving.bottom()),
        (0.0, fixed.bottom() - moving.y),
    ]
}

fn magnitude((dx, dy): (f32, f32)) -> f32 {
    dx.abs() + dy.abs()
}

/// Smallest translation that separates `moving` from `fixed`.
///
/// Candidates are tried in the order left, right, up, down; ties go to the
/// earlier one. Returns `(0, 0)` when the two do not overlap.
pub fn minimal_push(moving: &Rect, fixed: &Rect) -> (f32, f32) {
    if !rects_overlap(moving, fixed) {
        return (0.0, 0.0);
    }
    exits(moving, fixed)
        .into_iter()
        .fold(None, |best: Option<(f32, f32)>, c| match best {
            Some(b) if magnitude(b) <= magnitude(c) => Some(b),
            _ => Some(c),
        })
        .unwrap_or((0.0, 0.0))
}

/// Like [`minimal_push`], but scores each exit after clamping onto the
/// canvas and skips those the clamp pulls back into `fixed`. The returned
/// translation lands on the clamped origin. Falls back to the unconstrained
/// push when no exit survives the clamp.
pub fn push_within(moving: &Rect, fixed: &Rect, canvas: &CanvasBounds, cell: f32) -> (f32, f32) {
    if !rects_overlap(moving, fixed) {
        return (0.0, 0.0);
    }
    let mut exits = exits(moving, fixed);
    // Stable: equal magnitudes keep the left, right, up, down order.
    exits.sort_by(|a, b| magnitude(*a).total_cmp(&magnitude(*b)));
    exits
        .into_iter()
        .find_map(|(dx, dy)| {
            let pushed = moving.translate(dx, dy);
            let origin = canvas.clamp_origin(pushed.origin(), pushed.size(), cell);
            let landed = pushed.with_origin(origin);
            (!rects_overlap(&landed, fixed)).then(|| (origin.x - moving.x, origin.y - moving.y))
        })
        .unwrap_or_else(|| {
            log::debug!("no exit clears {fixed:?} inside the canvas");
            minimal_push(moving, fixed)
        })
}

/// Push `candidate` clear of each overlapping rect in `statics`, then clamp.
/// Returns the resolved origin.
pub fn resolve_collisions<'a>(
    candidate: Rect,
    statics: impl IntoIterator<Item = &'a Rect>,
    canvas: &CanvasBounds,
    cell: f32,
) -> Point {
    let mut rect = candidate;
    for fixed in statics {
        let (dx, dy) = push_within(&rect, fixed, canvas, cell);
        if dx != 0.0 || dy != 0.0 {
            log::trace!("collision push ({dx}, {dy})");
            rect = rect.translate(dx, dy);
        }
    }
    canvas.clamp_origin(rect.origin(), rect.size(), cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CELL: f32 = 40.0;

    #[test]
    fn push_picks_shortest_exit() {
        let fixed = Rect::new(200.0, 200.0, 200.0, 120.0);
        // Overlaps the left 40 px of the fixed block: leaving left is shortest.
        let moving = Rect::new(40.0, 200.0, 200.0, 120.0);
        assert_eq!(minimal_push(&moving, &fixed), (-40.0, 0.0));
        // Mostly below: leaving downward wins.
        let moving = Rect::new(200.0, 280.0, 200.0, 120.0);
        assert_eq!(minimal_push(&moving, &fixed), (0.0, 40.0));
    }

    #[test]
    fn non_overlapping_is_untouched() {
        let a = Rect::new(0.0, 0.0, 200.0, 120.0);
        let b = Rect::new(200.0, 0.0, 200.0, 120.0);
        assert_eq!(minimal_push(&a, &b), (0.0, 0.0));
    }

    #[test]
    fn two_blocks_end_apart() {
        let canvas = CanvasBounds::default();
        let fixed = Rect::new(400.0, 400.0, 200.0, 120.0);
        let candidate = Rect::new(480.0, 440.0, 200.0, 120.0);
        let origin = resolve_collisions(candidate, [&fixed], &canvas, CELL);
        let resolved = candidate.with_origin(origin);
        assert!(!rects_overlap(&resolved, &fixed));
        assert_eq!(origin, Point::new(480.0, 520.0));
    }

    #[test]
    fn push_past_edge_is_clamped() {
        let canvas = CanvasBounds {
            width: 800.0,
            height: 600.0,
            margin: 40.0,
        };
        let fixed = Rect::new(40.0, 40.0, 200.0, 120.0);
        let candidate = Rect::new(40.0, 80.0, 200.0, 120.0);
        let origin = resolve_collisions(candidate, [&fixed], &canvas, CELL);
        assert_eq!(origin, Point::new(40.0, 160.0));
    }

    #[test]
    fn exit_toward_margin_is_skipped() {
        let canvas = CanvasBounds::default();
        // Both blocks on the top margin row: going up would be clamped back.
        let fixed = Rect::new(40.0, 40.0, 200.0, 120.0);
        let candidate = Rect::new(80.0, 40.0, 200.0, 120.0);
        assert_eq!(minimal_push(&candidate, &fixed), (0.0, -120.0));
        assert_eq!(push_within(&candidate, &fixed, &canvas, CELL), (0.0, 120.0));
        let origin = resolve_collisions(candidate, [&fixed], &canvas, CELL);
        assert_eq!(origin, Point::new(80.0, 160.0));
    }

    #[test]
    fn exit_past_far_corner_is_skipped() {
        let canvas = CanvasBounds {
            width: 800.0,
            height: 600.0,
            margin: 40.0,
        };
        // Fixed block parked at the bottom-right clamp limit.
        let fixed = Rect::new(560.0, 440.0, 200.0, 120.0);
        let candidate = Rect::new(560.0, 440.0, 200.0, 120.0);
        let origin = resolve_collisions(candidate, [&fixed], &canvas, CELL);
        assert!(!rects_overlap(&candidate.with_origin(origin), &fixed));
        assert_eq!(origin, Point::new(560.0, 320.0));
    }
}
