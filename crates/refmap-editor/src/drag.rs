//! DragController: single- and multi-block drag with grid snap and
//! collision resolution.
//!
//! Only the primary block (the one under the pointer) is collision-checked.
//! Other group members follow the same pointer delta, snapped and clamped,
//! and may overlap something until the gesture ends.

use refmap_core::collision::resolve_collisions;
use refmap_core::geometry::{Point, Rect, snap_to_grid};
use refmap_core::{SpatialIndex, TopicId};
use smallvec::SmallVec;

use crate::selection::Selection;

#[derive(Debug, Clone)]
struct DragSession {
    primary: TopicId,
    /// Pointer position at press.
    origin: Point,
    /// Start origin of every dragged block; the primary comes first.
    starts: SmallVec<[(TopicId, Point); 8]>,
    /// Multi-select modifier state at press, used to read a click at release.
    multi_select: bool,
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// The primary block did not move: a click.
    Click { topic: TopicId, multi_select: bool },
    /// Final origins of every dragged block, primary first.
    Moved(Vec<(TopicId, Point)>),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

/// Snap one axis. Motion under half a cell keeps the start coordinate, so
/// a block that was loaded off-grid does not jump on a tiny nudge.
fn snap_axis(start: f32, delta: f32, cell: f32) -> f32 {
    if delta.abs() < cell / 2.0 {
        start
    } else {
        snap_to_grid(start + delta, cell)
    }
}

impl DragController {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn primary(&self) -> Option<TopicId> {
        self.session.as_ref().map(|s| s.primary)
    }

    /// Start dragging `primary`. When it belongs to a multi-block selection
    /// the whole selection moves with it.
    pub fn begin(
        &mut self,
        index: &SpatialIndex,
        primary: TopicId,
        selection: &Selection,
        pointer: Point,
        multi_select: bool,
    ) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(start) = index.block(primary).map(|b| b.position) else {
            return false;
        };
        let mut starts: SmallVec<[(TopicId, Point); 8]> = SmallVec::new();
        starts.push((primary, start));
        if selection.is_group() && selection.contains(primary) {
            for id in selection.iter().filter(|id| *id != primary) {
                if let Some(block) = index.block(id) {
                    starts.push((id, block.position));
                }
            }
        }
        log::debug!("drag start {primary} with {} block(s)", starts.len());
        self.session = Some(DragSession {
            primary,
            origin: pointer,
            starts,
            multi_select,
        });
        true
    }

    /// Apply pointer motion. Returns whether any block moved.
    pub fn update(&mut self, index: &mut SpatialIndex, pointer: Point) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let cell = index.cell();
        let (dx, dy) = pointer.delta_from(session.origin);
        let group: SmallVec<[TopicId; 8]> = session.starts.iter().map(|(id, _)| *id).collect();
        let mut moved = false;

        for (i, (id, start)) in session.starts.iter().enumerate() {
            let Some(size) = index.bounds_of(*id).map(|r| r.size()) else {
                continue;
            };
            let snapped = Point::new(snap_axis(start.x, dx, cell), snap_axis(start.y, dy, cell));
            let clamped = index.clamp(snapped, size);

            let target = if i == 0 {
                let candidate = Rect::from_origin_size(clamped, size);
                let statics: Vec<Rect> = index
                    .overlapping(candidate, &group)
                    .map(|b| b.bounds(cell))
                    .collect();
                resolve_collisions(candidate, &statics, &index.config().canvas, cell)
            } else {
                clamped
            };

            if index.block(*id).map(|b| b.position) != Some(target) {
                index.set_position(*id, target);
                moved = true;
            }
        }
        if moved {
            log::trace!("drag delta ({dx}, {dy})");
        }
        moved
    }

    /// End the gesture.
    pub fn finish(&mut self, index: &mut SpatialIndex) -> Option<DragOutcome> {
        let session = self.session.take()?;
        let (primary, primary_start) = session.starts[0];
        let primary_end = index.block(primary).map(|b| b.position);

        if primary_end == Some(primary_start) {
            // A click: anything that moved with it goes back.
            for (id, start) in &session.starts[1..] {
                index.set_position(*id, *start);
            }
            log::debug!("drag on {primary} ended as a click");
            return Some(DragOutcome::Click {
                topic: primary,
                multi_select: session.multi_select,
            });
        }

        let moves: Vec<_> = session
            .starts
            .iter()
            .filter_map(|(id, _)| index.block(*id).map(|b| (*id, b.position)))
            .collect();
        log::debug!("drag end: {} block(s) moved", moves.len());
        Some(DragOutcome::Moved(moves))
    }

    /// Abort: every dragged block returns to where it started.
    pub fn cancel(&mut self, index: &mut SpatialIndex) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        for (id, start) in &session.starts {
            index.set_position(*id, *start);
        }
        log::debug!("drag on {} cancelled", session.primary);
        true
    }
}
