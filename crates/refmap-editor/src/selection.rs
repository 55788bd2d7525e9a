//! Block selection: toggle clicks and marquee rectangles.

use refmap_core::geometry::{Point, Rect};
use refmap_core::{SpatialIndex, TopicId};
use smallvec::SmallVec;

/// Selected block ids, in the order they were added. No duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: SmallVec<[TopicId; 8]>,
}

impl Selection {
    pub fn contains(&self, id: TopicId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// More than one block: drags move the whole group.
    pub fn is_group(&self) -> bool {
        self.ids.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[TopicId] {
        &self.ids
    }

    /// Add or remove `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: TopicId) -> bool {
        match self.ids.iter().position(|s| *s == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        }
    }

    pub fn replace(&mut self, ids: impl IntoIterator<Item = TopicId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let had = !self.ids.is_empty();
        self.ids.clear();
        had
    }

    /// Drop ids that no longer exist in `index`.
    pub fn retain_existing(&mut self, index: &SpatialIndex) {
        self.ids.retain(|id| index.contains(*id));
    }
}

/// Rubber-band rectangle anchored where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub origin: Point,
    pub current: Point,
}

impl Marquee {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.origin, self.current)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    pub selection: Selection,
    marquee: Option<Marquee>,
}

impl SelectionManager {
    pub fn marquee(&self) -> Option<Marquee> {
        self.marquee
    }

    pub fn marquee_active(&self) -> bool {
        self.marquee.is_some()
    }

    pub fn toggle(&mut self, id: TopicId) -> bool {
        let selected = self.selection.toggle(id);
        log::debug!("selection toggle {id}: {selected}");
        selected
    }

    pub fn select_all(&mut self, index: &SpatialIndex) {
        self.selection.replace(index.all_blocks().iter().map(|b| b.id));
    }

    /// The multi-select modifier was released. Clears the selection unless a
    /// marquee is being drawn; returns whether anything changed.
    pub fn modifier_released(&mut self) -> bool {
        if self.marquee.is_some() {
            return false;
        }
        self.selection.clear()
    }

    pub fn begin_marquee(&mut self, at: Point) {
        self.marquee = Some(Marquee {
            origin: at,
            current: at,
        });
    }

    pub fn update_marquee(&mut self, at: Point) -> Option<Rect> {
        let marquee = self.marquee.as_mut()?;
        marquee.current = at;
        Some(marquee.rect())
    }

    /// Replace the selection with every block the marquee touches. A
    /// zero-size marquee (a plain background click) touches nothing and so
    /// clears the selection.
    pub fn finish_marquee(&mut self, index: &SpatialIndex) -> Option<Rect> {
        let rect = self.marquee.take()?.rect();
        self.selection.replace(index.blocks_in_rect(rect));
        log::debug!("marquee {rect:?} selected {}", self.selection.len());
        Some(rect)
    }

    pub fn cancel_marquee(&mut self) -> bool {
        self.marquee.take().is_some()
    }
}
