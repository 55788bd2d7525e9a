//! Hit testing: point → canvas element lookup.
//!
//! Walks blocks front-to-back (last painted = topmost). Inside the topmost
//! block under the pointer an anchor node wins over the resize handle, which
//! wins over the block body.

use refmap_core::geometry::{Point, Rect, distance};
use refmap_core::{AnchorId, Block, Connection, ConnectionId, SpatialIndex, TopicId};

use crate::links::LinkGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Anchor { anchor: AnchorId, topic: TopicId },
    ResizeHandle(TopicId),
    Block(TopicId),
    Background,
}

impl Hit {
    pub fn topic(&self) -> Option<TopicId> {
        match *self {
            Hit::Anchor { topic, .. } | Hit::ResizeHandle(topic) | Hit::Block(topic) => Some(topic),
            Hit::Background => None,
        }
    }
}

/// South-east resize handle of a block: a half-cell square in the corner.
pub fn resize_handle(block: &Block, cell: f32) -> Rect {
    let bounds = block.bounds(cell);
    let side = cell / 2.0;
    Rect::new(bounds.right() - side, bounds.bottom() - side, side, side)
}

/// Find what is under `p`.
pub fn hit_test(index: &SpatialIndex, p: Point) -> Hit {
    let cell = index.cell();
    let radius = index.config().anchor.node_radius();

    for block in index.all_blocks().iter().rev() {
        if !block.bounds(cell).contains(p) {
            continue;
        }
        if let Some((anchor, _)) = index
            .anchor_positions(block.id)
            .into_iter()
            .find(|(_, center)| distance(*center, p) <= radius)
        {
            return Hit::Anchor {
                anchor,
                topic: block.id,
            };
        }
        if resize_handle(block, cell).contains(p) {
            return Hit::ResizeHandle(block.id);
        }
        return Hit::Block(block.id);
    }
    Hit::Background
}

/// Blocks intersecting a marquee rectangle.
pub fn hit_test_rect(index: &SpatialIndex, rect: Rect) -> Vec<TopicId> {
    index.blocks_in_rect(rect)
}

/// Link whose visible stroke passes within the hover tolerance of `p`.
/// The closest one wins; links with an unresolved endpoint are skipped.
pub fn link_at(index: &SpatialIndex, connections: &[Connection], p: Point) -> Option<ConnectionId> {
    let style = index.config().link;
    connections
        .iter()
        .filter_map(|c| {
            let from = index.anchor_position(c.source)?;
            let to = index.anchor_position(c.target)?;
            let d = LinkGeometry::between(from, to, &style).distance_to(p);
            (d <= style.hover_tolerance).then_some((c.id, d))
        })
        .fold(None, |best: Option<(ConnectionId, f32)>, (id, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((id, d)),
        })
        .map(|(id, _)| id)
}
