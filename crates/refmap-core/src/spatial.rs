//! SpatialIndex: the authoritative store of block geometry.
//!
//! Controllers mutate block origins and grid sizes here; the renderer and hit
//! tester read from here. Anchor centers are derived on every lookup from
//! the owner's current origin and width, so they follow a block through a
//! drag or resize without any extra bookkeeping.

use crate::config::CanvasConfig;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size, rects_overlap};
use crate::id::{AnchorId, TopicId};
use crate::layout::GridSize;
use crate::model::{Anchor, Block};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    config: CanvasConfig,
    /// Draw order: later blocks paint on top and win hit tests.
    blocks: Vec<Block>,
    anchors: HashMap<AnchorId, Anchor>,
    owners: HashMap<AnchorId, TopicId>,
}

impl SpatialIndex {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn cell(&self) -> f32 {
        self.config.cell_size
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.anchors.clear();
        self.owners.clear();
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Replace every block. Anchor metadata is dropped; the anchor ids each
    /// block already lists keep resolving to positions.
    pub fn replace_topics(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.clear();
        for mut block in blocks {
            block.grid = self.config.floor_grid(block.grid);
            for anchor in &block.anchors {
                self.owners.insert(*anchor, block.id);
            }
            self.blocks.push(block);
        }
        log::debug!("spatial index: {} blocks", self.blocks.len());
    }

    /// Replace the anchors of one topic, in display order.
    pub fn set_anchors(&mut self, topic: TopicId, anchors: Vec<Anchor>) -> Result<()> {
        if let Some(bad) = anchors.iter().find(|a| a.topic != topic) {
            return Err(Error::AnchorOwnerMismatch {
                anchor: bad.id,
                listed: topic,
                owner: bad.topic,
            });
        }
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == topic)
            .ok_or(Error::UnknownTopic { topic })?;

        for old in block.anchors.drain(..) {
            self.anchors.remove(&old);
            self.owners.remove(&old);
        }
        for anchor in anchors {
            block.anchors.push(anchor.id);
            self.owners.insert(anchor.id, topic);
            self.anchors.insert(anchor.id, anchor);
        }
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn all_blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: TopicId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.block(id).is_some()
    }

    pub fn bounds_of(&self, id: TopicId) -> Option<Rect> {
        self.block(id).map(|b| b.bounds(self.config.cell_size))
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(&id)
    }

    pub fn owner_of(&self, anchor: AnchorId) -> Option<TopicId> {
        self.owners.get(&anchor).copied()
    }

    /// Current center of an anchor node.
    pub fn anchor_position(&self, anchor: AnchorId) -> Option<Point> {
        let block = self.block(self.owner_of(anchor)?)?;
        let index = block.anchor_index(anchor)?;
        let width = block.grid.to_pixels(self.config.cell_size).width;
        let offset = self.config.anchor.anchor_offset(index, width);
        Some(block.position.offset(offset.x, offset.y))
    }

    /// Anchor ids and centers of one block, in display order.
    pub fn anchor_positions(&self, topic: TopicId) -> Vec<(AnchorId, Point)> {
        let Some(block) = self.block(topic) else {
            return Vec::new();
        };
        let width = block.grid.to_pixels(self.config.cell_size).width;
        block
            .anchors
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let offset = self.config.anchor.anchor_offset(i, width);
                (*id, block.position.offset(offset.x, offset.y))
            })
            .collect()
    }

    /// Blocks whose bounds intersect `rect`, skipping `exclude`.
    pub fn overlapping<'a>(
        &'a self,
        rect: Rect,
        exclude: &'a [TopicId],
    ) -> impl Iterator<Item = &'a Block> + 'a {
        let cell = self.config.cell_size;
        self.blocks
            .iter()
            .filter(move |b| !exclude.contains(&b.id) && rects_overlap(&b.bounds(cell), &rect))
    }

    /// Ids of every block intersecting `rect`, in draw order.
    pub fn blocks_in_rect(&self, rect: Rect) -> Vec<TopicId> {
        self.overlapping(rect, &[]).map(|b| b.id).collect()
    }

    /// Whether `rect` stays inside the canvas and clear of other blocks.
    pub fn is_free(&self, rect: Rect, exclude: &[TopicId]) -> bool {
        self.config.canvas.contains(&rect) && self.overlapping(rect, exclude).next().is_none()
    }

    /// Clamp a block origin to the canvas margins.
    pub fn clamp(&self, origin: Point, size: Size) -> Point {
        self.config
            .canvas
            .clamp_origin(origin, size, self.config.cell_size)
    }

    /// Smallest height the block can take without hiding its anchors.
    pub fn min_grid_height(&self, id: TopicId, grid_width: u32) -> Option<u32> {
        self.block(id)
            .map(|b| self.config.min_grid_height(b.anchors.len(), grid_width))
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: TopicId, position: Point) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_geometry(&mut self, id: TopicId, position: Point, grid: GridSize) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.position = position;
                block.grid = grid;
                true
            }
            None => false,
        }
    }
}
