//! Grid and anchor layout.
//!
//! Blocks live on a fixed grid; anchors inside a block are packed row by row
//! below the header. Anchor positions are always derived from the owning
//! block's current geometry, never stored.

use crate::geometry::{Point, Rect, Size, cells_to_cover};
use serde::{Deserialize, Serialize};

/// Pixel size of one grid cell.
pub const CELL_SIZE: f32 = 40.0;
/// Narrowest block, in cells.
pub const MIN_GRID_WIDTH: u32 = 5;
/// Shortest block regardless of anchor count, in cells.
pub const MIN_GRID_HEIGHT: u32 = 3;

/// Block size in whole grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const MIN: GridSize = GridSize {
        width: MIN_GRID_WIDTH,
        height: MIN_GRID_HEIGHT,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_pixels(self, cell: f32) -> Size {
        Size::new(self.width as f32 * cell, self.height as f32 * cell)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::MIN
    }
}

/// The scrollable drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
    /// Blocks keep at least this distance from every canvas edge.
    pub margin: f32,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            width: 4000.0,
            height: 3000.0,
            margin: CELL_SIZE,
        }
    }
}

impl CanvasBounds {
    /// Clamp a block origin so a block of `size` stays inside the margins.
    ///
    /// The upper limit is rounded down to a whole cell so a grid-aligned
    /// origin stays aligned after clamping.
    pub fn clamp_origin(&self, origin: Point, size: Size, cell: f32) -> Point {
        let min_x = self.margin;
        let min_y = self.margin;
        let max_x = (((self.width - self.margin - size.width) / cell).floor() * cell).max(min_x);
        let max_y = (((self.height - self.margin - size.height) / cell).floor() * cell).max(min_y);
        Point::new(origin.x.clamp(min_x, max_x), origin.y.clamp(min_y, max_y))
    }

    /// Whether `rect` lies inside the margins.
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.x >= self.margin
            && rect.y >= self.margin
            && rect.right() <= self.width - self.margin
            && rect.bottom() <= self.height - self.margin
    }
}

/// Packing parameters for anchors inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLayout {
    /// Height of the block header (title row) above the first anchor row.
    pub header_height: f32,
    /// Left inset of the first column; the same inset is reserved on the right.
    pub padding_x: f32,
    /// Space kept below the last anchor row.
    pub padding_bottom: f32,
    pub node_diameter: f32,
    /// Gap between neighbouring nodes.
    pub gap: f32,
}

impl Default for AnchorLayout {
    fn default() -> Self {
        Self {
            header_height: 70.0,
            padding_x: 25.0,
            padding_bottom: 20.0,
            node_diameter: 30.0,
            gap: 10.0,
        }
    }
}

impl AnchorLayout {
    /// Distance between neighbouring anchor centers.
    pub fn pitch(&self) -> f32 {
        self.node_diameter + self.gap
    }

    pub fn node_radius(&self) -> f32 {
        self.node_diameter / 2.0
    }

    /// Anchors per row for a block `pixel_width` wide. Never less than 1.
    pub fn refs_per_row(&self, pixel_width: f32) -> usize {
        let fit = ((pixel_width - 2.0 * self.padding_x) / self.pitch()).floor();
        if fit >= 1.0 { fit as usize } else { 1 }
    }

    /// Rows occupied by `count` anchors.
    pub fn rows(&self, count: usize, pixel_width: f32) -> usize {
        count.div_ceil(self.refs_per_row(pixel_width))
    }

    /// Center of the anchor at `index`, relative to the block origin.
    pub fn anchor_offset(&self, index: usize, pixel_width: f32) -> Point {
        let per_row = self.refs_per_row(pixel_width);
        let row = index / per_row;
        let col = index % per_row;
        let pitch = self.pitch();
        Point::new(
            self.padding_x + col as f32 * pitch + pitch / 2.0,
            self.header_height + row as f32 * pitch + pitch / 2.0,
        )
    }

    /// Pixel height needed to show `count` anchors.
    pub fn content_height(&self, count: usize, pixel_width: f32) -> f32 {
        self.header_height + self.rows(count, pixel_width) as f32 * self.pitch() + self.padding_bottom
    }

    /// Smallest height, in cells, at which `count` anchors stay visible for a
    /// block `grid_width` cells wide. Floored at [`MIN_GRID_HEIGHT`].
    pub fn min_grid_height(&self, count: usize, grid_width: u32, cell: f32) -> u32 {
        let needed = self.content_height(count, grid_width as f32 * cell);
        cells_to_cover(needed, cell).max(MIN_GRID_HEIGHT)
    }
}
