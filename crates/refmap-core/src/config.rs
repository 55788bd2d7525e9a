//! Tunable constants for a canvas session.
//!
//! Every field has a default, so hosts can deserialize a partial object
//! (`{"cell_size": 32}`) and get the stock values for the rest.

use crate::geometry::Size;
use crate::layout::{AnchorLayout, CELL_SIZE, CanvasBounds, GridSize};
use serde::{Deserialize, Serialize};

/// Link stroke geometry and hover behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkStyle {
    /// Visual radius of an anchor node; link strokes start and stop on it.
    pub circle_radius: f32,
    pub arrowhead_length: f32,
    /// Max pointer distance from a link segment that still counts as a hover.
    pub hover_tolerance: f32,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            circle_radius: 15.0,
            arrowhead_length: 21.0,
            hover_tolerance: 10.0,
        }
    }
}

/// Floating panel placement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Minimum distance between a panel and the viewport edge.
    pub margin: f32,
    /// Size assumed before the panel has been measured.
    pub estimated_size: Size,
    /// Perpendicular distance between a link and its tooltip.
    pub link_offset: f32,
    /// Gap between an anchor node and its detail panel.
    pub anchor_gap: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            estimated_size: Size::new(300.0, 100.0),
            link_offset: 15.0,
            anchor_gap: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub cell_size: f32,
    pub canvas: CanvasBounds,
    pub anchor: AnchorLayout,
    pub min_grid: GridSize,
    pub link: LinkStyle,
    pub tooltip: TooltipConfig,
    /// How long an anchor must be held before a link gesture starts.
    pub connect_debounce_ms: u64,
    pub tooltip_hide_delay_ms: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            canvas: CanvasBounds::default(),
            anchor: AnchorLayout::default(),
            min_grid: GridSize::MIN,
            link: LinkStyle::default(),
            tooltip: TooltipConfig::default(),
            connect_debounce_ms: 150,
            tooltip_hide_delay_ms: 100,
        }
    }
}

impl CanvasConfig {
    /// Dynamic minimum height for a block holding `anchor_count` anchors.
    pub fn min_grid_height(&self, anchor_count: usize, grid_width: u32) -> u32 {
        self.anchor
            .min_grid_height(anchor_count, grid_width, self.cell_size)
            .max(self.min_grid.height)
    }

    /// Raise `grid` to the configured floor on both axes.
    pub fn floor_grid(&self, grid: GridSize) -> GridSize {
        GridSize::new(
            grid.width.max(self.min_grid.width),
            grid.height.max(self.min_grid.height),
        )
    }
}
