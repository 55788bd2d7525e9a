//! ResizeController: edge and corner resizing in whole grid cells.
//!
//! Width never drops below the configured minimum. Height never drops below
//! the block's dynamic minimum, which grows with its anchor count and
//! shrinks as the block gets wider. A candidate that would overlap another
//! block or cross the canvas margin is rejected and the last accepted size
//! stays.

use refmap_core::geometry::{Point, Rect};
use refmap_core::{GridSize, SpatialIndex, TopicId};

/// Which edges follow the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeDirection {
    pub n: bool,
    pub s: bool,
    pub e: bool,
    pub w: bool,
}

impl ResizeDirection {
    /// The bottom-right handle.
    pub const SE: ResizeDirection = ResizeDirection {
        n: false,
        s: true,
        e: true,
        w: false,
    };

    /// Parse `"se"`, `"n"`, `"nw"`, ... Unknown letters are ignored.
    pub fn parse(s: &str) -> Self {
        let mut dir = ResizeDirection::default();
        for c in s.chars() {
            match c.to_ascii_lowercase() {
                'n' => dir.n = true,
                's' => dir.s = true,
                'e' => dir.e = true,
                'w' => dir.w = true,
                _ => {}
            }
        }
        dir
    }

    pub fn is_empty(&self) -> bool {
        !(self.n || self.s || self.e || self.w)
    }
}

#[derive(Debug, Clone)]
struct ResizeSession {
    topic: TopicId,
    direction: ResizeDirection,
    origin: Point,
    start_position: Point,
    start_grid: GridSize,
}

/// Result of a completed resize that changed something.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub topic: TopicId,
    pub grid: GridSize,
    /// Set when a west or north edge moved the origin.
    pub position: Option<Point>,
}

#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    session: Option<ResizeSession>,
}

/// Cells covered by a pointer delta, rounded to the nearest whole cell.
fn whole_cells(delta: f32, cell: f32) -> i64 {
    (delta / cell).round() as i64
}

fn apply_cells(start: u32, change: i64) -> u32 {
    (start as i64 + change).max(0) as u32
}

impl ResizeController {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn topic(&self) -> Option<TopicId> {
        self.session.as_ref().map(|s| s.topic)
    }

    pub fn begin(
        &mut self,
        index: &SpatialIndex,
        topic: TopicId,
        direction: ResizeDirection,
        pointer: Point,
    ) -> bool {
        if self.session.is_some() || direction.is_empty() {
            return false;
        }
        let Some(block) = index.block(topic) else {
            return false;
        };
        log::debug!("resize start {topic}");
        self.session = Some(ResizeSession {
            topic,
            direction,
            origin: pointer,
            start_position: block.position,
            start_grid: block.grid,
        });
        true
    }

    /// Candidate origin and size for the current pointer.
    fn candidate(&self, index: &SpatialIndex, pointer: Point) -> Option<(Point, GridSize)> {
        let s = self.session.as_ref()?;
        let config = index.config();
        let cell = config.cell_size;
        let (dx, dy) = pointer.delta_from(s.origin);
        let cols = whole_cells(dx, cell);
        let rows = whole_cells(dy, cell);
        let dir = s.direction;

        let mut width = s.start_grid.width;
        if dir.e {
            width = apply_cells(width, cols);
        } else if dir.w {
            width = apply_cells(width, -cols);
        }
        let width = width.max(config.min_grid.width);

        let mut height = s.start_grid.height;
        if dir.s {
            height = apply_cells(height, rows);
        } else if dir.n {
            height = apply_cells(height, -rows);
        }
        let anchors = index.block(s.topic).map_or(0, |b| b.anchors.len());
        let height = height.max(config.min_grid_height(anchors, width));

        // West and north keep the opposite edge fixed.
        let mut origin = s.start_position;
        if dir.w {
            origin.x += (s.start_grid.width as f32 - width as f32) * cell;
        }
        if dir.n {
            origin.y += (s.start_grid.height as f32 - height as f32) * cell;
        }
        Some((origin, GridSize::new(width, height)))
    }

    /// The moving edges must stay inside the canvas margins. Edges that do
    /// not move are not checked, so a block loaded partly outside can still
    /// be resized.
    fn edges_inside(&self, index: &SpatialIndex, rect: &Rect) -> bool {
        let Some(s) = &self.session else {
            return false;
        };
        let canvas = index.config().canvas;
        let d = s.direction;
        (!d.e || rect.right() <= canvas.width - canvas.margin)
            && (!d.s || rect.bottom() <= canvas.height - canvas.margin)
            && (!d.w || rect.x >= canvas.margin)
            && (!d.n || rect.y >= canvas.margin)
    }

    /// Apply pointer motion. Returns whether the block changed.
    pub fn update(&mut self, index: &mut SpatialIndex, pointer: Point) -> bool {
        let Some((origin, grid)) = self.candidate(index, pointer) else {
            return false;
        };
        let Some(topic) = self.topic() else {
            return false;
        };
        let Some(current) = index.block(topic) else {
            return false;
        };
        if current.position == origin && current.grid == grid {
            return false;
        }

        let rect = Rect::from_origin_size(origin, grid.to_pixels(index.cell()));
        let exclude = [topic];
        if !self.edges_inside(index, &rect) || index.overlapping(rect, &exclude).next().is_some() {
            log::trace!("resize of {topic} to {}x{} rejected", grid.width, grid.height);
            return false;
        }
        index.set_geometry(topic, origin, grid)
    }

    /// End the gesture. `None` when nothing changed.
    pub fn finish(&mut self, index: &SpatialIndex) -> Option<ResizeOutcome> {
        let s = self.session.take()?;
        let block = index.block(s.topic)?;
        if block.grid == s.start_grid && block.position == s.start_position {
            return None;
        }
        log::debug!(
            "resize end {}: {}x{}",
            s.topic,
            block.grid.width,
            block.grid.height
        );
        Some(ResizeOutcome {
            topic: s.topic,
            grid: block.grid,
            position: (block.position != s.start_position).then_some(block.position),
        })
    }

    pub fn cancel(&mut self, index: &mut SpatialIndex) -> bool {
        let Some(s) = self.session.take() else {
            return false;
        };
        index.set_geometry(s.topic, s.start_position, s.start_grid);
        log::debug!("resize of {} cancelled", s.topic);
        true
    }
}
