//! Frame display list.
//!
//! A `Frame` is a pure function of the spatial index, the connection set,
//! the selection and the active gesture's overlay. Painters (Vello here,
//! Canvas2D in the browser bridge) only walk it; they never look at the
//! index themselves.

use refmap_core::geometry::{Point, Rect, Size};
use refmap_core::{AnchorId, Color, Connection, ConnectionId, SpatialIndex, TopicId};
use serde::Serialize;

use crate::hit::resize_handle;
use crate::links::LinkGeometry;

/// Where the live preview link ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewEnd {
    Pointer { at: Point },
    Anchor { anchor: AnchorId },
}

/// Gesture state the frame needs to draw on top of the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Link being drawn from an anchor.
    pub preview: Option<(AnchorId, PreviewEnd)>,
    /// Created links still waiting for the reload that brings them back.
    pub retained: Vec<(AnchorId, AnchorId)>,
    pub marquee: Option<Rect>,
    pub hovered_link: Option<ConnectionId>,
    /// Block under an active drag or resize.
    pub active_block: Option<TopicId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorItem {
    pub id: AnchorId,
    pub center: Point,
    pub radius: f32,
    pub title: String,
    /// Source or captured target of the preview link.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockItem {
    pub id: TopicId,
    pub name: String,
    pub rect: Rect,
    pub color: Color,
    pub selected: bool,
    pub active: bool,
    pub handle: Rect,
    pub anchors: Vec<AnchorItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkItem {
    pub id: Option<ConnectionId>,
    pub geometry: LinkGeometry,
    pub hovered: bool,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub canvas: Size,
    /// Draw order, back to front.
    pub blocks: Vec<BlockItem>,
    pub links: Vec<LinkItem>,
    pub preview: Option<LinkGeometry>,
    pub marquee: Option<Rect>,
}

impl Frame {
    pub fn build(
        index: &SpatialIndex,
        connections: &[Connection],
        is_selected: impl Fn(TopicId) -> bool,
        overlay: &Overlay,
    ) -> Frame {
        let config = index.config();
        let cell = config.cell_size;
        let radius = config.anchor.node_radius();
        let style = config.link;

        let highlighted = |id: AnchorId| match overlay.preview {
            Some((source, PreviewEnd::Anchor { anchor })) => id == source || id == anchor,
            Some((source, PreviewEnd::Pointer { .. })) => id == source,
            None => false,
        };

        let blocks = index
            .all_blocks()
            .iter()
            .map(|block| BlockItem {
                id: block.id,
                name: block.name.clone(),
                rect: block.bounds(cell),
                color: block.color,
                selected: is_selected(block.id),
                active: overlay.active_block == Some(block.id),
                handle: resize_handle(block, cell),
                anchors: index
                    .anchor_positions(block.id)
                    .into_iter()
                    .map(|(id, center)| AnchorItem {
                        id,
                        center,
                        radius,
                        title: index.anchor(id).map(|a| a.title.clone()).unwrap_or_default(),
                        highlighted: highlighted(id),
                    })
                    .collect(),
            })
            .collect();

        let resolve = |from: AnchorId, to: AnchorId| {
            Some(LinkGeometry::between(
                index.anchor_position(from)?,
                index.anchor_position(to)?,
                &style,
            ))
        };

        let mut links: Vec<LinkItem> = connections
            .iter()
            .filter_map(|c| {
                let Some(geometry) = resolve(c.source, c.target) else {
                    log::trace!("link {} has an unresolved endpoint", c.id);
                    return None;
                };
                Some(LinkItem {
                    id: Some(c.id),
                    geometry,
                    hovered: overlay.hovered_link == Some(c.id),
                    label: c.label().map(str::to_string),
                })
            })
            .collect();

        // A retained preview is dropped as soon as the real link is present.
        for &(source, target) in &overlay.retained {
            if connections.iter().any(|c| c.joins(source, target)) {
                continue;
            }
            if let Some(geometry) = resolve(source, target) {
                links.push(LinkItem {
                    id: None,
                    geometry,
                    hovered: false,
                    label: None,
                });
            }
        }

        let preview = overlay.preview.and_then(|(source, end)| {
            let from = index.anchor_position(source)?;
            match end {
                PreviewEnd::Anchor { anchor } => {
                    Some(LinkGeometry::between(from, index.anchor_position(anchor)?, &style))
                }
                PreviewEnd::Pointer { at } => Some(LinkGeometry::to_pointer(from, at, &style)),
            }
        });

        Frame {
            canvas: Size::new(config.canvas.width, config.canvas.height),
            blocks,
            links,
            preview,
            marquee: overlay.marquee,
        }
    }

    pub fn block(&self, id: TopicId) -> Option<&BlockItem> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn anchor_center(&self, id: AnchorId) -> Option<Point> {
        self.blocks
            .iter()
            .flat_map(|b| &b.anchors)
            .find(|a| a.id == id)
            .map(|a| a.center)
    }
}
