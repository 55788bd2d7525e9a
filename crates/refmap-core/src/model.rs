//! Canvas data model: topic blocks, reference anchors, and connections.
//!
//! Blocks own an ordered list of anchors. Anchors have no stored position;
//! their centers come from the owner's geometry (see [`crate::layout`]).
//! Connections name two anchors and hold no geometry either.

use crate::geometry::{Point, Rect};
use crate::id::{AnchorId, ConnectionId, TopicId};
use crate::layout::GridSize;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    /// Topic color used when storage has none.
    pub const DEFAULT_TOPIC: Color = Color::rgb(0x00, 0x7B, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => Some(Self::rgb(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self {
                r: pair(0)?,
                g: pair(2)?,
                b: pair(4)?,
                a: pair(6)?,
            }),
            _ => None,
        }
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color with alpha scaled by `opacity` (0.0 ..= 1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_TOPIC
    }
}

// ─── Block (topic) ───────────────────────────────────────────────────────

/// A movable, resizable topic block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: TopicId,
    pub name: String,
    /// Top-left corner, canvas pixels.
    pub position: Point,
    pub grid: GridSize,
    pub color: Color,
    /// Owned anchors in display order.
    pub anchors: SmallVec<[AnchorId; 8]>,
}

impl Block {
    pub fn new(id: TopicId, name: impl Into<String>, position: Point, grid: GridSize) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            grid,
            color: Color::DEFAULT_TOPIC,
            anchors: SmallVec::new(),
        }
    }

    pub fn with_anchors(mut self, anchors: impl IntoIterator<Item = AnchorId>) -> Self {
        self.anchors = anchors.into_iter().collect();
        self
    }

    /// Bounding rectangle at the current position and size.
    pub fn bounds(&self, cell: f32) -> Rect {
        Rect::from_origin_size(self.position, self.grid.to_pixels(cell))
    }

    pub fn anchor_index(&self, anchor: AnchorId) -> Option<usize> {
        self.anchors.iter().position(|a| *a == anchor)
    }
}

// ─── Anchor (reference) ──────────────────────────────────────────────────

/// A reference node. Position is derived from its owner block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub id: AnchorId,
    pub topic: TopicId,
    pub title: String,
    pub doi: Option<String>,
    pub authors: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub notes: Option<String>,
}

impl Anchor {
    pub fn new(id: AnchorId, topic: TopicId, title: impl Into<String>) -> Self {
        Self {
            id,
            topic,
            title: title.into(),
            doi: None,
            authors: None,
            abstract_text: None,
            notes: None,
        }
    }
}

// ─── Connection ──────────────────────────────────────────────────────────

/// A directed, optionally described link between two anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: AnchorId,
    pub target: AnchorId,
    pub description: Option<String>,
}

impl Connection {
    /// `None` when both ends are the same anchor.
    pub fn new(
        id: ConnectionId,
        source: AnchorId,
        target: AnchorId,
        description: Option<String>,
    ) -> Option<Self> {
        (source != target).then_some(Self {
            id,
            source,
            target,
            description,
        })
    }

    pub fn joins(&self, source: AnchorId, target: AnchorId) -> bool {
        self.source == source && self.target == target
    }

    /// Description with surrounding whitespace removed, `None` when blank.
    pub fn label(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
