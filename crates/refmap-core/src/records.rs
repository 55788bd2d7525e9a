//! Wire records exchanged with the storage backend.
//!
//! Field names follow the backend's columns (`position_x`, `grid_width`,
//! `source_reference_id`, ...). Records convert into the model types; the
//! model never sees storage naming.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::id::{AnchorId, ConnectionId, ProjectId, TopicId};
use crate::layout::GridSize;
use crate::model::{Anchor, Block, Color, Connection};
use serde::{Deserialize, Serialize};

/// A topic row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position_x: f32,
    #[serde(default)]
    pub position_y: f32,
    #[serde(default)]
    pub grid_width: Option<u32>,
    #[serde(default)]
    pub grid_height: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    /// Present when the backend embeds the topic's references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<AnchorRecord>>,
}

impl TopicRecord {
    /// Convert into a block with no anchors; anchors arrive separately.
    pub fn to_block(&self) -> Block {
        let grid = GridSize::new(
            self.grid_width.unwrap_or(GridSize::MIN.width).max(GridSize::MIN.width),
            self.grid_height.unwrap_or(GridSize::MIN.height).max(GridSize::MIN.height),
        );
        let mut block = Block::new(
            self.id,
            self.name.clone(),
            Point::new(self.position_x, self.position_y),
            grid,
        );
        if let Some(hex) = self.color.as_deref() {
            match Color::from_hex(hex) {
                Some(c) => block.color = c,
                None => log::warn!("topic {}: unreadable color {hex:?}, using default", self.id),
            }
        }
        block
    }
}

/// A reference row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub id: AnchorId,
    pub topic_id: TopicId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<&AnchorRecord> for Anchor {
    fn from(r: &AnchorRecord) -> Self {
        Anchor {
            id: r.id,
            topic: r.topic_id,
            title: r.title.clone(),
            doi: non_blank(&r.doi),
            authors: non_blank(&r.authors),
            abstract_text: non_blank(&r.abstract_text),
            notes: non_blank(&r.notes),
        }
    }
}

/// A connection row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub source_reference_id: AnchorId,
    pub target_reference_id: AnchorId,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<&ConnectionRecord> for Connection {
    type Error = Error;

    fn try_from(r: &ConnectionRecord) -> Result<Self> {
        Connection::new(
            r.id,
            r.source_reference_id,
            r.target_reference_id,
            r.description.clone(),
        )
        .ok_or(Error::SelfConnection {
            connection: r.id,
            anchor: r.source_reference_id,
        })
    }
}

impl From<&Connection> for ConnectionRecord {
    fn from(c: &Connection) -> Self {
        Self {
            id: c.id,
            source_reference_id: c.source,
            target_reference_id: c.target,
            description: c.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn topic_row_from_backend_json() {
        let json = r##"{"id": 3, "project_id": 1, "name": "Methods",
            "position_x": 120, "position_y": 80, "grid_width": 6,
            "grid_height": null, "color": "#ff8800"}"##;
        let record: TopicRecord = serde_json::from_str(json).unwrap();
        let block = record.to_block();
        assert_eq!(block.id, TopicId::from_raw(3));
        assert_eq!(block.position, Point::new(120.0, 80.0));
        assert_eq!(block.grid, GridSize::new(6, 3));
        assert_eq!(block.color, Color::rgb(0xFF, 0x88, 0x00));
    }

    #[test]
    fn undersized_grid_is_raised_to_minimum() {
        let json = r#"{"id": "t", "grid_width": 2, "grid_height": 1}"#;
        let record: TopicRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.to_block().grid, GridSize::MIN);
    }

    #[test]
    fn blank_reference_fields_become_none() {
        let json = r#"{"id": 9, "topic_id": 3, "title": "Attention", "doi": "", "notes": " n "}"#;
        let record: AnchorRecord = serde_json::from_str(json).unwrap();
        let anchor = Anchor::from(&record);
        assert_eq!(anchor.doi, None);
        assert_eq!(anchor.notes.as_deref(), Some("n"));
        assert_eq!(anchor.topic, TopicId::from_raw(3));
    }

    #[test]
    fn self_connection_row_is_rejected() {
        let record = ConnectionRecord {
            id: ConnectionId::from_raw(1),
            source_reference_id: AnchorId::from_raw(5),
            target_reference_id: AnchorId::from_raw(5),
            description: None,
        };
        assert!(matches!(
            Connection::try_from(&record),
            Err(Error::SelfConnection { .. })
        ));
    }
}
