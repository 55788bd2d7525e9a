//! The storage collaborator and the requests the canvas queues for it.
//!
//! The canvas never talks to storage directly. Gestures produce
//! `PersistRequest`s, the host (or `CanvasSession::flush` in native code)
//! runs them against a `Collaborator`, and reports each `Outcome` back.
//! Local state is never rolled back when a write fails.

use std::collections::HashMap;

use refmap_core::{
    AnchorId, AnchorRecord, ConnectionId, ConnectionRecord, ProjectId, TopicId, TopicRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },
    #[error("rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Whatever stores topics, references and connections.
pub trait Collaborator {
    fn list_topics(&mut self, project: ProjectId) -> Result<Vec<TopicRecord>>;
    fn list_anchors(&mut self, topic: TopicId) -> Result<Vec<AnchorRecord>>;
    fn list_connections(&mut self, project: ProjectId) -> Result<Vec<ConnectionRecord>>;
    fn update_topic_position(&mut self, topic: TopicId, x: f32, y: f32) -> Result<()>;
    fn update_topic_dimensions(&mut self, topic: TopicId, width: u32, height: u32) -> Result<()>;
    fn create_connection(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        description: Option<&str>,
    ) -> Result<ConnectionRecord>;
    fn update_connection(&mut self, id: ConnectionId, description: Option<&str>) -> Result<()>;
    fn delete_connection(&mut self, id: ConnectionId) -> Result<()>;
}

/// A write the canvas wants stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PersistRequest {
    UpdateTopicPosition {
        topic: TopicId,
        x: f32,
        y: f32,
    },
    UpdateTopicDimensions {
        topic: TopicId,
        width: u32,
        height: u32,
    },
    CreateConnection {
        source: AnchorId,
        target: AnchorId,
        description: Option<String>,
    },
    UpdateConnection {
        id: ConnectionId,
        description: Option<String>,
    },
    DeleteConnection {
        id: ConnectionId,
    },
}

impl PersistRequest {
    pub fn dispatch(&self, store: &mut dyn Collaborator) -> Outcome {
        let result = match self {
            Self::UpdateTopicPosition { topic, x, y } => store.update_topic_position(*topic, *x, *y),
            Self::UpdateTopicDimensions {
                topic,
                width,
                height,
            } => store.update_topic_dimensions(*topic, *width, *height),
            Self::CreateConnection {
                source,
                target,
                description,
            } => {
                return match store.create_connection(*source, *target, description.as_deref()) {
                    Ok(record) => Outcome::Created { record },
                    Err(e) => Outcome::Failed {
                        message: e.to_string(),
                    },
                };
            }
            Self::UpdateConnection { id, description } => {
                store.update_connection(*id, description.as_deref())
            }
            Self::DeleteConnection { id } => store.delete_connection(*id),
        };
        match result {
            Ok(()) => Outcome::Done,
            Err(e) => Outcome::Failed {
                message: e.to_string(),
            },
        }
    }

    /// Short human phrase for notifications.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::UpdateTopicPosition { .. } => "save topic position",
            Self::UpdateTopicDimensions { .. } => "save topic size",
            Self::CreateConnection { .. } => "create connection",
            Self::UpdateConnection { .. } => "update connection",
            Self::DeleteConnection { .. } => "delete connection",
        }
    }
}

/// A queued request with the id its outcome is reported under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRequest {
    pub id: u64,
    #[serde(flatten)]
    pub request: PersistRequest,
}

/// Result of one request, as reported back by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Created { record: ConnectionRecord },
    Failed { message: String },
}

// ─── In-memory store ─────────────────────────────────────────────────────

/// A `Collaborator` kept in memory. Used by native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub topics: Vec<TopicRecord>,
    pub anchors: Vec<AnchorRecord>,
    pub connections: Vec<ConnectionRecord>,
    /// Every write fails with a transport error while set.
    pub fail_writes: bool,
    next_connection: u64,
    /// Read calls in order, for checking load sequencing.
    pub reads: Vec<&'static str>,
}

/// JSON shape of a stored project, as in test fixtures.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    topics: Vec<TopicRecord>,
    #[serde(default, alias = "references")]
    anchors: Vec<AnchorRecord>,
    #[serde(default)]
    connections: Vec<ConnectionRecord>,
}

impl MemoryStore {
    /// Load `{"topics": [...], "anchors": [...], "connections": [...]}`.
    /// `"references"` is accepted for the anchor list.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let mut store = Self {
            topics: snapshot.topics,
            anchors: snapshot.anchors,
            connections: snapshot.connections,
            ..Self::default()
        };
        store.next_connection = store
            .connections
            .iter()
            .filter_map(|c| c.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(store)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(PersistError::Transport("store offline".into()));
        }
        Ok(())
    }

    fn topic_mut(&mut self, topic: TopicId) -> Result<&mut TopicRecord> {
        self.topics
            .iter_mut()
            .find(|t| t.id == topic)
            .ok_or_else(|| PersistError::NotFound {
                what: "topic",
                id: topic.to_string(),
            })
    }

    fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut ConnectionRecord> {
        self.connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PersistError::NotFound {
                what: "connection",
                id: id.to_string(),
            })
    }
}

fn in_project(record: &TopicRecord, project: ProjectId) -> bool {
    record.project_id.is_none_or(|p| p == project)
}

impl Collaborator for MemoryStore {
    fn list_topics(&mut self, project: ProjectId) -> Result<Vec<TopicRecord>> {
        self.reads.push("topics");
        Ok(self
            .topics
            .iter()
            .filter(|t| in_project(t, project))
            .cloned()
            .collect())
    }

    fn list_anchors(&mut self, topic: TopicId) -> Result<Vec<AnchorRecord>> {
        self.reads.push("anchors");
        Ok(self
            .anchors
            .iter()
            .filter(|a| a.topic_id == topic)
            .cloned()
            .collect())
    }

    fn list_connections(&mut self, project: ProjectId) -> Result<Vec<ConnectionRecord>> {
        self.reads.push("connections");
        let owners: HashMap<AnchorId, TopicId> =
            self.anchors.iter().map(|a| (a.id, a.topic_id)).collect();
        let topics: Vec<TopicId> = self
            .topics
            .iter()
            .filter(|t| in_project(t, project))
            .map(|t| t.id)
            .collect();
        let in_scope = |a: &AnchorId| owners.get(a).is_some_and(|t| topics.contains(t));
        Ok(self
            .connections
            .iter()
            .filter(|c| in_scope(&c.source_reference_id) || in_scope(&c.target_reference_id))
            .cloned()
            .collect())
    }

    fn update_topic_position(&mut self, topic: TopicId, x: f32, y: f32) -> Result<()> {
        self.check_writable()?;
        let record = self.topic_mut(topic)?;
        record.position_x = x;
        record.position_y = y;
        Ok(())
    }

    fn update_topic_dimensions(&mut self, topic: TopicId, width: u32, height: u32) -> Result<()> {
        self.check_writable()?;
        let record = self.topic_mut(topic)?;
        record.grid_width = Some(width);
        record.grid_height = Some(height);
        Ok(())
    }

    fn create_connection(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        description: Option<&str>,
    ) -> Result<ConnectionRecord> {
        self.check_writable()?;
        if source == target {
            return Err(PersistError::Rejected(format!(
                "reference {source} cannot link to itself"
            )));
        }
        self.next_connection += 1;
        let record = ConnectionRecord {
            id: ConnectionId::from_raw(self.next_connection),
            source_reference_id: source,
            target_reference_id: target,
            description: description.map(str::to_string),
        };
        self.connections.push(record.clone());
        Ok(record)
    }

    fn update_connection(&mut self, id: ConnectionId, description: Option<&str>) -> Result<()> {
        self.check_writable()?;
        self.connection_mut(id)?.description = description.map(str::to_string);
        Ok(())
    }

    fn delete_connection(&mut self, id: ConnectionId) -> Result<()> {
        self.check_writable()?;
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        if self.connections.len() == before {
            return Err(PersistError::NotFound {
                what: "connection",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
