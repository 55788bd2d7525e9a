use crate::id::{AnchorId, ConnectionId, TopicId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unknown topic {topic}")]
    UnknownTopic { topic: TopicId },

    #[error("anchor {anchor} is listed under topic {listed} but belongs to topic {owner}")]
    AnchorOwnerMismatch {
        anchor: AnchorId,
        listed: TopicId,
        owner: TopicId,
    },

    #[error("connection {connection} starts and ends on anchor {anchor}")]
    SelfConnection {
        connection: ConnectionId,
        anchor: AnchorId,
    },
}
