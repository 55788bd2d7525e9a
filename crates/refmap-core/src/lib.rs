pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod records;
pub mod spatial;
pub mod tooltip;

pub use config::{CanvasConfig, LinkStyle, TooltipConfig};
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use id::{AnchorId, ConnectionId, ProjectId, TopicId};
pub use layout::{AnchorLayout, CELL_SIZE, CanvasBounds, GridSize};
pub use model::*;
pub use records::{AnchorRecord, ConnectionRecord, TopicRecord};
pub use spatial::SpatialIndex;
pub use tooltip::{FloatingPanel, PanelAnchor, Side, TooltipPlacer};
