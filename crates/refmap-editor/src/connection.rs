//! ConnectionController: link creation, editing and the live preview.
//!
//! ```text
//! Idle ──press anchor──▶ Pressed ──held ≥ debounce──▶ Connecting
//!  ▲                        │ release early                │ release
//!  │                        ▼                              ▼
//!  │                  click (details)        over another anchor? ──no──▶ Idle
//!  │                                                       │ yes
//!  └──────── save / cancel ◀──── AwaitingDescription ◀─────┘
//! ```
//!
//! Editing an existing link jumps from `Idle` straight to
//! `AwaitingDescription` with the old text. A saved creation leaves a
//! retained preview behind until the reloaded connection set contains the
//! new link, or the create call fails.

use refmap_core::geometry::Point;
use refmap_core::{AnchorId, Connection, ConnectionId};
use refmap_render::PreviewEnd;
use serde::Serialize;

/// What a description editor is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftTarget {
    Create { source: AnchorId, target: AnchorId },
    Edit { connection: ConnectionId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionDraft {
    #[serde(flatten)]
    pub target: DraftTarget,
    /// Pre-filled text.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectState {
    Idle,
    /// Pointer is down on an anchor; not yet a link gesture.
    Pressed {
        source: AnchorId,
        at: Point,
        since_ms: u64,
    },
    Connecting {
        source: AnchorId,
        pointer: Point,
        /// Anchor under the pointer, other than the source.
        target: Option<AnchorId>,
    },
    AwaitingDescription(DescriptionDraft),
}

/// How a release ended the press or link gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectRelease {
    /// Released before the debounce: a click on the anchor.
    Click(AnchorId),
    /// Released over another anchor; the description editor opens.
    AwaitDescription(DescriptionDraft),
    /// Released over the source, empty space, or nothing valid.
    Cancelled,
}

/// A saved description, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionSave {
    Create {
        source: AnchorId,
        target: AnchorId,
        description: Option<String>,
    },
    Update {
        connection: ConnectionId,
        description: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ConnectionController {
    state: ConnectState,
    debounce_ms: u64,
    retained: Vec<(AnchorId, AnchorId)>,
}

fn normalize(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl ConnectionController {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            state: ConnectState::Idle,
            debounce_ms,
            retained: Vec::new(),
        }
    }

    pub fn state(&self) -> &ConnectState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ConnectState::Idle)
    }

    /// A press or link drag is in progress.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self.state,
            ConnectState::Pressed { .. } | ConnectState::Connecting { .. }
        )
    }

    pub fn is_awaiting_description(&self) -> bool {
        matches!(self.state, ConnectState::AwaitingDescription(_))
    }

    pub fn draft(&self) -> Option<&DescriptionDraft> {
        match &self.state {
            ConnectState::AwaitingDescription(d) => Some(d),
            _ => None,
        }
    }

    pub fn press(&mut self, source: AnchorId, at: Point, now_ms: u64) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.state = ConnectState::Pressed {
            source,
            at,
            since_ms: now_ms,
        };
        true
    }

    /// Promote a held press to a link gesture once the debounce elapses.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if let ConnectState::Pressed {
            source,
            at,
            since_ms,
        } = self.state
            && now_ms.saturating_sub(since_ms) >= self.debounce_ms
        {
            log::debug!("link gesture from {source}");
            self.state = ConnectState::Connecting {
                source,
                pointer: at,
                target: None,
            };
            return true;
        }
        false
    }

    /// Track the pointer. `hover` is the anchor under it, if any.
    pub fn pointer_move(&mut self, pointer: Point, hover: Option<AnchorId>, now_ms: u64) -> bool {
        let promoted = self.tick(now_ms);
        if let ConnectState::Connecting {
            source,
            pointer: p,
            target,
        } = &mut self.state
        {
            *p = pointer;
            *target = hover.filter(|h| h != source);
            return true;
        }
        promoted
    }

    /// End the press or link gesture. `hover` is the anchor under the
    /// release point; the target captured by the last move only drives the
    /// preview.
    pub fn release(&mut self, hover: Option<AnchorId>, now_ms: u64) -> ConnectRelease {
        // A held press may never have seen a tick or a move past the debounce.
        self.tick(now_ms);
        match std::mem::replace(&mut self.state, ConnectState::Idle) {
            ConnectState::Pressed { source, .. } => ConnectRelease::Click(source),
            ConnectState::Connecting { source, .. } => {
                match hover.filter(|t| *t != source) {
                    Some(target) => {
                        let draft = DescriptionDraft {
                            target: DraftTarget::Create { source, target },
                            text: String::new(),
                        };
                        log::debug!("link {source} -> {target} awaiting description");
                        self.state = ConnectState::AwaitingDescription(draft.clone());
                        ConnectRelease::AwaitDescription(draft)
                    }
                    None => {
                        log::debug!("link gesture from {source} cancelled");
                        ConnectRelease::Cancelled
                    }
                }
            }
            other => {
                self.state = other;
                ConnectRelease::Cancelled
            }
        }
    }

    /// Abort a press or link drag. The description editor is not affected.
    pub fn cancel_gesture(&mut self) -> bool {
        if self.is_gesture() {
            self.state = ConnectState::Idle;
            return true;
        }
        false
    }

    /// Open the editor for an existing link, pre-filled.
    pub fn edit(&mut self, connection: &Connection) -> Option<DescriptionDraft> {
        if !self.is_idle() {
            return None;
        }
        let draft = DescriptionDraft {
            target: DraftTarget::Edit {
                connection: connection.id,
            },
            text: connection.description.clone().unwrap_or_default(),
        };
        self.state = ConnectState::AwaitingDescription(draft.clone());
        Some(draft)
    }

    pub fn save(&mut self, text: &str) -> Option<DescriptionSave> {
        let ConnectState::AwaitingDescription(draft) =
            std::mem::replace(&mut self.state, ConnectState::Idle)
        else {
            return None;
        };
        let description = normalize(text);
        Some(match draft.target {
            DraftTarget::Create { source, target } => {
                self.retained.push((source, target));
                DescriptionSave::Create {
                    source,
                    target,
                    description,
                }
            }
            DraftTarget::Edit { connection } => DescriptionSave::Update {
                connection,
                description,
            },
        })
    }

    pub fn cancel_description(&mut self) -> bool {
        if self.is_awaiting_description() {
            self.state = ConnectState::Idle;
            return true;
        }
        false
    }

    /// Live preview for the renderer. A captured target wins over the raw
    /// pointer.
    pub fn preview(&self) -> Option<(AnchorId, PreviewEnd)> {
        match self.state {
            ConnectState::Connecting {
                source,
                target: Some(anchor),
                ..
            } => Some((source, PreviewEnd::Anchor { anchor })),
            ConnectState::Connecting {
                source, pointer, ..
            } => Some((source, PreviewEnd::Pointer { at: pointer })),
            ConnectState::AwaitingDescription(DescriptionDraft {
                target: DraftTarget::Create { source, target },
                ..
            }) => Some((source, PreviewEnd::Anchor { anchor: target })),
            _ => None,
        }
    }

    pub fn retained(&self) -> &[(AnchorId, AnchorId)] {
        &self.retained
    }

    /// Drop retained previews that the reloaded set now contains.
    pub fn connections_reloaded(&mut self, connections: &[Connection]) {
        self.retained
            .retain(|(s, t)| !connections.iter().any(|c| c.joins(*s, *t)));
    }

    pub fn create_failed(&mut self, source: AnchorId, target: AnchorId) {
        self.retained.retain(|pair| *pair != (source, target));
    }

    /// Back to `Idle`, dropping retained previews too.
    pub fn reset(&mut self) {
        self.state = ConnectState::Idle;
        self.retained.clear();
    }
}
