pub mod canvas;
pub mod connection;
pub mod drag;
pub mod input;
pub mod persist;
pub mod resize;
pub mod selection;
pub mod shortcuts;

pub use canvas::{CanvasEffect, CanvasSession, GestureMode, Notification, Panels, PanelKind};
pub use connection::{ConnectState, ConnectionController, DescriptionDraft};
pub use drag::{DragController, DragOutcome};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use persist::{Collaborator, MemoryStore, Outcome, PendingRequest, PersistError, PersistRequest};
pub use resize::{ResizeController, ResizeDirection};
pub use selection::{Selection, SelectionManager};
pub use shortcuts::{ShortcutAction, ShortcutMap};
