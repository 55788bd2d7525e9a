//! Input abstraction layer.
//!
//! Normalizes mouse, touch and keyboard events from the host into a unified
//! `InputEvent` consumed by the canvas session. Times are host milliseconds
//! (e.g. `performance.now()` truncated); only differences between them matter.

/// Keyboard modifier state at the moment of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn multi_select(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
        time_ms: u64,
        /// The press landed on a host control (input, button, open menu)
        /// drawn over the canvas.
        on_control: bool,
    },

    PointerMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
        time_ms: u64,
    },

    PointerUp {
        x: f32,
        y: f32,
        modifiers: Modifiers,
        time_ms: u64,
    },

    /// The pointer left the window or the platform cancelled the gesture.
    PointerCancel,

    KeyDown { key: String, modifiers: Modifiers },

    KeyUp { key: String, modifiers: Modifiers },

    /// Timer heartbeat, so time-based transitions fire without motion.
    Tick { time_ms: u64 },
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32, modifiers: Modifiers, time_ms: u64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers,
            time_ms,
            on_control: false,
        }
    }

    pub fn from_pointer_move(x: f32, y: f32, modifiers: Modifiers, time_ms: u64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers,
            time_ms,
        }
    }

    pub fn from_pointer_up(x: f32, y: f32, modifiers: Modifiers, time_ms: u64) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers,
            time_ms,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn time_ms(&self) -> Option<u64> {
        match self {
            Self::PointerDown { time_ms, .. }
            | Self::PointerMove { time_ms, .. }
            | Self::PointerUp { time_ms, .. }
            | Self::Tick { time_ms } => Some(*time_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_or_ctrl_is_multi_select() {
        assert!(!Modifiers::NONE.multi_select());
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(ctrl.multi_select() && meta.multi_select());
    }

    #[test]
    fn dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
    }
}
