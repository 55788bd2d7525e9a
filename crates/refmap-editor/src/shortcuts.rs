//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Lives in Rust
//! so the browser bridge and native hosts agree on bindings.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Select every block on the canvas.
    SelectAll,
    /// Abort the active gesture, close panels, or clear the selection.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// `ctrl` and `meta` are treated alike: ⌘ on macOS, Ctrl elsewhere.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value. Returns `None` if the combo
    /// has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        if key == "Escape" {
            return Some(ShortcutAction::Cancel);
        }

        if ctrl || meta {
            return match key {
                "a" | "A" if !shift => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        None
    }

    /// Whether `key` is the multi-select modifier itself.
    pub fn is_multi_select_key(key: &str) -> bool {
        matches!(key, "Control" | "Meta")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_select_all() {
        // Cmd+A
        assert_eq!(
            ShortcutMap::resolve("a", false, false, false, true),
            Some(ShortcutAction::SelectAll)
        );
        // Ctrl+A
        assert_eq!(
            ShortcutMap::resolve("A", true, false, false, false),
            Some(ShortcutAction::SelectAll)
        );
        assert_eq!(ShortcutMap::resolve("a", false, false, false, false), None);
    }

    #[test]
    fn resolve_escape() {
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", true, false, false, false),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(ShortcutMap::resolve("Delete", false, false, false, false), None);
    }

    #[test]
    fn modifier_keys() {
        assert!(ShortcutMap::is_multi_select_key("Meta"));
        assert!(ShortcutMap::is_multi_select_key("Control"));
        assert!(!ShortcutMap::is_multi_select_key("Shift"));
    }
}
