//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map
//! lives in Rust so the wasm bridge and native tests share it.
//!
//! While a text field or an inline label editor has focus every key
//! belongs to the text, so nothing resolves.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    Duplicate,
    SelectAll,
    Delete,
    Deselect,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
            ShortcutAction::Copy => "copy",
            ShortcutAction::Cut => "cut",
            ShortcutAction::Paste => "paste",
            ShortcutAction::Duplicate => "duplicate",
            ShortcutAction::SelectAll => "selectAll",
            ShortcutAction::Delete => "delete",
            ShortcutAction::Deselect => "deselect",
        }
    }
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding or `editing_text` is set.
    pub fn resolve(key: &str, mods: Modifiers, editing_text: bool) -> Option<ShortcutAction> {
        if editing_text {
            return None;
        }
        let cmd = mods.command();

        if cmd && mods.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    const META_SHIFT: Modifiers = Modifiers {
        meta: true,
        shift: true,
        ..Modifiers::NONE
    };

    #[test]
    fn resolve_undo_redo() {
        assert_eq!(ShortcutMap::resolve("z", CTRL, false), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", META, false), Some(ShortcutAction::Undo));
        // Shift turns the key uppercase in most browsers.
        assert_eq!(ShortcutMap::resolve("Z", META_SHIFT, false), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("y", CTRL, false), Some(ShortcutAction::Redo));
    }

    #[test]
    fn resolve_clipboard() {
        assert_eq!(ShortcutMap::resolve("c", META, false), Some(ShortcutAction::Copy));
        assert_eq!(ShortcutMap::resolve("x", META, false), Some(ShortcutAction::Cut));
        assert_eq!(ShortcutMap::resolve("v", CTRL, false), Some(ShortcutAction::Paste));
        assert_eq!(ShortcutMap::resolve("d", CTRL, false), Some(ShortcutAction::Duplicate));
        assert_eq!(ShortcutMap::resolve("a", META, false), Some(ShortcutAction::SelectAll));
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn text_editing_swallows_everything() {
        assert_eq!(ShortcutMap::resolve("z", META, true), None);
        assert_eq!(ShortcutMap::resolve("Backspace", Modifiers::NONE, true), None);
    }

    #[test]
    fn resolve_modifier_precedence() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE, false), None);
        assert_eq!(ShortcutMap::resolve("c", Modifiers::NONE, false), None);
        assert_eq!(ShortcutMap::resolve("c", META_SHIFT, false), None);
    }

    #[test]
    fn names_are_camel_case() {
        assert_eq!(ShortcutAction::SelectAll.name(), "selectAll");
        assert_eq!(ShortcutAction::Undo.name(), "undo");
    }
}
