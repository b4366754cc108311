// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard shortcut mapping.
//!
//! `key` values follow `KeyboardEvent.key` (`"z"`, `"Delete"`, `"Escape"`).

use crate::input::{Focus, Modifiers};

/// Actions that keyboard shortcuts can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Undo last edit
    Undo,
    /// Redo last undone edit
    Redo,
    /// Delete selected nodes
    Delete,
    /// Select every node
    SelectAll,
    /// Copy and paste selection in one step
    Duplicate,
    /// Copy selection to the clipboard
    Copy,
    /// Paste clipboard
    Paste,
    /// Zoom in one step
    ZoomIn,
    /// Zoom out one step
    ZoomOut,
    /// Fit all nodes into view
    ZoomToFit,
    /// Save the workflow
    Save,
    /// Cancel gestures and clear selection
    Escape,
    /// Leave the focused text field
    BlurFocus,
}

/// Resolves key events into shortcut actions
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// While a text field has focus only Escape is bound (it blurs), so
    /// typing never triggers editor commands.
    pub fn resolve(key: &str, modifiers: Modifiers, focus: Focus) -> Option<ShortcutAction> {
        if focus == Focus::TextField {
            return (key == "Escape").then_some(ShortcutAction::BlurFocus);
        }

        let cmd = modifiers.command();

        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "s" | "S" => Some(ShortcutAction::Save),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Escape),
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ZoomToFit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        ShortcutMap::resolve(key, modifiers, Focus::Canvas)
    }

    #[test]
    fn test_undo_redo() {
        assert_eq!(canvas("z", Modifiers::CTRL), Some(ShortcutAction::Undo));
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(canvas("z", cmd), Some(ShortcutAction::Undo));
        let cmd_shift = Modifiers {
            shift: true,
            ..cmd
        };
        assert_eq!(canvas("Z", cmd_shift), Some(ShortcutAction::Redo));
        assert_eq!(canvas("y", Modifiers::CTRL), Some(ShortcutAction::Redo));
    }

    #[test]
    fn test_clipboard_keys() {
        assert_eq!(canvas("c", Modifiers::CTRL), Some(ShortcutAction::Copy));
        assert_eq!(canvas("v", Modifiers::CTRL), Some(ShortcutAction::Paste));
        assert_eq!(canvas("d", Modifiers::CTRL), Some(ShortcutAction::Duplicate));
        // Plain letters are not bound
        assert_eq!(canvas("c", Modifiers::NONE), None);
    }

    #[test]
    fn test_single_keys() {
        assert_eq!(canvas("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(canvas("Backspace", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(canvas("Escape", Modifiers::NONE), Some(ShortcutAction::Escape));
        assert_eq!(canvas("0", Modifiers::NONE), Some(ShortcutAction::ZoomToFit));
    }

    #[test]
    fn test_text_focus_suppresses_shortcuts() {
        for (key, modifiers) in [
            ("Delete", Modifiers::NONE),
            ("Backspace", Modifiers::NONE),
            ("z", Modifiers::CTRL),
            ("a", Modifiers::CTRL),
            ("0", Modifiers::NONE),
        ] {
            assert_eq!(ShortcutMap::resolve(key, modifiers, Focus::TextField), None, "{key}");
        }
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE, Focus::TextField),
            Some(ShortcutAction::BlurFocus)
        );
    }
}
