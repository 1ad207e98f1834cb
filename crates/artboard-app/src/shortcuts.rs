//! Keyboard shortcut registry and handling.

use crate::ui::UiAction;
use egui::{Context, Key, Modifiers};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+0").
    pub fn format(&self) -> String {
        if self.ctrl {
            let modifier = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
            format!("{modifier}+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("+", true, "Zoom in"),
            Shortcut::new("-", true, "Zoom out"),
            Shortcut::new("0", true, "Reset zoom"),
            Shortcut::new("Delete", false, "Delete selected element"),
            Shortcut::new("Escape", false, "Cancel current action"),
        ]
    }
}

/// Consume this frame's shortcut key presses and turn them into actions.
///
/// Zoom keys are consumed so the window does not also apply its own zoom.
/// Delete and Escape are left alone while a text field has focus.
pub fn handle_shortcuts(ctx: &Context) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let typing = ctx.wants_keyboard_input();

    ctx.input_mut(|i| {
        // Shift is ignored when matching, so this also covers Ctrl+Shift+=.
        let zoom_in = i.consume_key(Modifiers::COMMAND, Key::Plus)
            | i.consume_key(Modifiers::COMMAND, Key::Equals);
        if zoom_in {
            actions.push(UiAction::ZoomIn);
        }
        if i.consume_key(Modifiers::COMMAND, Key::Minus) {
            actions.push(UiAction::ZoomOut);
        }
        if i.consume_key(Modifiers::COMMAND, Key::Num0) {
            actions.push(UiAction::ZoomReset);
        }

        if typing {
            return;
        }
        if i.consume_key(Modifiers::NONE, Key::Delete) | i.consume_key(Modifiers::NONE, Key::Backspace) {
            actions.push(UiAction::DeleteSelected);
        }
        if i.consume_key(Modifiers::NONE, Key::Escape) {
            actions.push(UiAction::Cancel);
        }
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key_press(key: Key, modifiers: Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    fn run_frame(ctx: &Context, events: Vec<egui::Event>) -> Vec<UiAction> {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let mut actions = Vec::new();
        let _ = ctx.run(input, |ctx| actions = handle_shortcuts(ctx));
        actions
    }

    #[test]
    fn test_shortcut_format() {
        let delete = Shortcut::new("Delete", false, "Delete selected element");
        assert_eq!(delete.format(), "Delete");
        assert!(Shortcut::new("0", true, "Reset zoom").format().ends_with("+0"));
    }

    #[test]
    fn test_zoom_keys_become_actions() {
        let ctx = Context::default();
        let actions = run_frame(
            &ctx,
            vec![
                key_press(Key::Equals, Modifiers::COMMAND),
                key_press(Key::Minus, Modifiers::COMMAND),
                key_press(Key::Num0, Modifiers::COMMAND),
            ],
        );
        assert_eq!(actions, vec![UiAction::ZoomIn, UiAction::ZoomOut, UiAction::ZoomReset]);
    }

    #[test]
    fn test_plain_keys() {
        let ctx = Context::default();
        let actions = run_frame(
            &ctx,
            vec![
                key_press(Key::Delete, Modifiers::NONE),
                key_press(Key::Escape, Modifiers::NONE),
            ],
        );
        assert_eq!(actions, vec![UiAction::DeleteSelected, UiAction::Cancel]);
    }

    #[test]
    fn test_unmodified_zoom_keys_are_ignored() {
        let ctx = Context::default();
        let actions = run_frame(&ctx, vec![key_press(Key::Num0, Modifiers::NONE)]);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_zoom_keys_leave_ui_scale_alone() {
        let ctx = Context::default();
        for _ in 0..3 {
            let actions = run_frame(
                &ctx,
                vec![
                    key_press(Key::Equals, Modifiers::COMMAND),
                    key_press(Key::Plus, Modifiers::COMMAND),
                ],
            );
            assert_eq!(actions, vec![UiAction::ZoomIn]);
        }
        assert!((ctx.zoom_factor() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_registry_lists_every_handled_shortcut() {
        let shortcuts = ShortcutRegistry::all();
        let keys: Vec<&str> = shortcuts.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["+", "-", "0", "Delete", "Escape"]);
        assert!(shortcuts.iter().filter(|s| s.ctrl).all(|s| s.format().len() > s.key.len()));
    }
}
