use egui::{Context, Event, Modifiers};

use crate::hotkeys::{ShortcutAction, ShortcutId};

/// Window-local keyboard shortcuts, read from egui input each frame
#[derive(Debug, Default)]
pub struct ShortcutManager;

impl ShortcutManager {

    /// Actions for this frame's key presses. Nothing fires while a text
    /// field has keyboard focus.
    pub fn process_events(&self, ctx: &Context) -> Vec<ShortcutAction> {
        if ctx.wants_keyboard_input() {
            return Vec::new();
        }

        let events = ctx.input(|i| i.events.clone());
        let actions = Self::actions_for(&events);
        if !actions.is_empty() {
            log::debug!("Shortcut actions: {:?}", actions);
        }
        actions
    }

    pub fn actions_for(events: &[Event]) -> Vec<ShortcutAction> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Key { key, pressed: true, modifiers, .. } if Self::is_plain(*modifiers) => {
                    ShortcutId::from_key(*key).map(ShortcutId::to_action)
                }
                _ => None,
            })
            .collect()
    }

    // Ctrl/Alt/Cmd combinations belong to the platform
    fn is_plain(modifiers: Modifiers) -> bool {
        !(modifiers.ctrl || modifiers.alt || modifiers.command || modifiers.mac_cmd)
    }
}
