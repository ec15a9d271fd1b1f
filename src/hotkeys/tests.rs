#[cfg(test)]
mod tests {
    use super::super::{ShortcutAction, ShortcutId, ShortcutManager};
    use crate::video::PlaybackSpeed;
    use egui::{Event, Key, Modifiers};

    fn press(key: Key, modifiers: Modifiers) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn test_shortcut_id_to_action() {
        assert_eq!(ShortcutId::PlayPause.to_action(), ShortcutAction::TogglePlay);
        assert_eq!(ShortcutId::Mute.to_action(), ShortcutAction::ToggleMute);
        assert_eq!(ShortcutId::PreviousFrame.to_action(), ShortcutAction::StepFrame(-1));
        assert_eq!(ShortcutId::NextFrame.to_action(), ShortcutAction::StepFrame(1));
        assert_eq!(ShortcutId::SpeedDouble.to_action(), ShortcutAction::SetSpeed(PlaybackSpeed::Double));
    }

    #[test]
    fn test_keys_are_unique() {
        for id in ShortcutId::ALL {
            assert_eq!(ShortcutId::from_key(id.key()), Some(id));
        }
        assert_eq!(ShortcutId::from_key(Key::Q), None);
    }

    #[test]
    fn test_plain_presses_map_to_actions() {
        let events = vec![
            press(Key::Space, Modifiers::NONE),
            press(Key::Num1, Modifiers::NONE),
            press(Key::ArrowRight, Modifiers::SHIFT),
        ];

        assert_eq!(
            ShortcutManager::actions_for(&events),
            vec![
                ShortcutAction::TogglePlay,
                ShortcutAction::SetSpeed(PlaybackSpeed::Half),
                ShortcutAction::StepFrame(1),
            ]
        );
    }

    #[test]
    fn test_modified_presses_and_releases_are_ignored() {
        let mut release = press(Key::M, Modifiers::NONE);
        if let Event::Key { pressed, .. } = &mut release {
            *pressed = false;
        }

        let events = vec![
            press(Key::M, Modifiers::CTRL),
            press(Key::Space, Modifiers::ALT),
            release,
            Event::Text("m".to_string()),
        ];

        assert!(ShortcutManager::actions_for(&events).is_empty());
    }
}
