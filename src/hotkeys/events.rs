use egui::Key;

use crate::video::PlaybackSpeed;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    TogglePlay,
    ToggleMute,
    StepFrame(i64),
    SetSpeed(PlaybackSpeed),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutId {
    PlayPause,
    Mute,
    PreviousFrame,
    NextFrame,
    SpeedHalf,
    SpeedNormal,
    SpeedOneAndQuarter,
    SpeedDouble,
}

impl ShortcutId {
    pub const ALL: [ShortcutId; 8] = [
        ShortcutId::PlayPause,
        ShortcutId::Mute,
        ShortcutId::PreviousFrame,
        ShortcutId::NextFrame,
        ShortcutId::SpeedHalf,
        ShortcutId::SpeedNormal,
        ShortcutId::SpeedOneAndQuarter,
        ShortcutId::SpeedDouble,
    ];

    pub fn key(self) -> Key {
        match self {
            ShortcutId::PlayPause => Key::Space,
            ShortcutId::Mute => Key::M,
            ShortcutId::PreviousFrame => Key::ArrowLeft,
            ShortcutId::NextFrame => Key::ArrowRight,
            ShortcutId::SpeedHalf => Key::Num1,
            ShortcutId::SpeedNormal => Key::Num2,
            ShortcutId::SpeedOneAndQuarter => Key::Num3,
            ShortcutId::SpeedDouble => Key::Num4,
        }
    }

    pub fn to_action(self) -> ShortcutAction {
        match self {
            ShortcutId::PlayPause => ShortcutAction::TogglePlay,
            ShortcutId::Mute => ShortcutAction::ToggleMute,
            ShortcutId::PreviousFrame => ShortcutAction::StepFrame(-1),
            ShortcutId::NextFrame => ShortcutAction::StepFrame(1),
            ShortcutId::SpeedHalf => ShortcutAction::SetSpeed(PlaybackSpeed::Half),
            ShortcutId::SpeedNormal => ShortcutAction::SetSpeed(PlaybackSpeed::Normal),
            ShortcutId::SpeedOneAndQuarter => ShortcutAction::SetSpeed(PlaybackSpeed::OneAndQuarter),
            ShortcutId::SpeedDouble => ShortcutAction::SetSpeed(PlaybackSpeed::Double),
        }
    }

    /// Short label for the help line in the status bar
    pub fn hint(self) -> &'static str {
        match self {
            ShortcutId::PlayPause => "Space play/pause",
            ShortcutId::Mute => "M mute",
            ShortcutId::PreviousFrame => "\u{2190} previous frame",
            ShortcutId::NextFrame => "\u{2192} next frame",
            ShortcutId::SpeedHalf => "1 0.5x",
            ShortcutId::SpeedNormal => "2 1x",
            ShortcutId::SpeedOneAndQuarter => "3 1.25x",
            ShortcutId::SpeedDouble => "4 2x",
        }
    }

    pub fn from_key(key: Key) -> Option<ShortcutId> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }
}
