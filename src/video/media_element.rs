use crate::core::ReviewError;

/// Notifications from a media backend, drained once per UI frame
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Source probed; duration is now known
    Loaded { duration: f64 },
    /// Playback position moved
    TimeUpdate,
    /// Playback reached the end of the media
    Ended,
    Error(ReviewError),
}

/// The playable element the player controller drives
pub trait MediaElement {
    fn load(&mut self, source: &str);
    fn play(&mut self);
    fn pause(&mut self);
    /// Current position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Duration in seconds, once known
    fn duration(&self) -> Option<f64>;
    fn set_playback_rate(&mut self, rate: f32);
    fn set_muted(&mut self, muted: bool);
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}
