use crate::core::{clamp_progress, ReviewError};
use crate::video::{MediaElement, MediaEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    OneAndQuarter,
    Double,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndQuarter,
        PlaybackSpeed::Double,
    ];

    pub fn rate(self) -> f32 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndQuarter => 1.25,
            PlaybackSpeed::Double => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackSpeed::Half => "0.50x",
            PlaybackSpeed::Normal => "1x",
            PlaybackSpeed::OneAndQuarter => "1.25x",
            PlaybackSpeed::Double => "2x",
        }
    }

    /// Closest supported speed to an arbitrary rate
    pub fn from_rate(rate: f32) -> Self {
        Self::ALL
            .into_iter()
            .min_by(|a, b| {
                (a.rate() - rate)
                    .abs()
                    .total_cmp(&(b.rate() - rate).abs())
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub playing: bool,
    /// Percentage of the duration, always within [0, 100]
    pub progress: f64,
    pub speed: PlaybackSpeed,
    pub muted: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playing: false,
            progress: 0.0,
            speed: PlaybackSpeed::Normal,
            muted: false,
        }
    }
}

/// Player state machine over a media element.
///
/// User actions only change `PlayerState`; `commit` then pushes whatever
/// changed to the media element, so repeating an action that leaves the state
/// as it was has no side effect. `progress` has two writers (time updates and
/// scrubbing) and the last write wins.
pub struct PlayerController<M: MediaElement> {
    media: M,
    state: PlayerState,
}

impl<M: MediaElement> PlayerController<M> {
    pub fn new(mut media: M, speed: PlaybackSpeed) -> Self {
        let state = PlayerState {
            speed,
            ..PlayerState::default()
        };
        media.set_playback_rate(speed.rate());
        media.set_muted(state.muted);
        Self { media, state }
    }

    fn commit(&mut self, next: PlayerState) {
        let prev = self.state;
        self.state = next;

        if prev.playing != next.playing {
            if next.playing {
                self.media.play();
            } else {
                self.media.pause();
            }
        }
        if prev.muted != next.muted {
            self.media.set_muted(next.muted);
        }
        if prev.speed != next.speed {
            self.media.set_playback_rate(next.speed.rate());
        }
    }

    /// Swap the media source. Playback position resets; speed and mute carry over.
    pub fn load(&mut self, source: &str) {
        log::info!("Loading video source {}", source);
        self.media.load(source);
        self.state.playing = false;
        self.state.progress = 0.0;
        self.media.set_playback_rate(self.state.speed.rate());
        self.media.set_muted(self.state.muted);
    }

    pub fn toggle_play(&mut self) {
        let next = PlayerState {
            playing: !self.state.playing,
            ..self.state
        };
        self.commit(next);
    }

    pub fn toggle_mute(&mut self) {
        let next = PlayerState {
            muted: !self.state.muted,
            ..self.state
        };
        self.commit(next);
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        let next = PlayerState { speed, ..self.state };
        self.commit(next);
    }

    /// Manual scrub to a percentage of the duration
    pub fn scrub(&mut self, percent: f64) {
        let percent = clamp_progress(percent);
        if let Some(duration) = self.known_duration() {
            self.media.set_current_time(percent / 100.0 * duration);
        }
        self.state.progress = percent;
    }

    /// Recompute progress from the media position
    pub fn on_time_update(&mut self) {
        self.state.progress = match self.known_duration() {
            Some(duration) => clamp_progress(self.media.current_time() / duration * 100.0),
            None => 0.0,
        };
    }

    /// Drain media events; returns errors for the reporter
    pub fn update(&mut self) -> Vec<ReviewError> {
        let mut errors = Vec::new();
        for event in self.media.poll_events() {
            match event {
                MediaEvent::Loaded { duration } => {
                    log::debug!("Media loaded, duration {:.2}s", duration);
                    self.on_time_update();
                }
                MediaEvent::TimeUpdate => self.on_time_update(),
                MediaEvent::Ended => {
                    self.on_time_update();
                    self.state.playing = false;
                }
                MediaEvent::Error(e) => {
                    self.state.playing = false;
                    errors.push(e);
                }
            }
        }
        errors
    }

    fn known_duration(&self) -> Option<f64> {
        self.media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn duration(&self) -> Option<f64> {
        self.known_duration()
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(String),
        Play,
        Pause,
        Seek(f64),
        Rate(f32),
        Muted(bool),
    }

    #[derive(Default)]
    struct FakeMedia {
        calls: Vec<Call>,
        current_time: f64,
        duration: Option<f64>,
        events: Vec<MediaEvent>,
    }

    impl MediaElement for FakeMedia {
        fn load(&mut self, source: &str) {
            self.calls.push(Call::Load(source.to_string()));
            self.current_time = 0.0;
        }
        fn play(&mut self) {
            self.calls.push(Call::Play);
        }
        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }
        fn current_time(&self) -> f64 {
            self.current_time
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.current_time = seconds;
            self.calls.push(Call::Seek(seconds));
        }
        fn duration(&self) -> Option<f64> {
            self.duration
        }
        fn set_playback_rate(&mut self, rate: f32) {
            self.calls.push(Call::Rate(rate));
        }
        fn set_muted(&mut self, muted: bool) {
            self.calls.push(Call::Muted(muted));
        }
        fn poll_events(&mut self) -> Vec<MediaEvent> {
            std::mem::take(&mut self.events)
        }
    }

    fn player_with_duration(duration: f64) -> PlayerController<FakeMedia> {
        let media = FakeMedia {
            duration: Some(duration),
            ..FakeMedia::default()
        };
        let mut player = PlayerController::new(media, PlaybackSpeed::Normal);
        player.media_mut().calls.clear();
        player
    }

    #[test]
    fn test_toggle_play_drives_media() {
        let mut player = player_with_duration(10.0);

        player.toggle_play();
        assert!(player.state().playing);
        player.toggle_play();
        assert!(!player.state().playing);

        assert_eq!(player.media().calls, vec![Call::Play, Call::Pause]);
    }

    #[test]
    fn test_mute_toggled_twice_restores_state() {
        let mut player = player_with_duration(10.0);

        player.toggle_mute();
        assert!(player.state().muted);
        player.toggle_mute();
        assert!(!player.state().muted);

        assert_eq!(player.media().calls, vec![Call::Muted(true), Call::Muted(false)]);
    }

    #[test]
    fn test_speed_selection_is_idempotent() {
        let mut player = player_with_duration(10.0);

        player.set_speed(PlaybackSpeed::Double);
        player.set_speed(PlaybackSpeed::Double);

        assert_eq!(player.state().speed, PlaybackSpeed::Double);
        assert_eq!(player.media().calls, vec![Call::Rate(2.0)]);
    }

    #[test]
    fn test_scrub_sets_current_time() {
        let mut player = player_with_duration(80.0);

        player.scrub(25.0);
        assert_eq!(player.state().progress, 25.0);
        assert_eq!(player.media().calls, vec![Call::Seek(20.0)]);
    }

    #[test]
    fn test_scrub_then_time_update_round_trip() {
        for duration in [1.0, 7.3, 60.0, 3599.9] {
            for percent in [0.0, 0.1, 12.5, 33.3, 50.0, 99.9, 100.0] {
                let mut player = player_with_duration(duration);
                player.scrub(percent);

                let expected_time = percent / 100.0 * duration;
                assert!((player.current_time() - expected_time).abs() < 1e-9);

                player.on_time_update();
                assert!((player.state().progress - percent).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_scrub_is_clamped() {
        let mut player = player_with_duration(10.0);

        player.scrub(150.0);
        assert_eq!(player.state().progress, 100.0);
        assert!((player.current_time() - 10.0).abs() < 1e-9);

        player.scrub(-5.0);
        assert_eq!(player.state().progress, 0.0);
    }

    #[test]
    fn test_time_update_without_duration() {
        let mut player = PlayerController::new(FakeMedia::default(), PlaybackSpeed::Normal);
        player.media_mut().current_time = 4.0;

        player.on_time_update();
        assert_eq!(player.state().progress, 0.0);

        player.scrub(40.0);
        assert_eq!(player.state().progress, 40.0);
        assert!(!player.media().calls.iter().any(|c| matches!(c, Call::Seek(_))));
    }

    #[test]
    fn test_time_update_follows_media() {
        let mut player = player_with_duration(200.0);
        player.media_mut().current_time = 50.0;
        player.media_mut().events.push(MediaEvent::TimeUpdate);

        let errors = player.update();
        assert!(errors.is_empty());
        assert_eq!(player.state().progress, 25.0);
    }

    #[test]
    fn test_last_write_wins() {
        let mut player = player_with_duration(100.0);
        player.media_mut().current_time = 10.0;
        player.on_time_update();
        assert_eq!(player.state().progress, 10.0);

        player.scrub(70.0);
        assert_eq!(player.state().progress, 70.0);

        player.media_mut().current_time = 71.0;
        player.on_time_update();
        assert_eq!(player.state().progress, 71.0);
    }

    #[test]
    fn test_ended_stops_playing() {
        let mut player = player_with_duration(10.0);
        player.toggle_play();
        player.media_mut().current_time = 10.0;
        player.media_mut().events.push(MediaEvent::Ended);

        player.update();
        assert!(!player.state().playing);
        assert_eq!(player.state().progress, 100.0);

        // Next toggle plays again rather than pausing
        player.toggle_play();
        assert_eq!(player.media().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn test_media_error_is_returned() {
        let mut player = player_with_duration(10.0);
        player.toggle_play();
        player.media_mut().events.push(MediaEvent::Error(ReviewError::Media("ffmpeg not found".to_string())));

        let errors = player.update();
        assert_eq!(errors, vec![ReviewError::Media("ffmpeg not found".to_string())]);
        assert!(!player.state().playing);
    }

    #[test]
    fn test_load_resets_position_and_keeps_preferences() {
        let mut player = player_with_duration(10.0);
        player.set_speed(PlaybackSpeed::Half);
        player.toggle_mute();
        player.toggle_play();
        player.scrub(60.0);
        player.media_mut().calls.clear();

        player.load("v2.mp4");

        let state = player.state();
        assert!(!state.playing);
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.speed, PlaybackSpeed::Half);
        assert!(state.muted);
        assert_eq!(
            player.media().calls,
            vec![Call::Load("v2.mp4".to_string()), Call::Rate(0.5), Call::Muted(true)]
        );
    }

    #[test]
    fn test_speed_labels_and_rates() {
        let labels: Vec<_> = PlaybackSpeed::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["0.50x", "1x", "1.25x", "2x"]);
        assert_eq!(PlaybackSpeed::from_rate(1.25), PlaybackSpeed::OneAndQuarter);
        assert_eq!(PlaybackSpeed::from_rate(1.9), PlaybackSpeed::Double);
        assert_eq!(PlaybackSpeed::from_rate(0.1), PlaybackSpeed::Half);
    }
}
