#[cfg(test)]
mod tests {

    use eframe::egui;
    use std::time::{Duration, Instant};
    use crate::api::{LoadEvent, LoadRequest, ReviewApi, ReviewLoader, VideoSources};
    use crate::core::{AppConfig, ErrorSource, FrameMetadata, FrameRecord, ReviewError, SessionAction};
    use crate::gui::app::{UiCommand, VideoReviewApp};
    use crate::hotkeys::ShortcutAction;
    use crate::video::PlaybackSpeed;

    struct FakeApi;

    impl ReviewApi for FakeApi {
        async fn get_devices(&self) -> Result<Vec<String>, ReviewError> {
            Ok(vec!["d1".to_string(), "d2".to_string()])
        }

        async fn get_device_data(&self, device_id: &str) -> Result<VideoSources, ReviewError> {
            Ok(VideoSources {
                video_url: format!("/nonexistent/{}.mp4", device_id),
                metadata_url: format!("/nonexistent/{}.json", device_id),
            })
        }

        async fn get_frame_metadata(&self, _url: &str) -> Result<FrameMetadata, ReviewError> {
            Ok(sample_metadata())
        }
    }

    fn sample_metadata() -> FrameMetadata {
        FrameMetadata::new(
            vec![1.0, 2.0, 3.0, 4.0],
            vec![
                FrameRecord { avg_r: 10, avg_g: 20, avg_b: 30, hist_diff: 0.1 },
                FrameRecord { avg_r: 200, avg_g: 0, avg_b: 0, hist_diff: 0.9 },
            ],
        )
    }

    // Test helper: an app that never touches the real config file or network
    fn create_test_app() -> VideoReviewApp {
        let config = AppConfig {
            ffmpeg_path: Some("/nonexistent/ffmpeg".into()),
            ffprobe_path: Some("/nonexistent/ffprobe".into()),
            ..AppConfig::default()
        };
        VideoReviewApp::with_parts(config, ReviewLoader::new(FakeApi), false)
    }

    /// Feed device list, d1 data and metadata straight into the session
    fn load_d1(app: &mut VideoReviewApp, ctx: &egui::Context) {
        let actions = app.session.apply(LoadEvent::Devices(Ok(vec!["d1".to_string(), "d2".to_string()])));
        app.perform(ctx, actions);
        let generation = app.session.generation();
        let actions = app.session.apply(LoadEvent::DeviceData {
            generation,
            device: "d1".to_string(),
            result: Ok(VideoSources {
                video_url: "/nonexistent/d1.mp4".to_string(),
                metadata_url: "/nonexistent/d1.json".to_string(),
            }),
        });
        app.perform(ctx, actions);
        let actions = app.session.apply(LoadEvent::Metadata {
            generation,
            url: "/nonexistent/d1.json".to_string(),
            result: Ok(sample_metadata()),
        });
        app.perform(ctx, actions);
    }

    #[test]
    fn test_app_initialization() {
        let app = create_test_app();

        assert!(!app.persist_config);
        assert!(app.color_track.texture().is_none());
        assert!(app.session.devices().is_empty());
        assert_eq!(app.player.state().speed, PlaybackSpeed::Normal);
        assert!(!app.player.state().playing);
    }

    #[test]
    fn test_default_speed_from_config() {
        let config = AppConfig {
            default_speed: 2.0,
            ffmpeg_path: Some("/nonexistent/ffmpeg".into()),
            ffprobe_path: Some("/nonexistent/ffprobe".into()),
            ..AppConfig::default()
        };
        let app = VideoReviewApp::with_parts(config, ReviewLoader::new(FakeApi), false);
        assert_eq!(app.player.state().speed, PlaybackSpeed::Double);
    }

    #[test]
    fn test_metadata_paints_and_new_device_clears_color_track() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();
        load_d1(&mut app, &ctx);

        assert!(app.color_track.texture().is_some());
        assert_eq!(app.session.video_source(), Some("/nonexistent/d1.mp4"));

        app.perform(&ctx, vec![SessionAction::ClearColorTrack]);
        assert!(app.color_track.texture().is_none());
    }

    #[test]
    fn test_displayed_device_is_remembered() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();
        load_d1(&mut app, &ctx);

        assert_eq!(app.config.last_device.as_deref(), Some("d1"));
    }

    #[test]
    fn test_step_frame_moves_progress_by_one_frame() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();
        load_d1(&mut app, &ctx);

        app.apply_shortcut(ShortcutAction::StepFrame(1));
        assert_eq!(app.player.state().progress, 50.0);
        assert_eq!(app.session.frame_info(app.player.state().progress).index, 1);

        app.apply_shortcut(ShortcutAction::StepFrame(1));
        assert_eq!(app.player.state().progress, 50.0);

        app.apply_shortcut(ShortcutAction::StepFrame(-1));
        assert_eq!(app.player.state().progress, 0.0);
    }

    #[test]
    fn test_step_frame_without_metadata_is_ignored() {
        let mut app = create_test_app();
        app.apply_shortcut(ShortcutAction::StepFrame(1));
        assert_eq!(app.player.state().progress, 0.0);
    }

    #[test]
    fn test_speed_and_mute_shortcuts() {
        let mut app = create_test_app();

        app.apply_shortcut(ShortcutAction::SetSpeed(PlaybackSpeed::Half));
        assert_eq!(app.player.state().speed, PlaybackSpeed::Half);

        app.apply_shortcut(ShortcutAction::ToggleMute);
        assert!(app.player.state().muted);
        app.apply_shortcut(ShortcutAction::ToggleMute);
        assert!(!app.player.state().muted);
    }

    #[test]
    fn test_dismiss_and_retry_commands() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();

        app.session.apply(LoadEvent::Devices(Err(ReviewError::Network("timed out".to_string()))));
        assert!(app.session.errors.has_session_error());

        app.handle_command(&ctx, UiCommand::RetryDevices);
        assert!(!app.session.errors.has_session_error());
        assert!(app.session.is_loading_devices());

        app.session.report_playback_error(ReviewError::Media("decoder failed".to_string()));
        app.handle_command(&ctx, UiCommand::Dismiss(ErrorSource::Playback));
        assert!(app.session.errors.get(ErrorSource::Playback).is_none());
    }

    #[test]
    fn test_startup_loads_devices_through_loader() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();
        app.start(&ctx);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session.devices().is_empty() && Instant::now() < deadline {
            app.process_load_events(&ctx);
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(app.session.devices(), &["d1".to_string(), "d2".to_string()]);
        assert_eq!(app.session.selected_device(), Some("d1"));
    }

    #[test]
    fn test_select_device_issues_request() {
        let ctx = egui::Context::default();
        let mut app = create_test_app();
        load_d1(&mut app, &ctx);

        let before = app.session.generation();
        app.handle_command(&ctx, UiCommand::SelectDevice("d2".to_string()));
        assert_eq!(app.session.generation(), before + 1);
        assert_eq!(app.session.selected_device(), Some("d2"));
        assert_eq!(
            app.session.select_device("d2"),
            vec![SessionAction::Load(LoadRequest::DeviceData { generation: before + 2, device: "d2".to_string() })]
        );
    }
}
