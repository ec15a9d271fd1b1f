#[cfg(test)]
mod tests {

    use std::path::PathBuf;
    use std::time::Duration;
    use crate::core::AppConfig;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://mockapi.lumi.systems");
        assert_eq!(config.user_id, 100);
        assert_eq!(config.org_id, "Lumi");
        assert_eq!(config.default_speed, 1.0);
        assert_eq!(config.color_strip_height, 50);
        assert!(config.last_device.is_none());
    }

    #[test]
    fn test_app_config_serialization() {
        let mut config = AppConfig::default();
        config.last_device = Some("d2".to_string());
        config.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        config.request_timeout_secs = 5;

        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        let deserialized: AppConfig = serde_json::from_str(&serialized).expect("Failed to deserialize config");

        assert_eq!(config.last_device, deserialized.last_device);
        assert_eq!(config.ffmpeg_path, deserialized.ffmpeg_path);
        assert_eq!(config.request_timeout_secs, deserialized.request_timeout_secs);
    }

    #[test]
    fn test_config_missing_fields_take_defaults() {
        let partial_json = r#"{
            "api_base_url": "http://localhost:8080/",
            "org_id": "Acme"
        }"#;

        let config: AppConfig = serde_json::from_str(partial_json).expect("Failed to parse partial config");

        assert_eq!(config.org_id, "Acme");
        assert_eq!(config.user_id, 100);
        assert_eq!(config.color_strip_width, 1024);
        assert_eq!(config.api_base(), "http://localhost:8080");
    }

    #[test]
    fn test_tool_paths() {
        let mut config = AppConfig::default();
        assert_eq!(config.ffmpeg_command(), PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_command(), PathBuf::from("ffprobe"));

        config.ffprobe_path = Some(PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(config.ffprobe_command(), PathBuf::from("/usr/local/bin/ffprobe"));
    }

    #[test]
    fn test_request_timeout_is_never_zero() {
        let mut config = AppConfig::default();
        config.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
