use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub duration: f64,
    pub frame_rate: f64,
    pub has_audio: bool,
}

pub struct MediaProbe;

impl MediaProbe {
    const DEFAULT_FRAME_RATE: f64 = 30.0;

    /// Probe a file or URL with ffprobe
    pub fn probe(ffprobe: &Path, source: &str) -> anyhow::Result<MediaInfo> {
        let output = Command::new(ffprobe)
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(source)
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to run {}: {}", ffprobe.display(), e))?;

        if !output.status.success() {
            return Err(anyhow::anyhow!("ffprobe failed for {}", source));
        }

        let json_str = String::from_utf8(output.stdout)?;
        Self::parse(&json_str)
    }

    pub fn parse(json_str: &str) -> anyhow::Result<MediaInfo> {
        let info: serde_json::Value = serde_json::from_str(json_str)?;

        let duration = info["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| anyhow::anyhow!("Media has no usable duration"))?;

        let empty_vec = vec![];
        let streams = info["streams"].as_array().unwrap_or(&empty_vec);

        let frame_rate = streams
            .iter()
            .find(|s| s["codec_type"].as_str() == Some("video"))
            .and_then(|s| s["r_frame_rate"].as_str())
            .map(Self::parse_frame_rate)
            .unwrap_or(Self::DEFAULT_FRAME_RATE);

        let has_audio = streams
            .iter()
            .any(|s| s["codec_type"].as_str() == Some("audio"));

        Ok(MediaInfo {
            duration,
            frame_rate,
            has_audio,
        })
    }

    /// "30000/1001" or "25" to frames per second
    pub fn parse_frame_rate(fps_str: &str) -> f64 {
        let fps = if fps_str.contains('/') {
            let parts: Vec<&str> = fps_str.split('/').collect();
            let num: f64 = parts.first().and_then(|s| s.trim().parse().ok()).unwrap_or(Self::DEFAULT_FRAME_RATE);
            let den: f64 = parts.get(1).and_then(|s| s.trim().parse().ok()).unwrap_or(1.0);
            if den != 0.0 { num / den } else { Self::DEFAULT_FRAME_RATE }
        } else {
            fps_str.trim().parse().unwrap_or(Self::DEFAULT_FRAME_RATE)
        };

        if fps.is_finite() && fps > 0.0 {
            fps.clamp(1.0, 1000.0)
        } else {
            Self::DEFAULT_FRAME_RATE
        }
    }
}
