use crate::core::{FrameMetadata, Rgb};

/// What the frame information panel shows for the current position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub index: usize,
    pub rgb: Rgb,
    pub histogram: f64,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            index: 0,
            rgb: Rgb::BLACK,
            histogram: 0.0,
        }
    }
}

/// Clamp a progress percentage into [0, 100]; non-finite values map to 0.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Nearest frame for a playback percentage, clamped to the last frame.
pub fn frame_index(frame_count: usize, progress: f64) -> Option<usize> {
    if frame_count == 0 {
        return None;
    }

    let progress = clamp_progress(progress);
    let index = (frame_count as f64 * progress / 100.0).round() as usize;
    Some(index.min(frame_count - 1))
}

/// Frame information at `progress`, or the black default without metadata.
pub fn frame_info_at(metadata: Option<&FrameMetadata>, progress: f64) -> FrameInfo {
    let Some(metadata) = metadata else {
        return FrameInfo::default();
    };

    frame_index(metadata.frame_count(), progress)
        .and_then(|index| {
            metadata.frame(index).map(|record| FrameInfo {
                index,
                rgb: record.rgb(),
                histogram: record.hist_diff,
            })
        })
        .unwrap_or_default()
}

/// Progress of the frame `delta` frames away from the one at `progress`.
pub fn step_frame(frame_count: usize, progress: f64, delta: i64) -> Option<f64> {
    let current = frame_index(frame_count, progress)? as i64;
    let target = (current + delta).clamp(0, frame_count as i64 - 1);
    Some(target as f64 / frame_count as f64 * 100.0)
}
