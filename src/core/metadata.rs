use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::ReviewError;

/// Average color of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Per-frame record as produced by the metadata pipeline
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FrameRecord {
    #[serde(rename = "avgR")]
    pub avg_r: u8,
    #[serde(rename = "avgG")]
    pub avg_g: u8,
    #[serde(rename = "avgB")]
    pub avg_b: u8,
    #[serde(rename = "histDiff")]
    pub hist_diff: f64,
}

impl FrameRecord {
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.avg_r, self.avg_g, self.avg_b)
    }
}

#[derive(Debug, Deserialize)]
struct RawFrameMetadata {
    #[serde(rename = "RoI")]
    roi: Vec<f64>,
    frame_data: BTreeMap<usize, FrameRecord>,
}

/// Metadata for one video. Immutable once loaded; a new device selection
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFrameMetadata")]
pub struct FrameMetadata {
    roi: Vec<f64>,
    frames: Vec<FrameRecord>,
}

impl TryFrom<RawFrameMetadata> for FrameMetadata {
    type Error = String;

    fn try_from(raw: RawFrameMetadata) -> Result<Self, Self::Error> {
        let mut frames = Vec::with_capacity(raw.frame_data.len());
        for (expected, (index, record)) in raw.frame_data.into_iter().enumerate() {
            if index != expected {
                return Err(format!(
                    "frame_data keys must be contiguous from 0, found {} where {} was expected",
                    index, expected
                ));
            }
            frames.push(record);
        }

        Ok(Self { roi: raw.roi, frames })
    }
}

impl FrameMetadata {
    pub fn new(roi: Vec<f64>, frames: Vec<FrameRecord>) -> Self {
        Self { roi, frames }
    }

    pub fn from_json(text: &str) -> Result<Self, ReviewError> {
        serde_json::from_str(text).map_err(ReviewError::from)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&FrameRecord> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Bounding box coordinates joined with commas, e.g. "1,2,3,4"
    pub fn bounding_box_label(&self) -> String {
        self.roi
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
