use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use image::{Rgb as Pixel, RgbImage};

use crate::core::{FrameMetadata, Rgb};

/// Gradient stop: relative offset in [0, 1) and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgb,
}

/// One stop per frame at `index / frame_count`
pub fn color_stops(metadata: &FrameMetadata) -> Vec<ColorStop> {
    let count = metadata.frame_count();
    metadata
        .frames()
        .iter()
        .enumerate()
        .map(|(index, record)| ColorStop {
            offset: index as f64 / count as f64,
            color: record.rgb(),
        })
        .collect()
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Color of a linear gradient at `t`. The first color holds before the first
/// stop and the last color after the last one.
pub fn sample_gradient(stops: &[ColorStop], t: f64) -> Rgb {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgb::BLACK,
    };

    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if t >= from.offset && t <= to.offset {
            let span = to.offset - from.offset;
            if span <= 0.0 {
                return to.color;
            }
            let local = (t - from.offset) / span;
            return Rgb::new(
                lerp(from.color.r, to.color.r, local),
                lerp(from.color.g, to.color.g, local),
                lerp(from.color.b, to.color.b, local),
            );
        }
    }

    last.color
}

/// Rasterise the strip for a metadata load. Every row is identical; pixels are
/// sampled at their horizontal center.
pub fn render(metadata: &FrameMetadata, width: u32, height: u32) -> RgbImage {
    let width = width.max(1);
    let height = height.max(1);
    let stops = color_stops(metadata);

    let row: Vec<Rgb> = (0..width)
        .map(|x| sample_gradient(&stops, (x as f64 + 0.5) / width as f64))
        .collect();

    RgbImage::from_fn(width, height, |x, _| {
        let c = row[x as usize];
        Pixel([c.r, c.g, c.b])
    })
}

/// Seek-bar background texture, painted once per metadata load
#[derive(Default)]
pub struct ColorTrack {
    texture: Option<TextureHandle>,
}

impl ColorTrack {
    pub fn paint(&mut self, ctx: &Context, metadata: &FrameMetadata, width: u32, height: u32) {
        let strip = render(metadata, width, height);
        let image = ColorImage::from_rgb(
            [strip.width() as usize, strip.height() as usize],
            strip.as_raw(),
        );

        log::debug!("Painting color track for {} frames", metadata.frame_count());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("color_track", image, TextureOptions::LINEAR)),
        }
    }

    pub fn clear(&mut self) {
        self.texture = None;
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameRecord;

    fn record(r: u8, g: u8, b: u8) -> FrameRecord {
        FrameRecord { avg_r: r, avg_g: g, avg_b: b, hist_diff: 0.0 }
    }

    #[test]
    fn test_stop_offsets() {
        let metadata = FrameMetadata::new(vec![], vec![record(0, 0, 0), record(1, 1, 1), record(2, 2, 2), record(3, 3, 3)]);
        let offsets: Vec<f64> = color_stops(&metadata).iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_single_frame_fills_strip() {
        let metadata = FrameMetadata::new(vec![], vec![record(10, 20, 30)]);
        let strip = render(&metadata, 8, 3);

        assert_eq!(strip.dimensions(), (8, 3));
        assert!(strip.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn test_two_frames_blend_then_hold_last_color() {
        let metadata = FrameMetadata::new(vec![], vec![record(255, 0, 0), record(0, 0, 255)]);
        let strip = render(&metadata, 4, 1);

        assert_eq!(strip.get_pixel(0, 0).0, [191, 0, 64]);
        assert_eq!(strip.get_pixel(1, 0).0, [64, 0, 191]);
        // Past the last stop at 0.5
        assert_eq!(strip.get_pixel(2, 0).0, [0, 0, 255]);
        assert_eq!(strip.get_pixel(3, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_empty_metadata_is_black() {
        let metadata = FrameMetadata::new(vec![], vec![]);
        let strip = render(&metadata, 4, 2);
        assert!(strip.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let metadata = FrameMetadata::new(vec![], vec![record(1, 2, 3)]);
        assert_eq!(render(&metadata, 0, 0).dimensions(), (1, 1));
    }

    #[test]
    fn test_sample_before_first_stop() {
        let stops = vec![
            ColorStop { offset: 0.2, color: Rgb::new(5, 5, 5) },
            ColorStop { offset: 0.6, color: Rgb::new(9, 9, 9) },
        ];
        assert_eq!(sample_gradient(&stops, 0.0), Rgb::new(5, 5, 5));
        assert_eq!(sample_gradient(&stops, 0.4), Rgb::new(7, 7, 7));
        assert_eq!(sample_gradient(&[], 0.5), Rgb::BLACK);
    }
}
