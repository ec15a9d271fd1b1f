use eframe::egui;

/// Seek bar over the color strip. Progress is a percentage in [0, 100].
pub struct SeekBarWidget {
    pub is_scrubbing: bool,
    last_scrub: Option<f64>,
}

impl SeekBarWidget {
    pub fn new() -> Self {
        Self {
            is_scrubbing: false,
            last_scrub: None,
        }
    }

    /// Scrub target for a pointer interaction. A drag that has not moved since
    /// the last frame yields nothing, so a held pointer does not re-seek.
    pub fn scrub_target(&mut self, percent: f64, dragging: bool) -> Option<f64> {
        if dragging {
            if self.is_scrubbing && self.last_scrub == Some(percent) {
                return None;
            }
            self.is_scrubbing = true;
            self.last_scrub = Some(percent);
        }
        Some(percent)
    }

    pub fn end_scrub(&mut self) {
        self.is_scrubbing = false;
        self.last_scrub = None;
    }

    /// Where the marker sits: under the pointer while dragging, else at progress
    pub fn marker_progress(&self, progress: f64) -> f64 {
        match (self.is_scrubbing, self.last_scrub) {
            (true, Some(percent)) => percent,
            _ => progress,
        }
    }

    /// Draws the bar and returns the scrub target when the user clicks or drags
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        progress: f64,
        duration: Option<f64>,
        color_track: Option<&egui::TextureHandle>,
        strip_height: f32,
    ) -> Option<f64> {
        let available_width = ui.available_width() - 20.0;
        let bar_height = strip_height + 24.0;

        let (rect, response) = ui.allocate_exact_size(
            egui::Vec2::new(available_width.max(40.0), bar_height),
            egui::Sense::click_and_drag(),
        );

        let track_rect = egui::Rect::from_min_size(
            rect.min + egui::Vec2::new(10.0, 4.0),
            egui::Vec2::new(rect.width() - 20.0, strip_height),
        );

        let mut scrub_to = None;
        if response.clicked() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let percent = Self::percent_at(pos.x, track_rect.min.x, track_rect.width());
                scrub_to = self.scrub_target(percent, response.dragged());
            }
        }
        if response.drag_stopped() {
            self.end_scrub();
        }

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();

            painter.rect_filled(
                rect,
                egui::Rounding::same(4.0),
                ui.visuals().extreme_bg_color,
            );

            // Color strip, or an empty track until metadata arrives
            match color_track {
                Some(texture) => {
                    painter.image(
                        texture.id(),
                        track_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                None => {
                    painter.rect_filled(track_rect, egui::Rounding::same(2.0), egui::Color32::BLACK);
                }
            }
            painter.rect_stroke(
                track_rect,
                egui::Rounding::same(2.0),
                egui::Stroke::new(1.0, ui.visuals().weak_text_color()),
            );

            // Tracker marker at the current progress
            let shown = scrub_to.unwrap_or_else(|| self.marker_progress(progress));
            let marker_x = Self::marker_x(shown, track_rect.min.x, track_rect.width());
            painter.line_segment(
                [egui::Pos2::new(marker_x, track_rect.min.y - 2.0), egui::Pos2::new(marker_x, track_rect.max.y + 2.0)],
                egui::Stroke::new(2.0, egui::Color32::WHITE),
            );
            let playhead_rect = egui::Rect::from_center_size(
                egui::Pos2::new(marker_x, track_rect.max.y + 4.0),
                egui::Vec2::new(10.0, 6.0),
            );
            painter.rect_filled(playhead_rect, egui::Rounding::same(2.0), egui::Color32::RED);

            let label = match duration {
                Some(duration) => format!(
                    "{} / {}",
                    Self::format_time(shown / 100.0 * duration),
                    Self::format_time(duration)
                ),
                None => "--:-- / --:--".to_string(),
            };
            painter.text(
                rect.max - egui::Vec2::new(10.0, 2.0),
                egui::Align2::RIGHT_BOTTOM,
                label,
                egui::FontId::monospace(12.0),
                ui.visuals().text_color(),
            );
        }

        scrub_to
    }

    /// Pointer x to progress percent, clamped to the track
    pub fn percent_at(x: f32, track_left: f32, track_width: f32) -> f64 {
        if track_width <= 0.0 {
            return 0.0;
        }
        (((x - track_left) / track_width) as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn marker_x(progress: f64, track_left: f32, track_width: f32) -> f32 {
        track_left + (progress.clamp(0.0, 100.0) / 100.0) as f32 * track_width
    }

    pub fn format_time(seconds: f64) -> String {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let mins = (seconds / 60.0) as u32;
        let secs = seconds % 60.0;
        format!("{}:{:04.1}", mins, secs)
    }
}

impl Default for SeekBarWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_at_track_positions() {
        assert_eq!(SeekBarWidget::percent_at(10.0, 10.0, 200.0), 0.0);
        assert_eq!(SeekBarWidget::percent_at(110.0, 10.0, 200.0), 50.0);
        assert_eq!(SeekBarWidget::percent_at(210.0, 10.0, 200.0), 100.0);
    }

    #[test]
    fn test_percent_at_clamps_outside_track() {
        assert_eq!(SeekBarWidget::percent_at(-50.0, 10.0, 200.0), 0.0);
        assert_eq!(SeekBarWidget::percent_at(500.0, 10.0, 200.0), 100.0);
        assert_eq!(SeekBarWidget::percent_at(50.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_marker_follows_progress() {
        assert_eq!(SeekBarWidget::marker_x(0.0, 10.0, 200.0), 10.0);
        assert_eq!(SeekBarWidget::marker_x(25.0, 10.0, 200.0), 60.0);
        assert_eq!(SeekBarWidget::marker_x(150.0, 10.0, 200.0), 210.0);
    }

    #[test]
    fn test_held_drag_does_not_repeat_scrub() {
        let mut bar = SeekBarWidget::new();

        assert_eq!(bar.scrub_target(40.0, true), Some(40.0));
        assert!(bar.is_scrubbing);
        assert_eq!(bar.scrub_target(40.0, true), None);
        assert_eq!(bar.scrub_target(45.0, true), Some(45.0));
        assert_eq!(bar.marker_progress(10.0), 45.0);

        bar.end_scrub();
        assert!(!bar.is_scrubbing);
        assert_eq!(bar.marker_progress(10.0), 10.0);
        assert_eq!(bar.scrub_target(45.0, true), Some(45.0));
    }

    #[test]
    fn test_clicks_always_scrub() {
        let mut bar = SeekBarWidget::new();

        assert_eq!(bar.scrub_target(20.0, false), Some(20.0));
        assert_eq!(bar.scrub_target(20.0, false), Some(20.0));
        assert!(!bar.is_scrubbing);
        assert_eq!(bar.marker_progress(5.0), 5.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(SeekBarWidget::format_time(0.0), "0:00.0");
        assert_eq!(SeekBarWidget::format_time(75.5), "1:15.5");
        assert_eq!(SeekBarWidget::format_time(f64::NAN), "0:00.0");
    }
}
