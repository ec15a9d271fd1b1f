use eframe::egui;
use crate::core::FrameInfo;

/// Read-only rows of the frame information panel
pub fn frame_info_rows(info: &FrameInfo, bounding_box: &str) -> [(&'static str, String); 4] {
    [
        ("Frame Number", info.index.to_string()),
        ("Bounding Box", bounding_box.to_string()),
        ("Histogram", info.histogram.to_string()),
        ("RGB", info.rgb.to_string()),
    ]
}

pub fn show_frame_info(ui: &mut egui::Ui, info: &FrameInfo, bounding_box: &str) {
    ui.heading("Frame Information");
    ui.add_space(4.0);

    egui::Grid::new("frame_info_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for (label, value) in frame_info_rows(info, bounding_box) {
                ui.label(label);
                ui.monospace(value);
                ui.end_row();
            }
        });

    ui.add_space(8.0);

    // Swatch of the frame's average color
    let (rect, _) = ui.allocate_exact_size(egui::Vec2::new(64.0, 32.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, egui::Rounding::same(4.0), info.rgb.to_color32());
    ui.painter().rect_stroke(
        rect,
        egui::Rounding::same(4.0),
        egui::Stroke::new(1.0, ui.visuals().weak_text_color()),
    );
}
