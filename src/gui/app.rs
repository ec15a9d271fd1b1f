use eframe::egui;
use std::time::Duration;
use crate::api::{ApiClient, ReviewLoader};
use crate::core::{step_frame, AppConfig, ErrorSource, ReviewSession, SessionAction, Severity};
use crate::gui::frame_panel::show_frame_info;
use crate::gui::seek_bar::SeekBarWidget;
use crate::hotkeys::{ShortcutAction, ShortcutId, ShortcutManager};
use crate::video::{ColorTrack, MediaController, MediaTools, PlaybackSpeed, PlayerController};

/// Things the user asked for while the panels were drawn; applied afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    SelectDevice(String),
    RetryDevices,
    Dismiss(ErrorSource),
    Scrub(f64),
    Shortcut(ShortcutAction),
}

pub struct VideoReviewApp {
    pub config: AppConfig,
    pub session: ReviewSession,
    pub loader: ReviewLoader,
    pub player: PlayerController<MediaController>,
    pub color_track: ColorTrack,
    pub seek_bar: SeekBarWidget,
    pub shortcuts: ShortcutManager,
    pub status_message: String,
    /// Write config changes to disk
    pub persist_config: bool,
}

impl VideoReviewApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::WHITE);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::load()?;
        log::info!("Using API at {}", config.api_base());

        let api = ApiClient::new(&config)?;
        let loader = ReviewLoader::new(api);

        let mut app = Self::with_parts(config, loader, true);
        app.start(&cc.egui_ctx);
        Ok(app)
    }

    pub fn with_parts(config: AppConfig, loader: ReviewLoader, persist_config: bool) -> Self {
        let media = MediaController::new(MediaTools {
            ffmpeg: config.ffmpeg_command(),
            ffprobe: config.ffprobe_command(),
        });
        let player = PlayerController::new(media, PlaybackSpeed::from_rate(config.default_speed));
        let session = ReviewSession::new(config.last_device.clone());

        Self {
            config,
            session,
            loader,
            player,
            color_track: ColorTrack::default(),
            seek_bar: SeekBarWidget::new(),
            shortcuts: ShortcutManager,
            status_message: String::new(),
            persist_config,
        }
    }

    /// Kick off the device list load
    pub fn start(&mut self, ctx: &egui::Context) {
        self.status_message = "Loading devices...".to_string();
        let actions = self.session.load_devices();
        self.perform(ctx, actions);
    }

    pub fn perform(&mut self, ctx: &egui::Context, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Load(request) => self.loader.request(request),
                SessionAction::LoadVideo(source) => {
                    self.player.load(&source);
                    self.status_message = format!("Loading {}", source);
                }
                SessionAction::PaintColorTrack => {
                    if let Some(metadata) = self.session.metadata() {
                        self.color_track.paint(
                            ctx,
                            metadata,
                            self.config.color_strip_width,
                            self.config.color_strip_height,
                        );
                    }
                }
                SessionAction::ClearColorTrack => self.color_track.clear(),
                SessionAction::RememberDevice(device) => self.remember_device(device),
            }
        }
    }

    fn remember_device(&mut self, device: String) {
        if self.config.last_device.as_deref() == Some(device.as_str()) {
            return;
        }
        self.status_message = format!("Showing {}", device);
        self.config.last_device = Some(device);

        if self.persist_config {
            if let Err(e) = self.config.save() {
                log::warn!("Failed to save config: {}", e);
            }
        }
    }

    pub fn process_load_events(&mut self, ctx: &egui::Context) {
        for event in self.loader.completed() {
            let actions = self.session.apply(event);
            self.perform(ctx, actions);
        }
    }

    fn process_player_events(&mut self) {
        for error in self.player.update() {
            log::error!("Playback error: {}", error);
            self.session.report_playback_error(error);
        }
    }

    pub fn handle_command(&mut self, ctx: &egui::Context, command: UiCommand) {
        match command {
            UiCommand::SelectDevice(device) => {
                let actions = self.session.select_device(&device);
                self.perform(ctx, actions);
            }
            UiCommand::RetryDevices => {
                self.session.errors.clear(ErrorSource::DeviceList);
                self.start(ctx);
            }
            UiCommand::Dismiss(source) => self.session.errors.dismiss(source),
            UiCommand::Scrub(percent) => self.player.scrub(percent),
            UiCommand::Shortcut(action) => self.apply_shortcut(action),
        }
    }

    pub fn apply_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::TogglePlay => self.player.toggle_play(),
            ShortcutAction::ToggleMute => self.player.toggle_mute(),
            ShortcutAction::SetSpeed(speed) => self.player.set_speed(speed),
            ShortcutAction::StepFrame(delta) => {
                // Pause first so the frame stays on screen
                if self.player.state().playing {
                    self.player.toggle_play();
                }
                let count = self.session.metadata().map(|m| m.frame_count()).unwrap_or(0);
                if let Some(target) = step_frame(count, self.player.state().progress, delta) {
                    self.player.scrub(target);
                }
            }
        }
    }

    fn show_error_banners(&self, ui: &mut egui::Ui, commands: &mut Vec<UiCommand>) {
        for report in self.session.errors.reports() {
            let fill = match report.severity {
                Severity::Session => egui::Color32::from_rgb(120, 30, 30),
                Severity::Feature => egui::Color32::from_rgb(110, 80, 20),
            };

            egui::Frame::none()
                .fill(fill)
                .rounding(egui::Rounding::same(4.0))
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "{} ({}): {}",
                            report.source.display_text(),
                            report.occurred_at.format("%H:%M:%S"),
                            report.message()
                        ));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            match report.severity {
                                Severity::Session => {
                                    if ui.button("Retry").clicked() {
                                        commands.push(UiCommand::RetryDevices);
                                    }
                                }
                                Severity::Feature => {
                                    if ui.button("Dismiss").clicked() {
                                        commands.push(UiCommand::Dismiss(report.source));
                                    }
                                }
                            }
                        });
                    });
                });
            ui.add_space(2.0);
        }
    }

    fn show_device_select(&self, ui: &mut egui::Ui, commands: &mut Vec<UiCommand>) {
        ui.label("Device:");
        let selected = self.session.selected_device();

        ui.add_enabled_ui(!self.session.is_loading_devices(), |ui| {
            egui::ComboBox::from_id_source("device_select")
                .selected_text(selected.unwrap_or("Select device"))
                .width(200.0)
                .show_ui(ui, |ui| {
                    for device in self.session.devices() {
                        let is_selected = selected == Some(device.as_str());
                        if ui.selectable_label(is_selected, device).clicked() && !is_selected {
                            commands.push(UiCommand::SelectDevice(device.clone()));
                        }
                    }
                });
        });

        if self.session.is_loading() || self.player.media().state().is_busy() {
            ui.spinner();
        }
    }

    fn show_video(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let available = ui.available_size();
        let aspect = 854.0 / 480.0;
        let width = available.x.min((available.y - 8.0).max(0.0) * aspect);
        let size = egui::Vec2::new(width, width / aspect);

        let texture_id = self.player.media_mut().frame_texture(ctx).map(|t| t.id());
        ui.vertical_centered(|ui| match texture_id {
            Some(id) => {
                ui.image((id, size));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, egui::Rounding::same(4.0), egui::Color32::BLACK);
                let text = if self.session.video_source().is_some() {
                    self.player.media().state().display_text().to_string()
                } else {
                    "No video loaded".to_string()
                };
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, commands: &mut Vec<UiCommand>) {
        let state = *self.player.state();
        let has_video = self.session.video_source().is_some();

        ui.horizontal(|ui| {
            ui.add_enabled_ui(has_video, |ui| {
                if ui.button(if state.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    commands.push(UiCommand::Shortcut(ShortcutAction::TogglePlay));
                }
            });

            if ui.button("⏪ Frame").clicked() {
                commands.push(UiCommand::Shortcut(ShortcutAction::StepFrame(-1)));
            }
            if ui.button("Frame ⏩").clicked() {
                commands.push(UiCommand::Shortcut(ShortcutAction::StepFrame(1)));
            }

            ui.separator();

            ui.label("Speed:");
            egui::ComboBox::from_id_source("speed_select")
                .selected_text(state.speed.label())
                .show_ui(ui, |ui| {
                    for speed in PlaybackSpeed::ALL {
                        if ui.selectable_label(state.speed == speed, speed.label()).clicked() {
                            commands.push(UiCommand::Shortcut(ShortcutAction::SetSpeed(speed)));
                        }
                    }
                });

            if ui.button(if state.muted { "🔇 Unmute" } else { "🔊 Mute" }).clicked() {
                commands.push(UiCommand::Shortcut(ShortcutAction::ToggleMute));
            }
        });

        ui.add_space(4.0);

        if let Some(percent) = self.seek_bar.show(
            ui,
            state.progress,
            self.player.duration(),
            self.color_track.texture(),
            self.config.color_strip_height as f32,
        ) {
            commands.push(UiCommand::Scrub(percent));
        }
    }
}

impl eframe::App for VideoReviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_load_events(ctx);
        self.process_player_events();

        let mut commands: Vec<UiCommand> = self
            .shortcuts
            .process_events(ctx)
            .into_iter()
            .map(UiCommand::Shortcut)
            .collect();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Video Review");
                ui.separator();
                self.show_device_select(ui, &mut commands);
            });
            if !self.session.errors.is_empty() {
                ui.add_space(4.0);
                self.show_error_banners(ui, &mut commands);
            }
            ui.add_space(2.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Status:");
                ui.label(self.player.media().state().display_text());
                if !self.status_message.is_empty() {
                    ui.separator();
                    ui.label(&self.status_message);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let hints: Vec<&str> = ShortcutId::ALL.iter().map(|id| id.hint()).collect();
                    ui.weak(hints.join("  "));
                });
            });
        });

        egui::SidePanel::right("frame_info")
            .default_width(240.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                let info = self.session.frame_info(self.player.state().progress);
                let bounding_box = self
                    .session
                    .metadata()
                    .map(|m| m.bounding_box_label())
                    .unwrap_or_default();
                show_frame_info(ui, &info, &bounding_box);
            });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_controls(ui, &mut commands);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_video(ui, ctx);
        });

        for command in commands {
            self.handle_command(ctx, command);
        }

        if self.player.state().playing || self.session.is_loading() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
