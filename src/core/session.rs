use crate::api::{LoadEvent, LoadRequest, VideoSources};
use crate::core::{frame_info_at, ErrorReporter, ErrorSource, FrameInfo, FrameMetadata, ReviewError};

/// Side effects the UI performs after the session changes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Load(LoadRequest),
    /// Swap the player's media source
    LoadVideo(String),
    /// New metadata arrived; repaint the color strip once
    PaintColorTrack,
    /// Metadata was dropped with the old video
    ClearColorTrack,
    /// Remember the displayed device for the next run
    RememberDevice(String),
}

/// All loaded review state. Device data from a superseded selection is
/// dropped by comparing its generation with the current one; metadata is
/// checked against the generation of the device data on screen.
#[derive(Debug, Default)]
pub struct ReviewSession {
    devices: Vec<String>,
    displayed_device: Option<String>,
    pending_device: Option<String>,
    preferred_device: Option<String>,
    generation: u64,
    /// Generation of the device data currently displayed
    displayed_generation: u64,
    video_source: Option<String>,
    metadata: Option<FrameMetadata>,
    loading_devices: bool,
    loading_metadata: bool,
    pub errors: ErrorReporter,
}

impl ReviewSession {
    pub fn new(preferred_device: Option<String>) -> Self {
        Self {
            preferred_device,
            ..Self::default()
        }
    }

    /// Load the device list; also used for retry after a failure
    pub fn load_devices(&mut self) -> Vec<SessionAction> {
        self.loading_devices = true;
        vec![SessionAction::Load(LoadRequest::Devices)]
    }

    pub fn select_device(&mut self, device: &str) -> Vec<SessionAction> {
        self.generation += 1;
        self.pending_device = Some(device.to_string());
        log::info!("Selecting device {} (generation {})", device, self.generation);

        vec![SessionAction::Load(LoadRequest::DeviceData {
            generation: self.generation,
            device: device.to_string(),
        })]
    }

    pub fn apply(&mut self, event: LoadEvent) -> Vec<SessionAction> {
        match event {
            LoadEvent::Devices(result) => self.apply_devices(result),
            LoadEvent::DeviceData { generation, device, result } => {
                if generation != self.generation {
                    log::debug!("Discarding device data for {} from stale generation {}", device, generation);
                    return Vec::new();
                }
                self.apply_device_data(device, result)
            }
            LoadEvent::Metadata { generation, url, result } => {
                if generation != self.displayed_generation {
                    log::debug!("Discarding metadata from {} (stale generation {})", url, generation);
                    return Vec::new();
                }
                self.apply_metadata(result)
            }
        }
    }

    fn apply_devices(&mut self, result: Result<Vec<String>, ReviewError>) -> Vec<SessionAction> {
        self.loading_devices = false;

        match result {
            Ok(devices) if !devices.is_empty() => {
                self.errors.clear(ErrorSource::DeviceList);
                let initial = self
                    .preferred_device
                    .take()
                    .filter(|d| devices.contains(d))
                    .unwrap_or_else(|| devices[0].clone());
                self.devices = devices;
                self.select_device(&initial)
            }
            Ok(_) => {
                self.errors.report(
                    ErrorSource::DeviceList,
                    ReviewError::NotFound("no devices available".to_string()),
                );
                Vec::new()
            }
            Err(e) => {
                self.errors.report(ErrorSource::DeviceList, e);
                Vec::new()
            }
        }
    }

    fn apply_device_data(
        &mut self,
        device: String,
        result: Result<VideoSources, ReviewError>,
    ) -> Vec<SessionAction> {
        self.pending_device = None;

        match result {
            Ok(sources) => {
                self.errors.clear(ErrorSource::DeviceData);
                self.errors.clear(ErrorSource::Metadata);
                self.errors.clear(ErrorSource::Playback);

                self.displayed_device = Some(device.clone());
                self.displayed_generation = self.generation;
                self.video_source = Some(sources.video_url.clone());
                self.metadata = None;
                self.loading_metadata = true;

                vec![
                    SessionAction::LoadVideo(sources.video_url),
                    SessionAction::ClearColorTrack,
                    SessionAction::Load(LoadRequest::Metadata {
                        generation: self.generation,
                        url: sources.metadata_url,
                    }),
                    SessionAction::RememberDevice(device),
                ]
            }
            Err(e) => {
                // Previously loaded video and metadata stay on screen
                self.errors.report(ErrorSource::DeviceData, e);
                Vec::new()
            }
        }
    }

    fn apply_metadata(&mut self, result: Result<FrameMetadata, ReviewError>) -> Vec<SessionAction> {
        self.loading_metadata = false;

        match result {
            Ok(metadata) => {
                self.errors.clear(ErrorSource::Metadata);
                self.metadata = Some(metadata);
                vec![SessionAction::PaintColorTrack]
            }
            Err(e) => {
                self.errors.report(ErrorSource::Metadata, e);
                Vec::new()
            }
        }
    }

    pub fn report_playback_error(&mut self, error: ReviewError) {
        self.errors.report(ErrorSource::Playback, error);
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Device whose video and metadata are on screen
    pub fn displayed_device(&self) -> Option<&str> {
        self.displayed_device.as_deref()
    }

    /// What the device dropdown shows: the in-flight selection, else the displayed device
    pub fn selected_device(&self) -> Option<&str> {
        self.pending_device.as_deref().or(self.displayed_device.as_deref())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn video_source(&self) -> Option<&str> {
        self.video_source.as_deref()
    }

    pub fn metadata(&self) -> Option<&FrameMetadata> {
        self.metadata.as_ref()
    }

    pub fn frame_info(&self, progress: f64) -> FrameInfo {
        frame_info_at(self.metadata.as_ref(), progress)
    }

    pub fn is_loading_devices(&self) -> bool {
        self.loading_devices
    }

    pub fn is_loading(&self) -> bool {
        self.loading_devices || self.loading_metadata || self.pending_device.is_some()
    }
}
