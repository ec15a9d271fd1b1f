use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;

use crate::api::{ReviewApi, VideoSources};
use crate::core::{FrameMetadata, ReviewError};

/// Work for the loader thread. Device data and metadata requests carry the
/// selection generation they were issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    Devices,
    DeviceData { generation: u64, device: String },
    Metadata { generation: u64, url: String },
}

/// Completed request, delivered back to the UI thread
#[derive(Debug, Clone)]
pub enum LoadEvent {
    Devices(Result<Vec<String>, ReviewError>),
    DeviceData {
        generation: u64,
        device: String,
        result: Result<VideoSources, ReviewError>,
    },
    Metadata {
        generation: u64,
        url: String,
        result: Result<FrameMetadata, ReviewError>,
    },
}

/// Runs API requests on a background tokio runtime so the UI never blocks
pub struct ReviewLoader {
    request_sender: mpsc::UnboundedSender<LoadRequest>,
    result_receiver: mpsc::UnboundedReceiver<LoadEvent>,
}

impl ReviewLoader {
    pub fn new<A: ReviewApi>(api: A) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<LoadEvent>();
        let api = Arc::new(api);

        thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create loader runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                while let Some(request) = request_rx.recv().await {
                    let api = api.clone();
                    let result_tx = result_tx.clone();

                    // Requests run concurrently; stale results are filtered by generation on the UI side
                    tokio::spawn(async move {
                        let event = Self::execute(api.as_ref(), request).await;
                        if let Err(e) = result_tx.send(event) {
                            log::error!("Failed to send load result: {}", e);
                        }
                    });
                }
                log::debug!("Loader request channel closed");
            });
        });

        Self {
            request_sender: request_tx,
            result_receiver: result_rx,
        }
    }

    async fn execute<A: ReviewApi>(api: &A, request: LoadRequest) -> LoadEvent {
        match request {
            LoadRequest::Devices => {
                let result = api.get_devices().await;
                match &result {
                    Ok(devices) => log::info!("Loaded {} devices", devices.len()),
                    Err(e) => log::error!("Failed to load devices: {}", e),
                }
                LoadEvent::Devices(result)
            }
            LoadRequest::DeviceData { generation, device } => {
                let result = api.get_device_data(&device).await;
                match &result {
                    Ok(sources) => log::info!("Device {} video: {}", device, sources.video_url),
                    Err(e) => log::warn!("Failed to load data for device {}: {}", device, e),
                }
                LoadEvent::DeviceData { generation, device, result }
            }
            LoadRequest::Metadata { generation, url } => {
                let result = api.get_frame_metadata(&url).await;
                match &result {
                    Ok(metadata) => log::info!("Loaded {} frames of metadata from {}", metadata.frame_count(), url),
                    Err(e) => log::warn!("Failed to load frame metadata from {}: {}", url, e),
                }
                LoadEvent::Metadata { generation, url, result }
            }
        }
    }

    /// Queue a request (non-blocking)
    pub fn request(&self, request: LoadRequest) {
        log::debug!("Queueing load request: {:?}", request);
        if let Err(e) = self.request_sender.send(request) {
            log::error!("Failed to send load request: {}", e);
        }
    }

    /// Completed results since the last call (non-blocking)
    pub fn completed(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.result_receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
