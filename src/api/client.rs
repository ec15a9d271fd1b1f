use serde::Deserialize;
use std::future::Future;

use crate::core::{AppConfig, FrameMetadata, ReviewError};

/// URLs returned for a device by `getdevicedata`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoSources {
    #[serde(rename = "videofiles")]
    pub video_url: String,
    #[serde(rename = "cvmdata")]
    pub metadata_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DevicesResponse {
    pub output: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceDataResponse {
    pub output: Option<VideoSources>,
    #[serde(default)]
    pub err: Option<String>,
}

impl DevicesResponse {
    pub fn into_devices(self) -> Result<Vec<String>, ReviewError> {
        if self.output.is_empty() {
            return Err(ReviewError::NotFound("no devices available".to_string()));
        }
        Ok(self.output)
    }
}

impl DeviceDataResponse {
    /// A null `output` is a logical error carrying the server's message
    pub fn into_sources(self) -> Result<VideoSources, ReviewError> {
        match self.output {
            Some(sources) => Ok(sources),
            None => Err(ReviewError::NotFound(
                self.err.unwrap_or_else(|| "device data unavailable".to_string()),
            )),
        }
    }
}

/// The remote endpoints the loader talks to
pub trait ReviewApi: Send + Sync + 'static {
    fn get_devices(&self) -> impl Future<Output = Result<Vec<String>, ReviewError>> + Send;

    fn get_device_data(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<VideoSources, ReviewError>> + Send;

    fn get_frame_metadata(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<FrameMetadata, ReviewError>> + Send;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: u32,
    org_id: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: config.api_base().to_string(),
            user_id: config.user_id,
            org_id: config.org_id.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ReviewError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::Network(format!("HTTP status {}", status.as_u16())));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ReviewError::from)
    }
}

impl ReviewApi for ApiClient {
    async fn get_devices(&self) -> Result<Vec<String>, ReviewError> {
        let url = format!("{}/getdevices", self.base_url);
        log::debug!("Fetching device list from {}", url);

        let request = self.http.get(&url).query(&[
            ("userId", self.user_id.to_string()),
            ("orgId", self.org_id.clone()),
        ]);
        let response: DevicesResponse = self.get_json(request).await?;
        response.into_devices()
    }

    async fn get_device_data(&self, device_id: &str) -> Result<VideoSources, ReviewError> {
        let url = format!("{}/getdevicedata", self.base_url);
        log::debug!("Fetching device data for {}", device_id);

        let request = self.http.get(&url).query(&[("deviceId", device_id)]);
        let response: DeviceDataResponse = self.get_json(request).await?;
        response.into_sources()
    }

    async fn get_frame_metadata(&self, url: &str) -> Result<FrameMetadata, ReviewError> {
        log::debug!("Fetching frame metadata from {}", url);

        let request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        self.get_json(request).await
    }
}
