use chrono::{DateTime, Local};

/// Errors surfaced by the loader and the media backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReviewError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("media error: {0}")]
    Media(String),
}

impl From<reqwest::Error> for ReviewError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ReviewError::Parse(e.to_string())
        } else {
            ReviewError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(e: serde_json::Error) -> Self {
        ReviewError::Parse(e.to_string())
    }
}

/// How much of the application an error takes down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One feature is unavailable, everything else keeps working
    Feature,
    /// Nothing useful can be shown until the user retries
    Session,
}

/// Which load produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSource {
    DeviceList,
    DeviceData,
    Metadata,
    Playback,
}

impl ErrorSource {
    pub fn severity(self) -> Severity {
        match self {
            ErrorSource::DeviceList => Severity::Session,
            ErrorSource::DeviceData | ErrorSource::Metadata | ErrorSource::Playback => Severity::Feature,
        }
    }

    pub fn display_text(self) -> &'static str {
        match self {
            ErrorSource::DeviceList => "Device list",
            ErrorSource::DeviceData => "Device data",
            ErrorSource::Metadata => "Frame metadata",
            ErrorSource::Playback => "Playback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: ErrorSource,
    pub severity: Severity,
    pub error: ReviewError,
    pub occurred_at: DateTime<Local>,
}

impl ErrorReport {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Collects the latest error per source for the banner
#[derive(Debug, Default)]
pub struct ErrorReporter {
    reports: Vec<ErrorReport>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, replacing any earlier report from the same source
    pub fn report(&mut self, source: ErrorSource, error: ReviewError) {
        let severity = source.severity();
        match severity {
            Severity::Session => log::error!("{} failed: {}", source.display_text(), error),
            Severity::Feature => log::warn!("{} failed: {}", source.display_text(), error),
        }

        self.reports.retain(|r| r.source != source);
        self.reports.push(ErrorReport {
            source,
            severity,
            error,
            occurred_at: Local::now(),
        });
    }

    /// Drop the report for a source after it loaded successfully
    pub fn clear(&mut self, source: ErrorSource) {
        self.reports.retain(|r| r.source != source);
    }

    pub fn dismiss(&mut self, source: ErrorSource) {
        self.clear(source);
    }

    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }

    pub fn get(&self, source: ErrorSource) -> Option<&ErrorReport> {
        self.reports.iter().find(|r| r.source == source)
    }

    pub fn has_session_error(&self) -> bool {
        self.reports.iter().any(|r| r.severity == Severity::Session)
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
