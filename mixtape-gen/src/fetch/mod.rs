//! Download collaborator
//!
//! Supplies a decodable source file plus its duration for a given video URL.
//! The engine only sees the [`SourceFetcher`] trait; behind it sits an
//! explicit ladder of named fetch strategies tried in order, each a fixed
//! number of times, with a typed failure recorded per attempt.

pub mod fallback;
pub mod ytdlp;

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::engine::segment::SourceAudio;
use crate::media::probe::ProbeError;

pub use fallback::FallbackFetcher;
pub use ytdlp::YtDlpStrategy;

/// Source track metadata for the request form
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub title: String,
    pub duration_ms: u64,
    pub uploader: Option<String>,
}

/// One failed fetch attempt, attributed to its strategy
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{strategy}: {message}")]
pub struct StrategyFailure {
    /// Name of the strategy that failed
    pub strategy: &'static str,
    /// What went wrong, as reported by the tool
    pub message: String,
}

/// Fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is not a supported video URL
    #[error("unsupported video url: {0}")]
    InvalidUrl(String),

    /// A tool the fetcher depends on was not found at startup
    #[error("required tool missing: {0}")]
    ToolMissing(&'static str),

    /// Every strategy exhausted its attempts
    #[error("download unavailable after {} failed attempts", failures.len())]
    DownloadUnavailable { failures: Vec<StrategyFailure> },

    /// The downloaded file's duration could not be determined
    #[error("could not determine source duration: {0}")]
    Probe(#[from] ProbeError),

    /// Metadata lookup failed
    #[error("source metadata unavailable: {0}")]
    Metadata(String),

    /// Filesystem error while preparing the download directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download collaborator contract
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Download audio for `url` into `dest_dir` and report its duration
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<SourceAudio, FetchError>;

    /// Look up title/duration metadata without downloading
    async fn probe_info(&self, url: &str) -> Result<SourceInfo, FetchError>;
}

/// One named download strategy in the fallback ladder
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Stable strategy name used in logs and failure reports
    fn name(&self) -> &'static str;

    /// Run one download attempt, returning the produced file
    async fn attempt(&self, url: &str, dest_dir: &Path) -> Result<std::path::PathBuf, StrategyFailure>;
}

static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/(watch\?v=|embed/)|youtu\.be/)[\w\-]+")
        .expect("video url pattern")
});

/// Whether `url` looks like a supported video URL (watch, embed, or short form)
pub fn is_supported_url(url: &str) -> bool {
    VIDEO_URL.is_match(url.trim())
}
