//! Strategy ladder with retry
//!
//! A linear retry/fallback machine: strategies run in declaration order, each
//! tried `attempts_per_strategy` times; the first produced file wins. Every
//! failed attempt is recorded as a [`StrategyFailure`] so an exhausted ladder
//! can report exactly what was tried.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::engine::segment::SourceAudio;
use crate::media::probe;
use crate::media::tools::ToolSet;

use super::ytdlp::{self, YtDlpStrategy};
use super::{FetchError, FetchStrategy, SourceFetcher, SourceInfo, StrategyFailure};

/// Download collaborator implementation backed by a strategy ladder
pub struct FallbackFetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
    attempts_per_strategy: u32,
    ffprobe: Option<PathBuf>,
    ytdlp: Option<PathBuf>,
}

impl FallbackFetcher {
    pub fn new(
        strategies: Vec<Box<dyn FetchStrategy>>,
        attempts_per_strategy: u32,
        ffprobe: Option<PathBuf>,
        ytdlp: Option<PathBuf>,
    ) -> Self {
        FallbackFetcher {
            strategies,
            attempts_per_strategy: attempts_per_strategy.max(1),
            ffprobe,
            ytdlp,
        }
    }

    /// Standard ladder: best-audio extraction first, lax format second
    pub fn from_tools(tools: &ToolSet, attempts_per_strategy: u32) -> Self {
        let strategies: Vec<Box<dyn FetchStrategy>> = match &tools.ytdlp {
            Some(ytdlp) => vec![
                Box::new(YtDlpStrategy::best_audio(ytdlp.clone())),
                Box::new(YtDlpStrategy::any_audio(ytdlp.clone())),
            ],
            None => Vec::new(),
        };
        FallbackFetcher::new(
            strategies,
            attempts_per_strategy,
            tools.ffprobe.clone(),
            tools.ytdlp.clone(),
        )
    }
}

#[async_trait]
impl SourceFetcher for FallbackFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<SourceAudio, FetchError> {
        if !super::is_supported_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        if self.strategies.is_empty() {
            return Err(FetchError::ToolMissing("yt-dlp"));
        }
        let ffprobe = self
            .ffprobe
            .as_deref()
            .ok_or(FetchError::ToolMissing("ffprobe"))?;

        tokio::fs::create_dir_all(dest_dir).await?;

        let mut failures = Vec::new();
        for strategy in &self.strategies {
            for attempt in 1..=self.attempts_per_strategy {
                info!(
                    strategy = strategy.name(),
                    attempt,
                    of = self.attempts_per_strategy,
                    url,
                    "fetching source audio"
                );
                match strategy.attempt(url, dest_dir).await {
                    Ok(path) => {
                        let duration_ms = probe::audio_duration_ms(ffprobe, &path).await?;
                        info!(
                            strategy = strategy.name(),
                            path = %path.display(),
                            duration_ms,
                            "source audio ready"
                        );
                        return Ok(SourceAudio { path, duration_ms });
                    }
                    Err(failure) => {
                        warn!(
                            strategy = strategy.name(),
                            attempt,
                            error = %failure,
                            "fetch attempt failed"
                        );
                        failures.push(failure);
                    }
                }
            }
        }

        Err(FetchError::DownloadUnavailable { failures })
    }

    async fn probe_info(&self, url: &str) -> Result<SourceInfo, FetchError> {
        if !super::is_supported_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        let ytdlp = self
            .ytdlp
            .as_deref()
            .ok_or(FetchError::ToolMissing("yt-dlp"))?;
        ytdlp::probe_info(ytdlp, url).await
    }
}
