//! yt-dlp fetch strategies and metadata probing

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{FetchError, FetchStrategy, SourceInfo, StrategyFailure};

/// Downloaded files are written as `download.<ext>` inside the per-track
/// directory, so retries can sweep stale output before running.
const DOWNLOAD_STEM: &str = "download";

/// A yt-dlp invocation with a fixed format selector
pub struct YtDlpStrategy {
    name: &'static str,
    ytdlp: PathBuf,
    format: &'static str,
}

impl YtDlpStrategy {
    /// Primary strategy: best audio-only stream, preferring m4a
    pub fn best_audio(ytdlp: PathBuf) -> Self {
        YtDlpStrategy {
            name: "yt-dlp/best-audio",
            ytdlp,
            format: "bestaudio[ext=m4a]/bestaudio",
        }
    }

    /// Fallback strategy: accept any stream that carries audio
    pub fn any_audio(ytdlp: PathBuf) -> Self {
        YtDlpStrategy {
            name: "yt-dlp/any-audio",
            ytdlp,
            format: "bestaudio/best",
        }
    }
}

#[async_trait]
impl FetchStrategy for YtDlpStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, StrategyFailure> {
        let fail = |message: String| StrategyFailure {
            strategy: self.name,
            message,
        };

        sweep_stale_downloads(dest_dir)
            .await
            .map_err(|err| fail(format!("could not prepare download dir: {err}")))?;

        let template = dest_dir.join(format!("{DOWNLOAD_STEM}.%(ext)s"));
        let output = Command::new(&self.ytdlp)
            .args(["--no-playlist", "--no-progress", "-f", self.format, "-o"])
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| fail(format!("failed to run yt-dlp: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let line = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("yt-dlp failed");
            return Err(fail(line.trim().to_string()));
        }

        find_download(dest_dir)
            .await
            .map_err(|err| fail(format!("could not scan download dir: {err}")))?
            .ok_or_else(|| fail("yt-dlp reported success but produced no file".into()))
    }
}

/// Remove leftover `download.*` files from a previous attempt
async fn sweep_stale_downloads(dest_dir: &Path) -> std::io::Result<()> {
    let mut entries = tokio::fs::read_dir(dest_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if is_download_file(&entry.file_name().to_string_lossy()) {
            let _ = tokio::fs::remove_file(entry.path()).await;
        }
    }
    Ok(())
}

/// Locate the non-empty file the download produced
async fn find_download(dest_dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dest_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        // yt-dlp leaves a .part file behind when interrupted
        if is_download_file(&name) && !name.ends_with(".part") {
            let metadata = entry.metadata().await?;
            if metadata.is_file() && metadata.len() > 0 {
                return Ok(Some(entry.path()));
            }
        }
    }
    Ok(None)
}

fn is_download_file(name: &str) -> bool {
    name.starts_with(DOWNLOAD_STEM)
}

/// Query title/duration/uploader metadata via `yt-dlp -J`.
pub async fn probe_info(ytdlp: &Path, url: &str) -> Result<SourceInfo, FetchError> {
    let output = Command::new(ytdlp)
        .args(["-J", "--no-playlist"])
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| FetchError::Metadata(format!("failed to run yt-dlp: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let line = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("yt-dlp failed");
        return Err(FetchError::Metadata(line.trim().to_string()));
    }

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|err| FetchError::Metadata(format!("unparseable yt-dlp output: {err}")))?;

    let title = info
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown Title")
        .to_string();
    let duration_secs = info.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let uploader = info
        .get("uploader")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    debug!(title = %title, duration_secs, "probed source metadata");

    Ok(SourceInfo {
        title,
        duration_ms: (duration_secs * 1000.0).round() as u64,
        uploader,
    })
}
