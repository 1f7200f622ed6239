//! Source duration probing via ffprobe

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

/// Probe failures
#[derive(Debug, Error)]
pub enum ProbeError {
    /// ffprobe could not be run at all
    #[error("ffprobe unavailable: {0}")]
    Unavailable(String),

    /// The media file could not be inspected
    #[error("unreadable media: {}", path.display())]
    Unreadable { path: PathBuf },

    /// ffprobe ran but printed something other than a duration
    #[error("unexpected ffprobe output: {0}")]
    BadOutput(String),
}

/// Read a media file's duration in milliseconds.
pub async fn audio_duration_ms(ffprobe: &Path, media: &Path) -> Result<u64, ProbeError> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(media)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| ProbeError::Unavailable(format!("failed to run ffprobe: {err}")))?;

    if !output.status.success() {
        return Err(ProbeError::Unreadable {
            path: media.to_path_buf(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let text = text.trim();
    let secs: f64 = text
        .parse()
        .map_err(|_| ProbeError::BadOutput(text.to_string()))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ProbeError::BadOutput(text.to_string()));
    }
    Ok((secs * 1000.0).round() as u64)
}
