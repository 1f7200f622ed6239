//! External tool discovery
//!
//! Resolves the ffmpeg/ffprobe/yt-dlp binaries once at startup, honoring
//! configured overrides before searching PATH. A missing tool is not fatal:
//! the server starts, /health reports the gap, and requests that need the
//! tool fail with a typed collaborator error.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Settings;

/// Resolved external tool paths; `None` means not found
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub ytdlp: Option<PathBuf>,
}

impl ToolSet {
    /// Discover tools, preferring configured overrides over PATH lookup
    pub fn discover(settings: &Settings) -> ToolSet {
        ToolSet {
            ffmpeg: resolve("ffmpeg", settings.ffmpeg_path.as_deref()),
            ffprobe: resolve("ffprobe", settings.ffprobe_path.as_deref()),
            ytdlp: resolve("yt-dlp", settings.ytdlp_path.as_deref()),
        }
    }

    /// Log availability at startup, one line per tool
    pub fn log_summary(&self) {
        for (name, path) in [
            ("ffmpeg", &self.ffmpeg),
            ("ffprobe", &self.ffprobe),
            ("yt-dlp", &self.ytdlp),
        ] {
            match path {
                Some(p) => info!(tool = name, path = %p.display(), "tool available"),
                None => warn!(tool = name, "tool not found; dependent requests will fail"),
            }
        }
    }
}

fn resolve(name: &str, override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(tool = name, path = %path.display(), "configured tool path does not exist");
        return None;
    }
    which::which(name).ok()
}
