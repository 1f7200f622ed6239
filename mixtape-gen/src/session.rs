//! Per-request working directories
//!
//! Every mixtape request gets its own UUID-named directory under the work
//! root: one subdirectory per fetched track plus the final artifact. State is
//! passed explicitly through the fetch → resolve → plan → render chain; there
//! is no process-wide registry, so concurrent requests cannot collide on a
//! sink path.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// File name of the finished artifact inside a session directory
pub const ARTIFACT_FILE: &str = "mixtape.mp3";

/// One request's isolated workspace on disk
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    dir: PathBuf,
}

impl Session {
    /// Create a fresh session directory under `work_root`
    pub async fn create(work_root: &Path) -> std::io::Result<Session> {
        let id = Uuid::new_v4();
        let dir = work_root.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Session { id, dir })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download directory for the track at `index`
    pub fn track_dir(&self, index: usize) -> PathBuf {
        self.dir.join(format!("track{index}"))
    }

    /// Where the finished artifact lives
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    /// Drop per-track downloads once the artifact exists
    pub async fn discard_downloads(&self, track_count: usize) {
        for index in 0..track_count {
            let _ = tokio::fs::remove_dir_all(self.track_dir(index)).await;
        }
    }

    /// Remove the whole session directory (used on request failure)
    pub async fn purge(self) {
        if let Err(err) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %err, "failed to purge session dir");
        }
    }
}

/// Artifact location for a previously created session
pub fn artifact_path_in(work_root: &Path, id: Uuid) -> PathBuf {
    work_root.join(id.to_string()).join(ARTIFACT_FILE)
}
