//! Render invocation
//!
//! Translates a [`MixPlan`] into one [`MixJob`] for the media-processing
//! collaborator and supervises the run: caller-supplied timeout, and atomic
//! artifact placement (the collaborator writes to a sibling `.part` file
//! which is renamed onto the sink only on success, so no partial artifact is
//! ever visible at the final path).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use mixtape_common::fade::FadeCurve;

use super::plan::MixPlan;

/// Render failures, surfaced with the collaborator's reason unmasked
#[derive(Debug, Error)]
pub enum RenderError {
    /// A job source file is missing or empty
    #[error("source not readable: {}", path.display())]
    SourceUnreadable { path: PathBuf },

    /// The collaborator ran but could not produce the output
    #[error("encode failed: {stderr}")]
    EncodeFailed { stderr: String },

    /// The external tool is missing or crashed before doing any work
    #[error("media tool unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The render exceeded the caller-supplied timeout
    #[error("render timed out after {after:?}")]
    Timeout { after: Duration },

    /// Artifact placement failed
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Whether the caller may retry without re-fetching sources
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RenderError::CollaboratorUnavailable(_) | RenderError::Timeout { .. }
        )
    }
}

/// Output encode parameters for the final artifact
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSettings {
    /// Audio codec name passed to the collaborator
    pub codec: String,
    /// Target bitrate
    pub bitrate: String,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Normalize the overlap mix instead of summing additively
    pub normalize_mix: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        EncodeSettings {
            codec: "libmp3lame".into(),
            bitrate: "192k".into(),
            sample_rate: 44_100,
            normalize_mix: false,
        }
    }
}

/// One segment of a [`MixJob`]: trim window, fade specs, output placement
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSpec {
    /// Decodable source file
    pub source: PathBuf,
    /// Trim window start within the source (ms)
    pub trim_start_ms: u64,
    /// Trim window end within the source (ms)
    pub trim_end_ms: u64,
    /// Fade-in duration (ms)
    pub fade_in_ms: u64,
    /// Fade-out duration (ms)
    pub fade_out_ms: u64,
    /// Fade-in curve shape
    pub fade_in_curve: FadeCurve,
    /// Fade-out curve shape
    pub fade_out_curve: FadeCurve,
    /// Placement on the output timeline (ms)
    pub delay_ms: u64,
}

impl SegmentSpec {
    /// Played duration of the trimmed segment (ms)
    pub fn duration_ms(&self) -> u64 {
        self.trim_end_ms - self.trim_start_ms
    }
}

/// A complete mix request for the media-processing collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct MixJob {
    /// Ordered segment specifications
    pub segments: Vec<SegmentSpec>,
    /// Final encode target
    pub encode: EncodeSettings,
    /// Expected output duration (ms)
    pub total_duration_ms: u64,
}

/// The finished output artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Final sink path
    pub path: PathBuf,
    /// Output duration in milliseconds
    pub duration_ms: u64,
}

/// Media-processing collaborator contract
///
/// The collaborator is responsible for decode, per-sample fade-curve
/// application, overlapping-region summation, and the final encode. It must
/// write the complete output to `out_path` or fail; partial output at
/// `out_path` after a failure is tolerated (the invoker removes it).
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Execute one mix job, writing the encoded result to `out_path`
    async fn mix(&self, job: &MixJob, out_path: &Path) -> Result<(), RenderError>;
}

/// Render invoker: one plan in, one artifact out, no internal retry
pub struct Renderer {
    processor: Arc<dyn MediaProcessor>,
    timeout: Duration,
    encode: EncodeSettings,
}

impl Renderer {
    pub fn new(processor: Arc<dyn MediaProcessor>, timeout: Duration, encode: EncodeSettings) -> Self {
        Renderer {
            processor,
            timeout,
            encode,
        }
    }

    /// Translate a plan into the collaborator's job description.
    ///
    /// Pure; exposed so the translation can be inspected without running a
    /// render.
    pub fn job_for(&self, plan: &MixPlan) -> MixJob {
        let segments = plan
            .entries()
            .iter()
            .map(|entry| SegmentSpec {
                source: entry.segment.source.path.clone(),
                trim_start_ms: entry.segment.start_ms,
                trim_end_ms: entry.segment.end_ms,
                fade_in_ms: entry.segment.fade_in_ms,
                fade_out_ms: entry.segment.fade_out_ms,
                fade_in_curve: entry.segment.fade_in_curve,
                fade_out_curve: entry.segment.fade_out_curve,
                delay_ms: entry.output_start_ms,
            })
            .collect();

        MixJob {
            segments,
            encode: self.encode.clone(),
            total_duration_ms: plan.total_duration_ms(),
        }
    }

    /// Render the plan to `sink`.
    ///
    /// On success the artifact is atomically placed at `sink`. On timeout the
    /// in-flight collaborator future is dropped (which kills a spawned child
    /// process) and the partial `.part` file is removed; `sink` is never
    /// touched on failure.
    pub async fn render(&self, plan: &MixPlan, sink: &Path) -> Result<Artifact, RenderError> {
        let job = self.job_for(plan);
        let part = part_path(sink);

        debug!(
            segments = job.segments.len(),
            total_ms = job.total_duration_ms,
            sink = %sink.display(),
            "starting render"
        );

        let outcome = tokio::time::timeout(self.timeout, self.processor.mix(&job, &part)).await;
        match outcome {
            Ok(Ok(())) => {
                tokio::fs::rename(&part, sink).await?;
                info!(sink = %sink.display(), total_ms = job.total_duration_ms, "render complete");
                Ok(Artifact {
                    path: sink.to_path_buf(),
                    duration_ms: plan.total_duration_ms(),
                })
            }
            Ok(Err(err)) => {
                warn!(error = %err, "render failed");
                let _ = tokio::fs::remove_file(&part).await;
                Err(err)
            }
            Err(_elapsed) => {
                warn!(after = ?self.timeout, "render timed out");
                let _ = tokio::fs::remove_file(&part).await;
                Err(RenderError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}

/// Sibling temporary path for in-progress output: `<sink>.part`
fn part_path(sink: &Path) -> PathBuf {
    let mut name = sink
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".part");
    sink.with_file_name(name)
}
