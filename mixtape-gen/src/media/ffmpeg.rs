//! ffmpeg-backed media processing
//!
//! Renders a [`MixJob`] with a single ffmpeg invocation: each segment is
//! trimmed and faded in its own filter chain, delayed to its output
//! placement, and the chains are summed pairwise into one stream. Filter
//! graph construction is pure so the emitted graph can be tested without
//! ffmpeg installed.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::engine::render::{MediaProcessor, MixJob, RenderError};

use mixtape_common::fade::FadeCurve;

/// Media processor driving the ffmpeg binary
pub struct FfmpegProcessor {
    ffmpeg: Option<PathBuf>,
}

impl FfmpegProcessor {
    /// `ffmpeg` is the resolved binary path, or `None` when discovery failed
    /// (every mix then fails with `CollaboratorUnavailable`).
    pub fn new(ffmpeg: Option<PathBuf>) -> Self {
        FfmpegProcessor { ffmpeg }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn mix(&self, job: &MixJob, out_path: &Path) -> Result<(), RenderError> {
        let ffmpeg = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| RenderError::CollaboratorUnavailable("ffmpeg not found".into()))?;

        for spec in &job.segments {
            let meta = tokio::fs::metadata(&spec.source)
                .await
                .map_err(|_| RenderError::SourceUnreadable {
                    path: spec.source.clone(),
                })?;
            if meta.len() == 0 {
                return Err(RenderError::SourceUnreadable {
                    path: spec.source.clone(),
                });
            }
        }

        let graph = filter_graph(job);
        debug!(graph = %graph, "built crossfade filter graph");

        let mut cmd = Command::new(ffmpeg);
        for spec in &job.segments {
            cmd.arg("-i").arg(&spec.source);
        }
        cmd.arg("-filter_complex")
            .arg(&graph)
            .args(["-map", "[out]"])
            .arg("-c:a")
            .arg(&job.encode.codec)
            .arg("-b:a")
            .arg(&job.encode.bitrate)
            .arg("-y")
            .arg(out_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // Dropping the future on timeout must also stop the encode
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|err| {
            RenderError::CollaboratorUnavailable(format!("failed to run ffmpeg: {err}"))
        })?;

        if !output.status.success() {
            return Err(RenderError::EncodeFailed {
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(())
    }
}

/// Build the `-filter_complex` graph for a mix job.
///
/// Per segment `i`: `[i:a]atrim,asetpts,afade(in),afade(out)[seg{i}]`.
/// Segments after the first are delayed to their output placement and summed
/// pairwise (`amix`) onto the running mix; a final `aresample` pins the
/// output rate. A single-segment job skips the delay/mix stages entirely.
pub fn filter_graph(job: &MixJob) -> String {
    let mut parts = Vec::with_capacity(job.segments.len() * 2 + 1);

    for (i, spec) in job.segments.iter().enumerate() {
        let mut chain = format!(
            "[{i}:a]atrim=start={}:end={},asetpts=PTS-STARTPTS",
            secs(spec.trim_start_ms),
            secs(spec.trim_end_ms),
        );
        if spec.fade_in_ms > 0 {
            chain.push_str(&format!(
                ",afade=t=in:d={}{}",
                secs(spec.fade_in_ms),
                curve_arg(spec.fade_in_curve)
            ));
        }
        if spec.fade_out_ms > 0 {
            let fade_out_start_ms = spec.duration_ms() - spec.fade_out_ms;
            chain.push_str(&format!(
                ",afade=t=out:st={}:d={}{}",
                secs(fade_out_start_ms),
                secs(spec.fade_out_ms),
                curve_arg(spec.fade_out_curve)
            ));
        }
        chain.push_str(&format!("[seg{i}]"));
        parts.push(chain);
    }

    let mut current = "seg0".to_string();
    for (i, spec) in job.segments.iter().enumerate().skip(1) {
        parts.push(format!(
            "[seg{i}]adelay={delay}|{delay}[del{i}]",
            delay = spec.delay_ms
        ));
        parts.push(format!(
            "[{current}][del{i}]amix=inputs=2:duration=longest:normalize={}[mix{i}]",
            if job.encode.normalize_mix { 1 } else { 0 }
        ));
        current = format!("mix{i}");
    }

    parts.push(format!(
        "[{current}]aresample={}[out]",
        job.encode.sample_rate
    ));
    parts.join(";")
}

/// Milliseconds as fixed three-decimal seconds, the form ffmpeg expects
fn secs(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// `:curve=` parameter; omitted for linear, which is afade's default
fn curve_arg(curve: FadeCurve) -> String {
    if curve == FadeCurve::Linear {
        String::new()
    } else {
        format!(":curve={}", curve.afade_name())
    }
}

/// Last portion of the collaborator's stderr; enough for the actual error,
/// not the full transcode log
fn stderr_tail(stderr: &[u8]) -> String {
    const TAIL: usize = 800;
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= TAIL {
        return text.to_string();
    }
    let mut start = text.len() - TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
