//! Render invoker tests against a stub media processor
//!
//! Verifies job translation, atomic artifact placement, cleanup on failure,
//! and timeout handling without touching ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mixtape_common::fade::FadeCurve;
use mixtape_gen::engine::plan::MixPlan;
use mixtape_gen::engine::render::{
    EncodeSettings, MediaProcessor, MixJob, RenderError, Renderer,
};
use mixtape_gen::engine::segment::{Segment, SourceAudio};

fn two_segment_plan() -> MixPlan {
    let source = Arc::new(SourceAudio {
        path: PathBuf::from("/tmp/a.m4a"),
        duration_ms: 600_000,
    });
    let a = Segment {
        source: source.clone(),
        start_ms: 0,
        end_ms: 10_000,
        fade_in_ms: 0,
        fade_out_ms: 3_000,
        fade_in_curve: FadeCurve::Linear,
        fade_out_curve: FadeCurve::Linear,
    };
    let b = Segment {
        source,
        start_ms: 0,
        end_ms: 8_000,
        fade_in_ms: 2_000,
        fade_out_ms: 0,
        fade_in_curve: FadeCurve::Linear,
        fade_out_curve: FadeCurve::Linear,
    };
    MixPlan::build(&[a, b]).unwrap()
}

/// Records the job it was given and writes a complete output file
struct RecordingProcessor {
    jobs: Mutex<Vec<MixJob>>,
}

#[async_trait]
impl MediaProcessor for RecordingProcessor {
    async fn mix(&self, job: &MixJob, out_path: &Path) -> Result<(), RenderError> {
        self.jobs.lock().unwrap().push(job.clone());
        tokio::fs::write(out_path, b"encoded audio").await?;
        Ok(())
    }
}

/// Writes partial output and then fails
struct FailingProcessor;

#[async_trait]
impl MediaProcessor for FailingProcessor {
    async fn mix(&self, _job: &MixJob, out_path: &Path) -> Result<(), RenderError> {
        tokio::fs::write(out_path, b"half-written").await?;
        Err(RenderError::EncodeFailed {
            stderr: "simulated encoder crash".into(),
        })
    }
}

/// Never finishes inside any reasonable timeout
struct HangingProcessor;

#[async_trait]
impl MediaProcessor for HangingProcessor {
    async fn mix(&self, _job: &MixJob, out_path: &Path) -> Result<(), RenderError> {
        tokio::fs::write(out_path, b"in progress").await?;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[tokio::test]
async fn successful_render_places_artifact_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("mixtape.mp3");

    let processor = Arc::new(RecordingProcessor {
        jobs: Mutex::new(Vec::new()),
    });
    let renderer = Renderer::new(
        processor.clone(),
        Duration::from_secs(5),
        EncodeSettings::default(),
    );

    let plan = two_segment_plan();
    let artifact = renderer.render(&plan, &sink).await.unwrap();

    assert_eq!(artifact.path, sink);
    assert_eq!(artifact.duration_ms, 16_000);
    assert!(sink.exists());
    // The in-progress file is gone once the artifact is placed
    assert!(!dir.path().join("mixtape.mp3.part").exists());

    // The collaborator saw the plan's placement, not just the segments
    let jobs = processor.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].segments[0].delay_ms, 0);
    assert_eq!(jobs[0].segments[1].delay_ms, 8_000);
    assert_eq!(jobs[0].total_duration_ms, 16_000);
}

#[tokio::test]
async fn failed_render_leaves_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("mixtape.mp3");

    let renderer = Renderer::new(
        Arc::new(FailingProcessor),
        Duration::from_secs(5),
        EncodeSettings::default(),
    );

    let err = renderer.render(&two_segment_plan(), &sink).await.unwrap_err();
    assert!(matches!(err, RenderError::EncodeFailed { .. }));
    assert!(!err.is_retryable());

    // Neither the sink nor the partial file survives
    assert!(!sink.exists());
    assert!(!dir.path().join("mixtape.mp3.part").exists());
}

#[tokio::test]
async fn timed_out_render_reports_timeout_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("mixtape.mp3");

    let timeout = Duration::from_millis(100);
    let renderer = Renderer::new(
        Arc::new(HangingProcessor),
        timeout,
        EncodeSettings::default(),
    );

    let err = renderer.render(&two_segment_plan(), &sink).await.unwrap_err();
    match &err {
        RenderError::Timeout { after } => assert_eq!(*after, timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(err.is_retryable());
    assert!(!sink.exists());
    assert!(!dir.path().join("mixtape.mp3.part").exists());
}
