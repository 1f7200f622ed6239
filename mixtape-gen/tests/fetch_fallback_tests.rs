//! Fallback fetcher tests against stub strategies
//!
//! The ladder is a linear machine: strategies in declaration order, a fixed
//! attempt count each, first produced file wins, and an exhausted ladder
//! reports every typed failure it collected.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use mixtape_gen::fetch::{
    FallbackFetcher, FetchError, FetchStrategy, SourceFetcher, StrategyFailure,
};

const URL: &str = "https://www.youtube.com/watch?v=abc123";

/// Stand-in ffprobe that reports a 600 s duration for anything
fn fake_ffprobe(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("ffprobe");
    std::fs::write(&path, "#!/bin/sh\necho 600.000000\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fails `failures_before_success` times, then produces a file
struct FlakyStrategy {
    name: &'static str,
    failures_before_success: u32,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl FetchStrategy for FlakyStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, _url: &str, dest_dir: &Path) -> Result<PathBuf, StrategyFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            return Err(StrategyFailure {
                strategy: self.name,
                message: format!("simulated failure {call}"),
            });
        }
        let path = dest_dir.join("download.m4a");
        tokio::fs::write(&path, b"audio bytes").await.unwrap();
        Ok(path)
    }
}

fn strategy(name: &'static str, failures_before_success: u32) -> (Box<dyn FetchStrategy>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let boxed = Box::new(FlakyStrategy {
        name,
        failures_before_success,
        calls: calls.clone(),
    });
    (boxed, calls)
}

#[tokio::test]
async fn first_strategy_success_short_circuits() {
    let work = tempfile::tempdir().unwrap();
    let ffprobe = fake_ffprobe(work.path());

    let (primary, primary_calls) = strategy("primary", 0);
    let (secondary, secondary_calls) = strategy("secondary", 0);
    let fetcher = FallbackFetcher::new(vec![primary, secondary], 2, Some(ffprobe), None);

    let dest = work.path().join("track0");
    let source = fetcher.fetch(URL, &dest).await.unwrap();

    assert_eq!(source.duration_ms, 600_000);
    assert!(source.path.exists());
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn retries_primary_before_falling_back() {
    let work = tempfile::tempdir().unwrap();
    let ffprobe = fake_ffprobe(work.path());

    // Primary always fails; secondary succeeds on its first try
    let (primary, primary_calls) = strategy("primary", u32::MAX);
    let (secondary, secondary_calls) = strategy("secondary", 0);
    let fetcher = FallbackFetcher::new(vec![primary, secondary], 2, Some(ffprobe), None);

    let dest = work.path().join("track0");
    let source = fetcher.fetch(URL, &dest).await.unwrap();

    assert_eq!(source.duration_ms, 600_000);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhausted_ladder_reports_every_attempt() {
    let work = tempfile::tempdir().unwrap();
    let ffprobe = fake_ffprobe(work.path());

    let (primary, _) = strategy("primary", u32::MAX);
    let (secondary, _) = strategy("secondary", u32::MAX);
    let fetcher = FallbackFetcher::new(vec![primary, secondary], 2, Some(ffprobe), None);

    let dest = work.path().join("track0");
    let err = fetcher.fetch(URL, &dest).await.unwrap_err();

    match err {
        FetchError::DownloadUnavailable { failures } => {
            assert_eq!(failures.len(), 4);
            let strategies: Vec<&str> = failures.iter().map(|f| f.strategy).collect();
            assert_eq!(strategies, ["primary", "primary", "secondary", "secondary"]);
        }
        other => panic!("expected DownloadUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn second_attempt_of_same_strategy_can_win() {
    let work = tempfile::tempdir().unwrap();
    let ffprobe = fake_ffprobe(work.path());

    let (primary, primary_calls) = strategy("primary", 1);
    let (secondary, secondary_calls) = strategy("secondary", 0);
    let fetcher = FallbackFetcher::new(vec![primary, secondary], 2, Some(ffprobe), None);

    let dest = work.path().join("track0");
    fetcher.fetch(URL, &dest).await.unwrap();

    assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_attempt() {
    let work = tempfile::tempdir().unwrap();
    let ffprobe = fake_ffprobe(work.path());

    let (primary, primary_calls) = strategy("primary", 0);
    let fetcher = FallbackFetcher::new(vec![primary], 2, Some(ffprobe), None);

    let err = fetcher
        .fetch("https://example.com/not-a-video", &work.path().join("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
    assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_ladder_means_missing_tool() {
    let fetcher = FallbackFetcher::new(Vec::new(), 2, None, None);
    let work = tempfile::tempdir().unwrap();

    let err = fetcher.fetch(URL, &work.path().join("t")).await.unwrap_err();
    assert!(matches!(err, FetchError::ToolMissing("yt-dlp")));
}
