//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use mixtape_common::time::format_ms;

use crate::api::AppState;
use crate::engine::plan::{MixPlan, PlanError};
use crate::engine::segment::{Segment, SegmentRequest};
use crate::error::Error;
use crate::fetch;
use crate::session::Session;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateMixtapeRequest {
    /// Ordered segment requests; order is preserved in the output
    pub songs: Vec<SegmentRequest>,
}

#[derive(Debug, Serialize)]
pub struct CreateMixtapeResponse {
    pub mixtape_id: Uuid,
    pub total_duration_ms: u64,
    pub total_duration_display: String,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SourceInfoRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SourceInfoResponse {
    pub title: String,
    pub duration_ms: u64,
    pub duration_display: String,
    pub uploader: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub tools: ToolAvailability,
}

#[derive(Debug, Serialize)]
pub struct ToolAvailability {
    pub ffmpeg: bool,
    pub ffprobe: bool,
    pub ytdlp: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Mixtape creation form
pub async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Health check, including external tool availability
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        module: "mixtape-gen".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        tools: ToolAvailability {
            ffmpeg: state.tools.ffmpeg.is_some(),
            ffprobe: state.tools.ffprobe.is_some(),
            ytdlp: state.tools.ytdlp.is_some(),
        },
    })
}

/// Create a mixtape from an ordered list of segment requests
pub async fn create_mixtape(
    State(state): State<AppState>,
    Json(request): Json<CreateMixtapeRequest>,
) -> Result<Json<CreateMixtapeResponse>, Error> {
    if request.songs.is_empty() {
        return Err(PlanError::EmptyInput.into());
    }
    // Reject bad URLs before fetching anything
    for song in &request.songs {
        if !fetch::is_supported_url(&song.url) {
            return Err(fetch::FetchError::InvalidUrl(song.url.clone()).into());
        }
    }

    let session = Session::create(&state.settings.work_dir).await?;
    info!(session = %session.id(), songs = request.songs.len(), "mixtape request started");

    match build_mixtape(&state, &session, &request.songs).await {
        Ok(response) => {
            info!(
                session = %session.id(),
                total_ms = response.total_duration_ms,
                "mixtape request complete"
            );
            Ok(Json(response))
        }
        Err(err) => {
            error!(session = %session.id(), error = %err, "mixtape request failed");
            session.purge().await;
            Err(err)
        }
    }
}

/// The fetch → resolve → plan → render pipeline for one session
async fn build_mixtape(
    state: &AppState,
    session: &Session,
    songs: &[SegmentRequest],
) -> Result<CreateMixtapeResponse, Error> {
    let defaults = state.settings.fade_defaults();

    let mut segments = Vec::with_capacity(songs.len());
    for (index, song) in songs.iter().enumerate() {
        let source = state
            .fetcher
            .fetch(&song.url, &session.track_dir(index))
            .await?;
        let segment = Segment::resolve(song, Arc::new(source), &defaults)
            .map_err(|source| Error::Validation { index, source })?;
        segments.push(segment);
    }

    let plan = MixPlan::build(&segments)?;
    let artifact = state
        .renderer
        .render(&plan, &session.artifact_path())
        .await?;

    session.discard_downloads(songs.len()).await;

    Ok(CreateMixtapeResponse {
        mixtape_id: session.id(),
        total_duration_ms: artifact.duration_ms,
        total_duration_display: format_ms(artifact.duration_ms),
        download_url: format!("/api/v1/mixtapes/{}/download", session.id()),
    })
}

/// Download a finished mixtape artifact
pub async fn download_mixtape(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Error> {
    let id = Uuid::parse_str(&id).map_err(|_| Error::BadRequest(format!("invalid mixtape id: {id}")))?;

    let path = crate::session::artifact_path_in(&state.settings.work_dir, id);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| Error::NotFound(format!("mixtape {id}")))?;

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"mixtape_{id}.mp3\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Look up title/duration for a video URL (used by the form)
pub async fn source_info(
    State(state): State<AppState>,
    Json(request): Json<SourceInfoRequest>,
) -> Result<Json<SourceInfoResponse>, Error> {
    let info = state.fetcher.probe_info(request.url.trim()).await?;
    Ok(Json(SourceInfoResponse {
        title: info.title,
        duration_ms: info.duration_ms,
        duration_display: format_ms(info.duration_ms),
        uploader: info.uploader,
    }))
}
