//! Error types for mixtape-gen
//!
//! One service-level enum wraps the typed domain errors so handlers can
//! return `Result<_, Error>` and get a structured JSON response. Every
//! failure is scoped to its request; nothing here is fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::engine::plan::PlanError;
use crate::engine::render::RenderError;
use crate::engine::segment::ValidationError;
use crate::fetch::FetchError;

/// Main error type for mixtape-gen
#[derive(Debug, Error)]
pub enum Error {
    /// A segment request failed validation
    #[error("invalid segment {index}: {source}")]
    Validation {
        index: usize,
        source: ValidationError,
    },

    /// Timeline planning failed
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The download collaborator failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The media-processing collaborator failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration file loading errors
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Convenience Result type using mixtape-gen Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable kind for API clients
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Plan(PlanError::EmptyInput) => "empty_input",
            Error::Fetch(FetchError::InvalidUrl(_)) => "invalid_url",
            Error::Fetch(_) => "fetch",
            Error::Render(RenderError::Timeout { .. }) => "render_timeout",
            Error::Render(RenderError::CollaboratorUnavailable(_)) => "media_tool_unavailable",
            Error::Render(_) => "render",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::NotFound(_) => "not_found",
            Error::BadRequest(_) => "bad_request",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            // Caller input malformed: correctable by the user
            Error::Validation { .. } | Error::Plan(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Fetch(FetchError::InvalidUrl(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            // Upstream download failures
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            // Retryable collaborator failures get their own codes
            Error::Render(RenderError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Error::Render(RenderError::CollaboratorUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (status, body).into_response()
    }
}
