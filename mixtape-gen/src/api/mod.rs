//! HTTP surface for the mixtape generator
//!
//! Minimal web form plus a JSON API. The handlers own the request cycle
//! (session lifecycle, fetch loop, resolve, plan, render) and translate every
//! failure into a structured error response.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::config::Settings;
use crate::engine::render::Renderer;
use crate::fetch::SourceFetcher;
use crate::media::tools::ToolSet;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service settings
    pub settings: Arc<Settings>,
    /// Discovered external tools (reported by /health)
    pub tools: Arc<ToolSet>,
    /// Download collaborator
    pub fetcher: Arc<dyn SourceFetcher>,
    /// Render invoker
    pub renderer: Arc<Renderer>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Mixtape creation form
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                .route("/mixtapes", post(handlers::create_mixtape))
                .route("/mixtapes/:id/download", get(handlers::download_mixtape))
                .route("/source_info", post(handlers::source_info)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
}
