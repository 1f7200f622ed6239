//! Mixtape Generator - Main entry point
//!
//! Resolves settings, discovers the external tools, wires the collaborators
//! behind their traits, and serves the web form and JSON API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixtape_gen::api;
use mixtape_gen::config::{Args, Settings};
use mixtape_gen::engine::render::Renderer;
use mixtape_gen::fetch::FallbackFetcher;
use mixtape_gen::media::ffmpeg::FfmpegProcessor;
use mixtape_gen::media::tools::ToolSet;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mixtape_gen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = Settings::resolve(&args).context("Failed to resolve settings")?;

    info!("Starting Mixtape Generator on port {}", settings.port);
    info!("Work directory: {}", settings.work_dir.display());

    tokio::fs::create_dir_all(&settings.work_dir)
        .await
        .context("Failed to create work directory")?;

    let tools = ToolSet::discover(&settings);
    tools.log_summary();

    let fetcher = Arc::new(FallbackFetcher::from_tools(&tools, settings.fetch_attempts));
    let processor = Arc::new(FfmpegProcessor::new(tools.ffmpeg.clone()));
    let renderer = Arc::new(Renderer::new(
        processor,
        settings.render_timeout(),
        settings.encode_settings(),
    ));

    let state = api::AppState {
        settings: Arc::new(settings.clone()),
        tools: Arc::new(tools),
        fetcher,
        renderer,
    };
    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
