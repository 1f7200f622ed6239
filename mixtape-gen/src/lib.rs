//! # Mixtape Generator Library (mixtape-gen)
//!
//! Turns an ordered list of (video URL, trim window, fade pair) requests into
//! one crossfaded audio file.
//!
//! **Core:** the sequencing engine in [`engine`]: segment resolution,
//! timeline planning with overlapping crossfades, and render invocation.
//!
//! **Collaborators:** source fetching ([`fetch`], yt-dlp behind a strategy
//! ladder) and media processing ([`media`], ffmpeg filter graphs). The engine
//! only sees their traits.
//!
//! **Surface:** a minimal axum web form and JSON API in [`api`].

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod media;
pub mod session;

pub use error::{Error, Result};
