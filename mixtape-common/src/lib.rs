//! # Mixtape Common Library
//!
//! Shared code for the mixtape generator:
//! - Millisecond-based time values and user time-field parsing
//! - Fade curve definitions and ffmpeg curve-name mapping

pub mod fade;
pub mod time;

pub use fade::FadeCurve;
pub use time::{TimeField, TimeParseError};
