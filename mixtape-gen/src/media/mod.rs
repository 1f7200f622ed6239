//! Media-processing collaborator implementations
//!
//! The engine only sees the [`crate::engine::MediaProcessor`] trait; this
//! module supplies the ffmpeg-backed implementation, ffprobe duration
//! probing, and external tool discovery.

pub mod ffmpeg;
pub mod probe;
pub mod tools;

pub use ffmpeg::FfmpegProcessor;
pub use probe::ProbeError;
pub use tools::ToolSet;
