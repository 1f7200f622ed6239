//! Configuration loading
//!
//! Every setting resolves by priority: command-line argument (highest), then
//! environment variable (via clap's env support), then the TOML config file,
//! then the compiled default. Policy constants the engine depends on (the
//! default fade and the per-strategy fetch attempt count) live here rather
//! than in code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::engine::render::EncodeSettings;
use crate::engine::segment::FadeDefaults;
use crate::error::{Error, Result};

/// Command-line arguments for mixtape-gen
#[derive(Parser, Debug, Default)]
#[command(name = "mixtape-gen")]
#[command(about = "Crossfaded mixtape generator service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MIXTAPE_PORT")]
    pub port: Option<u16>,

    /// Working directory for sessions and artifacts
    #[arg(short, long, env = "MIXTAPE_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "MIXTAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default fade duration in seconds for unspecified fades
    #[arg(long, env = "MIXTAPE_DEFAULT_FADE_SECS")]
    pub default_fade_secs: Option<f64>,

    /// Download attempts per fetch strategy
    #[arg(long, env = "MIXTAPE_FETCH_ATTEMPTS")]
    pub fetch_attempts: Option<u32>,

    /// Render timeout in seconds
    #[arg(long, env = "MIXTAPE_RENDER_TIMEOUT_SECS")]
    pub render_timeout_secs: Option<u64>,
}

/// TOML config file shape; every field optional
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    port: Option<u16>,
    work_dir: Option<PathBuf>,
    default_fade_secs: Option<f64>,
    fetch_attempts: Option<u32>,
    render_timeout_secs: Option<u64>,
    normalize_mix: Option<bool>,
    bitrate: Option<String>,
    sample_rate: Option<u32>,
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
    ytdlp_path: Option<PathBuf>,
}

/// Resolved service settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub work_dir: PathBuf,
    pub default_fade_secs: f64,
    pub fetch_attempts: u32,
    pub render_timeout_secs: u64,
    pub normalize_mix: bool,
    pub bitrate: String,
    pub sample_rate: u32,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub ytdlp_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: 5750,
            work_dir: default_work_dir(),
            default_fade_secs: 3.0,
            fetch_attempts: 2,
            render_timeout_secs: 300,
            normalize_mix: false,
            bitrate: "192k".into(),
            sample_rate: 44_100,
            ffmpeg_path: None,
            ffprobe_path: None,
            ytdlp_path: None,
        }
    }
}

impl Settings {
    /// Resolve settings from the config file and command-line/env overrides
    pub fn resolve(args: &Args) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = locate_config_file(args.config.as_deref()) {
            let content = std::fs::read_to_string(&path).map_err(|err| {
                Error::Config(format!("cannot read {}: {err}", path.display()))
            })?;
            let file: FileSettings = toml::from_str(&content).map_err(|err| {
                Error::Config(format!("cannot parse {}: {err}", path.display()))
            })?;
            settings.apply_file(file);
        }

        if let Some(port) = args.port {
            settings.port = port;
        }
        if let Some(work_dir) = &args.work_dir {
            settings.work_dir = work_dir.clone();
        }
        if let Some(fade) = args.default_fade_secs {
            settings.default_fade_secs = fade;
        }
        if let Some(attempts) = args.fetch_attempts {
            settings.fetch_attempts = attempts;
        }
        if let Some(timeout) = args.render_timeout_secs {
            settings.render_timeout_secs = timeout;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.work_dir {
            self.work_dir = v;
        }
        if let Some(v) = file.default_fade_secs {
            self.default_fade_secs = v;
        }
        if let Some(v) = file.fetch_attempts {
            self.fetch_attempts = v;
        }
        if let Some(v) = file.render_timeout_secs {
            self.render_timeout_secs = v;
        }
        if let Some(v) = file.normalize_mix {
            self.normalize_mix = v;
        }
        if let Some(v) = file.bitrate {
            self.bitrate = v;
        }
        if let Some(v) = file.sample_rate {
            self.sample_rate = v;
        }
        if file.ffmpeg_path.is_some() {
            self.ffmpeg_path = file.ffmpeg_path;
        }
        if file.ffprobe_path.is_some() {
            self.ffprobe_path = file.ffprobe_path;
        }
        if file.ytdlp_path.is_some() {
            self.ytdlp_path = file.ytdlp_path;
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.default_fade_secs.is_finite() || self.default_fade_secs < 0.0 {
            return Err(Error::Config(format!(
                "default_fade_secs must be non-negative, got {}",
                self.default_fade_secs
            )));
        }
        if self.fetch_attempts == 0 {
            return Err(Error::Config("fetch_attempts must be at least 1".into()));
        }
        if self.render_timeout_secs == 0 {
            return Err(Error::Config("render_timeout_secs must be at least 1".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be positive".into()));
        }
        Ok(())
    }

    /// Fade defaults handed to the segment resolver
    pub fn fade_defaults(&self) -> FadeDefaults {
        FadeDefaults {
            fade_ms: (self.default_fade_secs * 1000.0).round() as u64,
        }
    }

    /// Render timeout handed to the render invoker
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Encode parameters handed to the render invoker
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            codec: "libmp3lame".into(),
            bitrate: self.bitrate.clone(),
            sample_rate: self.sample_rate,
            normalize_mix: self.normalize_mix,
        }
    }
}

/// Config file lookup: explicit path first, then the platform config dir
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = dirs::config_dir()?.join("mixtape").join("config.toml");
    candidate.exists().then_some(candidate)
}

fn default_work_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mixtape"))
        .unwrap_or_else(|| PathBuf::from("./mixtape-data"))
}
