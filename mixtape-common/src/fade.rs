//! Fade curve definitions for crossfading
//!
//! The sequencing engine describes each segment's fade-in and fade-out with a
//! curve shape; the actual per-sample gain application is performed by the
//! media-processing collaborator, so the renderer needs each curve's ffmpeg
//! `afade` name rather than a sample loop.

use serde::{Deserialize, Serialize};

/// Fade curve shapes
///
/// - Linear: constant rate of change (precise, predictable)
/// - Exponential: slow start, fast finish (natural-sounding fade-in)
/// - Logarithmic: fast start, slow finish (natural-sounding fade-out)
/// - SCurve: smooth acceleration and deceleration (gentle, musical)
/// - EqualPower: constant perceived loudness during crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(t) = t
    Linear,
    /// v(t) = t²
    Exponential,
    /// v(t) = (1-t)² for fade-out
    Logarithmic,
    /// v(t) = 0.5 × (1 - cos(π × t))
    SCurve,
    /// v(t) = sin(t × π/2)
    EqualPower,
}

impl FadeCurve {
    /// Parse curve from a user-facing name
    ///
    /// Accepts the canonical lowercase names plus common aliases:
    /// `cosine`, `s-curve`, `scurve`, `equalpower`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" => Some(FadeCurve::Exponential),
            "logarithmic" => Some(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Canonical name (lowercase, underscored)
    pub fn name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// The ffmpeg `afade` curve name that realizes this shape
    ///
    /// `tri` is afade's default, so renderers may omit the parameter for
    /// [`FadeCurve::Linear`].
    pub fn afade_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "tri",
            FadeCurve::Exponential => "qua",
            FadeCurve::Logarithmic => "log",
            FadeCurve::SCurve => "hsin",
            FadeCurve::EqualPower => "qsin",
        }
    }

    /// All curve variants, for UI dropdowns and validation
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl Default for FadeCurve {
    /// Linear is the default: the overlap arithmetic guarantees both curves
    /// complete inside the crossfade window, and linear ramps sum without a
    /// level dip at the midpoint.
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
