//! Segment resolution and validation
//!
//! Validates and normalizes each requested slice of a source track into a
//! canonical [`Segment`]. Resolution is a pure transformation: no side
//! effects, and the first failing rule wins for a given segment.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixtape_common::fade::FadeCurve;
use mixtape_common::time::{TimeField, TimeParseError};

/// A decodable source track supplied by the download collaborator
///
/// The segment holds a read-only reference to this; the file itself is owned
/// by the request's session directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAudio {
    /// Path to the downloaded audio file
    pub path: PathBuf,
    /// Total track duration in milliseconds
    pub duration_ms: u64,
}

/// One raw segment request as it arrives from the request surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRequest {
    /// Video URL to fetch audio from
    pub url: String,
    /// Trim start within the source track
    pub start: TimeField,
    /// Trim end within the source track
    pub end: TimeField,
    /// Fade-in duration; configured default when absent
    #[serde(default)]
    pub fade_in: Option<TimeField>,
    /// Fade-out duration; configured default when absent
    #[serde(default)]
    pub fade_out: Option<TimeField>,
    /// Fade-in curve shape; linear when absent
    #[serde(default)]
    pub fade_in_curve: Option<FadeCurve>,
    /// Fade-out curve shape; linear when absent
    #[serde(default)]
    pub fade_out_curve: Option<FadeCurve>,
}

/// Fill-in values for fields the request left unspecified
#[derive(Debug, Clone, Copy)]
pub struct FadeDefaults {
    /// Default fade duration in milliseconds (applied to both ends)
    pub fade_ms: u64,
}

/// Validation failures, one subkind per rule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A time field could not be parsed at all
    #[error("unparseable time value: {0}")]
    InvalidTime(#[from] TimeParseError),

    /// `end <= start`
    #[error("segment end ({end_ms} ms) must be after start ({start_ms} ms)")]
    InvalidRange { start_ms: i64, end_ms: i64 },

    /// Offset outside `[0, source duration]`
    #[error("offset {offset_ms} ms outside source track (0..={duration_ms} ms)")]
    OutOfBounds { offset_ms: i64, duration_ms: u64 },

    /// A fade duration below zero
    #[error("negative fade duration: {fade_ms} ms")]
    NegativeFade { fade_ms: i64 },

    /// Combined fades longer than the segment itself
    #[error("fades total {fade_total_ms} ms but segment is only {segment_ms} ms")]
    FadeExceedsSegment { fade_total_ms: u64, segment_ms: u64 },
}

/// A validated slice of one source track, immutable once constructed
///
/// Invariants, established by [`Segment::resolve`]:
/// - `end_ms > start_ms`, both within `[0, source.duration_ms]`
/// - `fade_in_ms + fade_out_ms <= duration_ms()`
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Source track this segment is cut from
    pub source: Arc<SourceAudio>,
    /// Trim start (ms from track start)
    pub start_ms: u64,
    /// Trim end (ms from track start)
    pub end_ms: u64,
    /// Fade-in duration (ms)
    pub fade_in_ms: u64,
    /// Fade-out duration (ms)
    pub fade_out_ms: u64,
    /// Fade-in curve shape
    pub fade_in_curve: FadeCurve,
    /// Fade-out curve shape
    pub fade_out_curve: FadeCurve,
}

impl Segment {
    /// Resolve a raw request against its fetched source track.
    ///
    /// Returns the first validation failure found, in rule order:
    /// time parsing, range, bounds, negative fades, fade total.
    pub fn resolve(
        request: &SegmentRequest,
        source: Arc<SourceAudio>,
        defaults: &FadeDefaults,
    ) -> Result<Segment, ValidationError> {
        let start_ms = request.start.to_ms()?;
        let end_ms = request.end.to_ms()?;

        if end_ms <= start_ms {
            return Err(ValidationError::InvalidRange { start_ms, end_ms });
        }
        for offset_ms in [start_ms, end_ms] {
            if offset_ms < 0 || offset_ms as u64 > source.duration_ms {
                return Err(ValidationError::OutOfBounds {
                    offset_ms,
                    duration_ms: source.duration_ms,
                });
            }
        }

        let fade_in_ms = match &request.fade_in {
            Some(field) => field.to_ms()?,
            None => defaults.fade_ms as i64,
        };
        let fade_out_ms = match &request.fade_out {
            Some(field) => field.to_ms()?,
            None => defaults.fade_ms as i64,
        };
        for fade_ms in [fade_in_ms, fade_out_ms] {
            if fade_ms < 0 {
                return Err(ValidationError::NegativeFade { fade_ms });
            }
        }

        let segment_ms = (end_ms - start_ms) as u64;
        let fade_total_ms = fade_in_ms as u64 + fade_out_ms as u64;
        if fade_total_ms > segment_ms {
            return Err(ValidationError::FadeExceedsSegment {
                fade_total_ms,
                segment_ms,
            });
        }

        Ok(Segment {
            source,
            start_ms: start_ms as u64,
            end_ms: end_ms as u64,
            fade_in_ms: fade_in_ms as u64,
            fade_out_ms: fade_out_ms as u64,
            fade_in_curve: request.fade_in_curve.unwrap_or_default(),
            fade_out_curve: request.fade_out_curve.unwrap_or_default(),
        })
    }

    /// Played duration of this segment in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(duration_ms: u64) -> Arc<SourceAudio> {
        Arc::new(SourceAudio {
            path: PathBuf::from("/tmp/track.m4a"),
            duration_ms,
        })
    }

    fn request(start: f64, end: f64, fade_in: Option<f64>, fade_out: Option<f64>) -> SegmentRequest {
        SegmentRequest {
            url: "https://youtu.be/abc123".into(),
            start: TimeField::Seconds(start),
            end: TimeField::Seconds(end),
            fade_in: fade_in.map(TimeField::Seconds),
            fade_out: fade_out.map(TimeField::Seconds),
            fade_in_curve: None,
            fade_out_curve: None,
        }
    }

    const DEFAULTS: FadeDefaults = FadeDefaults { fade_ms: 3_000 };

    #[test]
    fn test_resolve_valid_segment() {
        let seg = Segment::resolve(
            &request(10.0, 40.0, Some(2.0), Some(4.0)),
            source(60_000),
            &DEFAULTS,
        )
        .unwrap();
        assert_eq!(seg.start_ms, 10_000);
        assert_eq!(seg.end_ms, 40_000);
        assert_eq!(seg.duration_ms(), 30_000);
        assert_eq!(seg.fade_in_ms, 2_000);
        assert_eq!(seg.fade_out_ms, 4_000);
        assert_eq!(seg.fade_in_curve, FadeCurve::Linear);
    }

    #[test]
    fn test_unspecified_fades_take_default() {
        let seg =
            Segment::resolve(&request(0.0, 30.0, None, None), source(60_000), &DEFAULTS).unwrap();
        assert_eq!(seg.fade_in_ms, 3_000);
        assert_eq!(seg.fade_out_ms, 3_000);
    }

    #[test]
    fn test_fade_invariant_holds_after_resolution() {
        let seg = Segment::resolve(
            &request(0.0, 10.0, Some(4.0), Some(6.0)),
            source(60_000),
            &DEFAULTS,
        )
        .unwrap();
        assert!(seg.fade_in_ms + seg.fade_out_ms <= seg.duration_ms());
    }

    #[test]
    fn test_end_before_start_is_invalid_range() {
        // start=5s, end=4s
        let err = Segment::resolve(&request(5.0, 4.0, None, None), source(60_000), &DEFAULTS)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidRange {
                start_ms: 5_000,
                end_ms: 4_000
            }
        );
    }

    #[test]
    fn test_zero_length_is_invalid_range() {
        let err = Segment::resolve(&request(5.0, 5.0, None, None), source(60_000), &DEFAULTS)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRange { .. }));
    }

    #[test]
    fn test_offsets_outside_track_are_out_of_bounds() {
        let err = Segment::resolve(&request(0.0, 90.0, None, None), source(60_000), &DEFAULTS)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfBounds {
                offset_ms: 90_000,
                duration_ms: 60_000
            }
        );

        let err = Segment::resolve(&request(-2.0, 30.0, None, None), source(60_000), &DEFAULTS)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfBounds {
                offset_ms: -2_000,
                duration_ms: 60_000
            }
        );
    }

    #[test]
    fn test_fades_longer_than_segment_rejected() {
        // duration=4s, fadeIn=3s, fadeOut=2s → 5s > 4s
        let err = Segment::resolve(
            &request(0.0, 4.0, Some(3.0), Some(2.0)),
            source(60_000),
            &DEFAULTS,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::FadeExceedsSegment {
                fade_total_ms: 5_000,
                segment_ms: 4_000
            }
        );
    }

    #[test]
    fn test_negative_fade_rejected() {
        let err = Segment::resolve(
            &request(0.0, 10.0, Some(-1.0), None),
            source(60_000),
            &DEFAULTS,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NegativeFade { fade_ms: -1_000 });
    }

    #[test]
    fn test_unparseable_time_rejected() {
        let mut req = request(0.0, 10.0, None, None);
        req.end = TimeField::Text("not-a-time".into());
        let err = Segment::resolve(&req, source(60_000), &DEFAULTS).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTime(_)));
    }

    #[test]
    fn test_timecode_fields_resolve() {
        let req = SegmentRequest {
            url: "https://youtu.be/abc123".into(),
            start: TimeField::Text("1:00".into()),
            end: TimeField::Text("1:30.5".into()),
            fade_in: Some(TimeField::Text("2".into())),
            fade_out: None,
            fade_in_curve: Some(FadeCurve::EqualPower),
            fade_out_curve: None,
        };
        let seg = Segment::resolve(&req, source(120_000), &DEFAULTS).unwrap();
        assert_eq!(seg.start_ms, 60_000);
        assert_eq!(seg.end_ms, 90_500);
        assert_eq!(seg.fade_in_ms, 2_000);
        assert_eq!(seg.fade_in_curve, FadeCurve::EqualPower);
        assert_eq!(seg.fade_out_curve, FadeCurve::Linear);
    }
}
