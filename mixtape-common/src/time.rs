//! Millisecond-based timing for mixtape sequencing
//!
//! All timeline arithmetic in the engine runs on integer milliseconds so that
//! planning is deterministic and lossless with respect to user-specified
//! timing. User-facing fields arrive either as plain seconds (`83`, `83.5`,
//! `"83.5"`) or as timecode strings (`"1:23"`, `"1:23.5"`, `"1:02:03"`); this
//! module converts both forms into signed milliseconds. Negative values are
//! preserved so the resolver can report them as out-of-bounds offsets rather
//! than hiding them behind a parse failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a user time field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// The field was present but empty
    #[error("empty time value")]
    Empty,

    /// The field could not be interpreted as seconds or a timecode
    #[error("malformed time value: {0}")]
    Malformed(String),
}

/// A raw time field as supplied by the request surface
///
/// Deserializes from either a JSON number (seconds) or a JSON string
/// (seconds or `m:ss` / `h:mm:ss` timecode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    /// Seconds, possibly fractional
    Seconds(f64),
    /// Seconds or timecode as text
    Text(String),
}

impl TimeField {
    /// Convert the field to signed milliseconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use mixtape_common::time::TimeField;
    ///
    /// assert_eq!(TimeField::Seconds(83.5).to_ms().unwrap(), 83_500);
    /// assert_eq!(TimeField::Text("1:23".into()).to_ms().unwrap(), 83_000);
    /// assert_eq!(TimeField::Text("1:02:03".into()).to_ms().unwrap(), 3_723_000);
    /// ```
    pub fn to_ms(&self) -> Result<i64, TimeParseError> {
        match self {
            TimeField::Seconds(secs) => secs_to_ms(*secs),
            TimeField::Text(text) => parse_time_str(text),
        }
    }
}

impl From<f64> for TimeField {
    fn from(secs: f64) -> Self {
        TimeField::Seconds(secs)
    }
}

/// Convert fractional seconds to milliseconds, rounding to the nearest ms.
pub fn secs_to_ms(secs: f64) -> Result<i64, TimeParseError> {
    if !secs.is_finite() {
        return Err(TimeParseError::Malformed(secs.to_string()));
    }
    Ok((secs * 1000.0).round() as i64)
}

/// Parse a textual time value into signed milliseconds.
///
/// Accepted forms:
/// - plain seconds: `"83"`, `"83.5"`, `"-2"`
/// - timecode: `"m:ss"`, `"m:ss.frac"`, `"h:mm:ss"`, `"h:mm:ss.frac"`
///
/// In timecode form every component after the first must be below 60.
pub fn parse_time_str(text: &str) -> Result<i64, TimeParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if !text.contains(':') {
        return text
            .parse::<f64>()
            .map_err(|_| TimeParseError::Malformed(text.to_string()))
            .and_then(secs_to_ms);
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(TimeParseError::Malformed(text.to_string()));
    }

    let mut total_secs = 0.0f64;
    for (i, part) in parts.iter().enumerate() {
        // Only the final component may carry a fraction
        let value = if i + 1 == parts.len() {
            part.parse::<f64>()
                .map_err(|_| TimeParseError::Malformed(text.to_string()))?
        } else {
            part.parse::<u64>()
                .map_err(|_| TimeParseError::Malformed(text.to_string()))? as f64
        };
        if value < 0.0 || (i > 0 && value >= 60.0) {
            return Err(TimeParseError::Malformed(text.to_string()));
        }
        total_secs = total_secs * 60.0 + value;
    }

    secs_to_ms(total_secs)
}

/// Format milliseconds as a display string: `m:ss` below one hour,
/// `h:mm:ss` above.
///
/// # Examples
///
/// ```
/// use mixtape_common::time::format_ms;
///
/// assert_eq!(format_ms(0), "0:00");
/// assert_eq!(format_ms(83_000), "1:23");
/// assert_eq!(format_ms(3_723_000), "1:02:03");
/// ```
pub fn format_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
