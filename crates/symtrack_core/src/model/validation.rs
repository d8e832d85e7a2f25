//! Input sanitization for user-entered text and numeric readings.
//!
//! # Responsibility
//! - Normalize free text before it reaches the profile or the timeline.
//! - Clamp numeric readings into their documented ranges.
//!
//! # Invariants
//! - Validators never panic; failures are reported as `ValidationError`.
//! - Severity uses a single `1..=10` bound everywhere in core.

use chrono::{DateTime, Duration, Months, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Max characters for names (user name, condition, symptom, food, ...).
pub const NAME_MAX_CHARS: usize = 100;
/// Max characters for short labels (meal type, dosage, frequency).
pub const LABEL_MAX_CHARS: usize = 100;
/// Max characters for free-form notes.
pub const NOTES_MAX_CHARS: usize = 1000;

pub const SEVERITY_MIN: u8 = 1;
pub const SEVERITY_MAX: u8 = 10;
pub const QUALITY_MAX: u8 = 10;
pub const CALORIES_MAX: u32 = 10_000;
pub const SLEEP_HOURS_MAX: f64 = 24.0;
pub const DURATION_MINUTES_MAX: u32 = 24 * 60;

const MAX_FUTURE_DAYS: i64 = 1;
const MAX_PAST_YEARS: u32 = 10;

/// Rejection reasons for user-entered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is empty after trimming.
    Empty { field: &'static str },
    /// Value contains a NUL byte.
    ContainsNul { field: &'static str },
    /// Name-like value contains control characters.
    ContainsControl { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} cannot be empty"),
            Self::ContainsNul { field } => write!(f, "{field} contains a NUL byte"),
            Self::ContainsControl { field } => {
                write!(f, "{field} contains control characters")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `input`, rejects NUL bytes, and truncates to `max_chars`.
///
/// Empty values are rejected unless `allow_empty` is set.
pub fn validate_text(
    field: &'static str,
    input: &str,
    max_chars: usize,
    allow_empty: bool,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() && !allow_empty {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.contains('\0') {
        return Err(ValidationError::ContainsNul { field });
    }
    Ok(trimmed.chars().take(max_chars).collect())
}

/// Validates a display name such as a user, condition or symptom name.
pub fn validate_name(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let validated = validate_text(field, input, NAME_MAX_CHARS, false)?;
    if validated.chars().any(char::is_control) {
        return Err(ValidationError::ContainsControl { field });
    }
    Ok(validated)
}

/// Clamps a raw severity reading into `1..=10`.
pub fn clamp_severity(level: i64) -> u8 {
    level.clamp(i64::from(SEVERITY_MIN), i64::from(SEVERITY_MAX)) as u8
}

/// Clamps a raw sleep quality reading into `0..=10`.
pub fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(0, i64::from(QUALITY_MAX)) as u8
}

pub fn clamp_calories(calories: i64) -> u32 {
    calories.clamp(0, i64::from(CALORIES_MAX)) as u32
}

/// Clamps sleep hours into `0..=24`. Non-finite input maps to zero.
pub fn clamp_sleep_hours(hours: f64) -> f64 {
    if hours.is_finite() {
        hours.clamp(0.0, SLEEP_HOURS_MAX)
    } else {
        0.0
    }
}

pub fn clamp_duration_minutes(minutes: i64) -> u32 {
    minutes.clamp(0, i64::from(DURATION_MINUTES_MAX)) as u32
}

/// Pulls an activity timestamp back into the accepted window around `now`.
///
/// - More than one day in the future: replaced by `now`.
/// - More than ten years in the past: raised to the ten-year bound.
pub fn clamp_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let max_future = now + Duration::days(MAX_FUTURE_DAYS);
    if timestamp > max_future {
        return now;
    }

    let min_past = now
        .checked_sub_months(Months::new(12 * MAX_PAST_YEARS))
        .unwrap_or(now);
    if timestamp < min_past {
        return min_past;
    }

    timestamp
}
