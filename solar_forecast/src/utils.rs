//! Time helpers shared by the models and the pipeline

use crate::error::{ForecastError, Result};
use crate::models::Interval;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried, in order, for naive date-times
const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Timestamp layout used when writing historical CSV files
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Create `count` timestamps following `last` at the interval's stride
pub fn future_timestamps(last: NaiveDateTime, count: usize, interval: Interval) -> Vec<NaiveDateTime> {
    let step = interval.step();
    (1..=count).map(|i| last + step * i as i32).collect()
}

/// Parse a calendar date-time in any of the accepted layouts.
///
/// Accepts `DD-MM-YYYY HH:MM`, `DD/MM/YYYY HH:MM`, `YYYY-MM-DD HH:MM[:SS]`
/// with a space or `T` separator, RFC 3339 (the offset is dropped and the
/// wall-clock time kept) and a bare `YYYY-MM-DD` meaning midnight.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::InvalidTime(input.to_string()))
}
