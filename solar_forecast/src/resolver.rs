//! Mapping a requested time onto a forecast point

use crate::error::{ForecastError, Result};
use crate::models::{ForecastPoint, ForecastSeries};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// How a target was placed on the forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The target lies within the forecast window
    Exact,
    /// The target lies outside the window; matched by hour of day
    Pattern,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => f.write_str("exact"),
            MatchKind::Pattern => f.write_str("pattern"),
        }
    }
}

/// Resolved position of a target in a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub index: usize,
    pub match_kind: MatchKind,
}

/// Index of the timestamp nearest to `target`, ties going to the earlier one.
/// `points` must be ascending and non-empty.
fn nearest_index(points: &[ForecastPoint], target: NaiveDateTime) -> usize {
    let after = points.partition_point(|p| p.timestamp < target);
    if after == 0 {
        return 0;
    }
    if after == points.len() {
        return points.len() - 1;
    }

    let before_gap = target - points[after - 1].timestamp;
    let after_gap = points[after].timestamp - target;
    if after_gap < before_gap {
        after
    } else {
        after - 1
    }
}

/// Place `target` on `forecast`.
///
/// Inside `[first, last]` the nearest point wins. Outside, the first point
/// sharing the target's hour of day is used, or the first point when no hour
/// matches.
pub fn resolve(forecast: &ForecastSeries, target: NaiveDateTime) -> Result<Resolution> {
    let (Some(first), Some(last)) = (forecast.first_timestamp(), forecast.last_timestamp()) else {
        return Err(ForecastError::InsufficientData {
            required: 1,
            actual: 0,
        });
    };

    if first <= target && target <= last {
        return Ok(Resolution {
            index: nearest_index(forecast.points(), target),
            match_kind: MatchKind::Exact,
        });
    }

    let hour = target.hour();
    let index = forecast
        .points()
        .iter()
        .position(|p| p.timestamp.hour() == hour)
        .unwrap_or(0);

    warn!(
        %target,
        window_start = %first,
        window_end = %last,
        hour,
        index,
        "target outside forecast window, using daily pattern"
    );

    Ok(Resolution {
        index,
        match_kind: MatchKind::Pattern,
    })
}

/// The `count` points starting at the point nearest to `now`.
///
/// Starts from the first point when `now` precedes the forecast and from the
/// last point when it follows it.
pub fn next_intervals(forecast: &ForecastSeries, now: NaiveDateTime, count: usize) -> Vec<ForecastPoint> {
    if forecast.is_empty() {
        return Vec::new();
    }
    let start = nearest_index(forecast.points(), now);
    forecast.points().iter().skip(start).take(count).copied().collect()
}
