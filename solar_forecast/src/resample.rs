//! Hourly to quarter-hourly resampling

use crate::error::{ForecastError, Result};
use crate::models::{ForecastSeries, Interval, PowerUnit};
use solar_math::interpolation::upsample_linear;

/// Quarter-hour points per hour
const QUARTERS_PER_HOUR: usize = 4;

/// Resample an hourly power forecast to 15-minute steps.
///
/// Each hour contributes four points on the line towards the next hourly
/// value; the three points after the last hour repeat its value. A forecast
/// already at 15 minutes is returned as is, and a single-point forecast keeps
/// its one point.
pub fn to_quarter_hour(series: ForecastSeries) -> Result<ForecastSeries> {
    if series.interval() == Interval::QuarterHourly {
        return Ok(series);
    }
    if series.unit() == PowerUnit::Wh {
        // Energy per hour cannot be split by interpolation.
        return Err(ForecastError::InvalidParameter(
            "Resample power values before converting them to energy".to_string(),
        ));
    }
    if series.len() <= 1 {
        return Ok(series.with_interval(Interval::QuarterHourly));
    }

    let start = series.first_timestamp().ok_or(ForecastError::InsufficientData {
        required: 1,
        actual: 0,
    })?;
    let values = upsample_linear(&series.values(), QUARTERS_PER_HOUR)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

    Ok(
        ForecastSeries::from_values(start, values, series.method(), Interval::QuarterHourly)
            .with_unit(series.unit())
            .with_confidence(series.confidence()),
    )
}
