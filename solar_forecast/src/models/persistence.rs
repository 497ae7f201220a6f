//! Persistence baseline: tomorrow looks like the most recent day

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    ensure_horizon, ForecastMethod, ForecastModel, ForecastPoint, ForecastSeries, Forecaster,
    Interval, TrainedForecastModel,
};
use crate::utils::future_timestamps;
use chrono::NaiveDateTime;
use tracing::debug;

/// Hours in the daily pattern that gets repeated
pub const DAILY_SEASON: usize = 24;

/// Seasonal persistence model
#[derive(Debug, Clone)]
pub struct PersistenceModel {
    /// Name of the model
    name: String,
    /// Number of trailing points forming one cycle
    season_length: usize,
}

/// Trained persistence model
#[derive(Debug, Clone)]
pub struct TrainedPersistence {
    /// Name of the model
    name: String,
    /// The last observed cycle
    pattern: Vec<f64>,
    /// Timestamp of the last observation
    last_timestamp: NaiveDateTime,
}

impl PersistenceModel {
    /// Create a new persistence model repeating the last `season_length` points
    pub fn new(season_length: usize) -> Result<Self> {
        if season_length == 0 {
            return Err(ForecastError::InvalidParameter(
                "Season length must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Persistence (season={})", season_length),
            season_length,
        })
    }

    pub fn season_length(&self) -> usize {
        self.season_length
    }
}

impl Default for PersistenceModel {
    fn default() -> Self {
        Self {
            name: format!("Persistence (season={})", DAILY_SEASON),
            season_length: DAILY_SEASON,
        }
    }
}

impl ForecastModel for PersistenceModel {
    type Trained = TrainedPersistence;

    fn train(&self, series: &HistoricalSeries) -> Result<TrainedPersistence> {
        if series.len() < self.season_length {
            return Err(ForecastError::InsufficientData {
                required: self.season_length,
                actual: series.len(),
            });
        }
        let last_timestamp = series.last_timestamp().ok_or(ForecastError::InsufficientData {
            required: self.season_length,
            actual: 0,
        })?;

        let solar = series.solar_values();
        let pattern = solar[solar.len() - self.season_length..].to_vec();

        Ok(TrainedPersistence {
            name: self.name.clone(),
            pattern,
            last_timestamp,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedPersistence {
    fn forecast(&self, horizon: usize) -> Result<ForecastSeries> {
        ensure_horizon(horizon)?;

        let timestamps = future_timestamps(self.last_timestamp, horizon, Interval::Hourly);
        let points = timestamps
            .into_iter()
            .zip(self.pattern.iter().cycle())
            .map(|(timestamp, &value)| ForecastPoint { timestamp, value })
            .collect();

        debug!(horizon, season = self.pattern.len(), "persistence forecast");
        Ok(ForecastSeries::new(points, ForecastMethod::Baseline, Interval::Hourly))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedPersistence {
    /// The cycle that is tiled into the future
    pub fn pattern(&self) -> &[f64] {
        &self.pattern
    }
}

/// Tile the last 24 hourly values of `series` over `horizon` hours
pub fn persistence(series: &HistoricalSeries, horizon: usize) -> Result<ForecastSeries> {
    PersistenceModel::default().forecast(series, horizon)
}
