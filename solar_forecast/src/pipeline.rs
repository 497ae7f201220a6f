//! End-to-end forecasting pipeline
//!
//! A request runs validate → model → clip → resample → convert, and target
//! lookups then resolve a requested time on the finished forecast. Nothing is
//! cached between requests.

use crate::config::ForecastConfig;
use crate::data::{load_solar_csv, validate, HistoricalSeries, HistoricalStore};
use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, summarize, ForecastAccuracy, ForecastSummary};
use crate::models::ensemble::EnsembleModel;
use crate::models::persistence::PersistenceModel;
use crate::models::sarima::SarimaModel;
use crate::models::{
    ensure_horizon, ForecastMethod, ForecastPoint, ForecastSeries, Forecaster, Interval, PowerUnit,
};
use crate::resample::to_quarter_hour;
use crate::resolver::{self, resolve, MatchKind};
use crate::units::convert_to;
use crate::utils::parse_datetime;
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Points reported after the resolved target
pub const UPCOMING_POINTS: usize = 6;

/// Per-request overrides of the configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForecastRequest {
    pub method: Option<ForecastMethod>,
    /// Forecast steps in hours
    pub horizon: Option<usize>,
    pub interval: Option<Interval>,
    pub unit: Option<PowerUnit>,
}

impl ForecastRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: ForecastMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn unit(mut self, unit: PowerUnit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Span covered by a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Forecast value for one requested time, with context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetForecast {
    pub target_time: NaiveDateTime,
    pub target_hour: u32,
    /// Timestamp of the forecast point that answered the request
    pub forecast_time: NaiveDateTime,
    pub value: f64,
    pub match_kind: MatchKind,
    pub forecast_window: ForecastWindow,
    pub unit: PowerUnit,
    pub interval: Interval,
    pub method: ForecastMethod,
    pub confidence: f64,
    pub historical_points: usize,
    /// Forecast points starting at the resolved one
    pub upcoming: Vec<ForecastPoint>,
}

impl TargetForecast {
    /// Serialize the result to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of a hold-out evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub method: ForecastMethod,
    /// Hours held out and forecast
    pub holdout: usize,
    pub training_points: usize,
    pub accuracy: ForecastAccuracy,
}

/// Forecasting pipeline bound to one configuration
#[derive(Debug, Clone)]
pub struct SolarForecaster {
    config: ForecastConfig,
}

impl SolarForecaster {
    /// Create a pipeline; the configuration is validated once here
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Hourly kW forecast from the selected model, before post-processing
    fn model_forecast(
        &self,
        series: &HistoricalSeries,
        method: ForecastMethod,
        horizon: usize,
    ) -> Result<ForecastSeries> {
        let settings = &self.config.model;
        match method {
            ForecastMethod::Baseline => {
                PersistenceModel::new(settings.season_length)?.forecast(series, horizon)
            }
            ForecastMethod::Statistical => {
                SarimaModel::new(settings.order)?.forecast(series, horizon)
            }
            ForecastMethod::Ensemble => EnsembleModel::new(
                SarimaModel::new(settings.order)?,
                PersistenceModel::new(settings.season_length)?,
                self.config.blend_weight,
            )?
            .forecast(series, horizon),
        }
    }

    /// Forecast solar output from a historical series
    pub fn forecast(&self, series: &HistoricalSeries, request: &ForecastRequest) -> Result<ForecastSeries> {
        let method = request.method.unwrap_or(self.config.method);
        let horizon = request.horizon.unwrap_or(self.config.horizon);
        let interval = request.interval.unwrap_or(self.config.interval);
        let unit = request.unit.unwrap_or(self.config.output_unit);
        ensure_horizon(horizon)?;

        let series = series.tail(self.config.retention.forecast_window);
        let report = validate(&series, &self.config.validation)?;
        if !report.is_clean() {
            debug!(warnings = report.warnings.len(), "forecasting despite data warnings");
        }

        let mut forecast = self
            .model_forecast(&series, method, horizon)?
            .clip_non_negative()
            .with_method(method);
        if interval == Interval::QuarterHourly {
            forecast = to_quarter_hour(forecast)?;
        }
        let forecast = convert_to(forecast, unit)?.with_confidence(self.config.confidence);

        info!(
            %method,
            horizon,
            %interval,
            %unit,
            points = forecast.len(),
            history = series.len(),
            "forecast generated"
        );
        Ok(forecast)
    }

    /// Load a historical CSV file and forecast from its most recent window
    pub fn forecast_from_csv<P: AsRef<Path>>(
        &self,
        path: P,
        request: &ForecastRequest,
    ) -> Result<ForecastSeries> {
        let series = load_solar_csv(path, self.config.retention.forecast_window)?;
        self.forecast(&series, request)
    }

    /// Forecast from the readings held by `store`
    pub fn forecast_from_store(
        &self,
        store: &HistoricalStore,
        request: &ForecastRequest,
    ) -> Result<ForecastSeries> {
        self.forecast(&store.load()?, request)
    }

    /// Forecast value for `target`, even when it falls outside the horizon
    pub fn forecast_at(
        &self,
        series: &HistoricalSeries,
        target: NaiveDateTime,
        request: &ForecastRequest,
    ) -> Result<TargetForecast> {
        let forecast = self.forecast(series, request)?;
        let resolution = resolve(&forecast, target)?;

        let (Some(point), Some(start), Some(end)) = (
            forecast.get(resolution.index).copied(),
            forecast.first_timestamp(),
            forecast.last_timestamp(),
        ) else {
            return Err(ForecastError::InsufficientData {
                required: 1,
                actual: forecast.len(),
            });
        };

        let upcoming = forecast
            .points()
            .iter()
            .skip(resolution.index)
            .take(UPCOMING_POINTS)
            .copied()
            .collect();

        Ok(TargetForecast {
            target_time: target,
            target_hour: target.hour(),
            forecast_time: point.timestamp,
            value: point.value,
            match_kind: resolution.match_kind,
            forecast_window: ForecastWindow { start, end },
            unit: forecast.unit(),
            interval: forecast.interval(),
            method: forecast.method(),
            confidence: forecast.confidence(),
            historical_points: series.len().min(self.config.retention.forecast_window),
            upcoming,
        })
    }

    /// Same as [`forecast_at`](Self::forecast_at) with a textual target time
    pub fn forecast_at_str(
        &self,
        series: &HistoricalSeries,
        target: &str,
        request: &ForecastRequest,
    ) -> Result<TargetForecast> {
        let target = parse_datetime(target)?;
        self.forecast_at(series, target, request)
    }

    /// The `count` forecast points starting nearest to `now`
    pub fn next_intervals(
        &self,
        series: &HistoricalSeries,
        now: NaiveDateTime,
        count: usize,
        request: &ForecastRequest,
    ) -> Result<Vec<ForecastPoint>> {
        let forecast = self.forecast(series, request)?;
        Ok(resolver::next_intervals(&forecast, now, count))
    }

    /// Headline numbers of the forecast for `request`
    pub fn summary(&self, series: &HistoricalSeries, request: &ForecastRequest) -> Result<ForecastSummary> {
        summarize(&self.forecast(series, request)?)
    }

    /// Forecast the last `holdout` hours of `series` from the readings before
    /// them and score the result against what was observed
    pub fn backtest(
        &self,
        series: &HistoricalSeries,
        method: ForecastMethod,
        holdout: usize,
    ) -> Result<BacktestReport> {
        ensure_horizon(holdout)?;
        if holdout >= series.len() {
            return Err(ForecastError::InsufficientData {
                required: holdout + self.config.validation.min_points,
                actual: series.len(),
            });
        }

        let (training, actual) = series.split_at(series.len() - holdout);
        validate(&training, &self.config.validation)?;

        let predicted = self
            .model_forecast(&training, method, holdout)?
            .clip_non_negative()
            .values();
        let accuracy = forecast_accuracy(&predicted, &actual.solar_values())?;

        info!(%method, holdout, mae = accuracy.mae, rmse = accuracy.rmse, "backtest complete");
        Ok(BacktestReport {
            method,
            holdout,
            training_points: training.len(),
            accuracy,
        })
    }
}
