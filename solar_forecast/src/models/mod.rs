//! Forecasting models and the forecast series they produce

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

/// Confidence attached to every forecast unless configured otherwise
pub const DEFAULT_CONFIDENCE: f64 = 0.87;

/// Forecasting method selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Repeat the most recent day
    #[serde(alias = "persistence")]
    Baseline,
    /// Seasonal ARIMA projection
    #[serde(alias = "arima", alias = "sarima")]
    Statistical,
    /// Weighted blend of statistical and baseline forecasts
    #[default]
    Ensemble,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Baseline => "baseline",
            ForecastMethod::Statistical => "statistical",
            ForecastMethod::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "baseline" | "persistence" => Ok(ForecastMethod::Baseline),
            "statistical" | "arima" | "sarima" => Ok(ForecastMethod::Statistical),
            "ensemble" | "blend" => Ok(ForecastMethod::Ensemble),
            _ => Err(ForecastError::InvalidMethod(s.to_string())),
        }
    }
}

/// Unit of the forecast values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUnit {
    /// Instantaneous power in kilowatts
    #[default]
    Kw,
    /// Energy in watt-hours accumulated over one interval
    Wh,
}

impl PowerUnit {
    /// Display label ("kW" / "Wh")
    pub fn label(&self) -> &'static str {
        match self {
            PowerUnit::Kw => "kW",
            PowerUnit::Wh => "Wh",
        }
    }
}

impl fmt::Display for PowerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PowerUnit {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kw" => Ok(PowerUnit::Kw),
            "wh" => Ok(PowerUnit::Wh),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Unsupported unit '{}': expected 'kw' or 'wh'",
                s
            ))),
        }
    }
}

/// Spacing between consecutive forecast points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "15min")]
    QuarterHourly,
}

impl Interval {
    /// Length of one step in minutes
    pub fn minutes(&self) -> u32 {
        match self {
            Interval::Hourly => 60,
            Interval::QuarterHourly => 15,
        }
    }

    /// Length of one step
    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "1h",
            Interval::QuarterHourly => "15min",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1h" | "60min" | "hourly" => Ok(Interval::Hourly),
            "15min" | "15m" | "quarter-hourly" => Ok(Interval::QuarterHourly),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Unsupported interval '{}': expected '1h' or '15min'",
                s
            ))),
        }
    }
}

/// One forecast value at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Forecast series with its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    /// Points in ascending time order
    points: Vec<ForecastPoint>,
    method: ForecastMethod,
    unit: PowerUnit,
    interval: Interval,
    confidence: f64,
}

impl ForecastSeries {
    /// Create a new kW forecast from points
    pub fn new(points: Vec<ForecastPoint>, method: ForecastMethod, interval: Interval) -> Self {
        Self {
            points,
            method,
            unit: PowerUnit::Kw,
            interval,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Create a forecast from values laid out at a fixed stride from `start`
    pub fn from_values(
        start: NaiveDateTime,
        values: Vec<f64>,
        method: ForecastMethod,
        interval: Interval,
    ) -> Self {
        let step = interval.step();
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| ForecastPoint {
                timestamp: start + step * i as i32,
                value,
            })
            .collect();
        Self::new(points, method, interval)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub(crate) fn with_unit(mut self, unit: PowerUnit) -> Self {
        self.unit = unit;
        self
    }

    pub(crate) fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub(crate) fn with_method(mut self, method: ForecastMethod) -> Self {
        self.method = method;
        self
    }

    /// Apply `f` to every value, keeping timestamps and metadata
    pub(crate) fn map_values<F: Fn(f64) -> f64>(mut self, f: F) -> Self {
        for point in &mut self.points {
            point.value = f(point.value);
        }
        self
    }

    /// Clip every value to a lower bound of zero
    pub fn clip_non_negative(self) -> Self {
        self.map_values(|v| v.max(0.0))
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ForecastPoint> {
        self.points.get(index)
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.last().map(|p| p.timestamp)
    }

    pub fn method(&self) -> ForecastMethod {
        self.method
    }

    pub fn unit(&self) -> PowerUnit {
        self.unit
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Mean of the forecast values, if any
    pub fn mean(&self) -> Option<f64> {
        solar_math::statistics::mean(&self.values()).ok()
    }

    /// Serialize the forecast to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reject an empty forecast horizon
pub(crate) fn ensure_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least one step".to_string(),
        ));
    }
    Ok(())
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate an hourly forecast for `horizon` future periods
    fn forecast(&self, horizon: usize) -> Result<ForecastSeries>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a historical series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a historical series
    fn train(&self, series: &HistoricalSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Uniform one-shot forecasting capability shared by every method
pub trait Forecaster: Debug {
    fn forecast(&self, series: &HistoricalSeries, horizon: usize) -> Result<ForecastSeries>;
}

impl<M: ForecastModel> Forecaster for M {
    fn forecast(&self, series: &HistoricalSeries, horizon: usize) -> Result<ForecastSeries> {
        ensure_horizon(horizon)?;
        self.train(series)?.forecast(horizon)
    }
}

pub mod ensemble;
pub mod persistence;
pub mod sarima;
