//! Forecast configuration loaded from TOML with environment overrides

use crate::data::{FORECAST_WINDOW, STORE_CAPACITY};
use crate::error::{ForecastError, Result};
use crate::models::ensemble::DEFAULT_BLEND_WEIGHT;
use crate::models::persistence::DAILY_SEASON;
use crate::models::sarima::SarimaOrder;
use crate::models::{ForecastMethod, Interval, PowerUnit, DEFAULT_CONFIDENCE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_METHOD: &str = "SOLAR_FORECAST_METHOD";
pub const ENV_HORIZON: &str = "SOLAR_FORECAST_HORIZON";
pub const ENV_UNIT: &str = "SOLAR_FORECAST_UNIT";
pub const ENV_INTERVAL: &str = "SOLAR_FORECAST_INTERVAL";
pub const ENV_BLEND_WEIGHT: &str = "SOLAR_FORECAST_BLEND_WEIGHT";

/// Read-only settings for one forecasting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Method used when a request names none
    pub method: ForecastMethod,
    /// Forecast steps in hours
    pub horizon: usize,
    /// Share of the statistical forecast in the ensemble
    pub blend_weight: f64,
    pub output_unit: PowerUnit,
    pub interval: Interval,
    /// Confidence reported with every forecast
    pub confidence: f64,
    pub model: ModelSettings,
    pub retention: RetentionSettings,
    pub validation: ValidationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub order: SarimaOrder,
    /// Points in the persistence pattern
    pub season_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    /// Most recent points used as forecasting input
    pub forecast_window: usize,
    /// Most recent points kept by the store
    pub store_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Fewer points than this is an error
    pub min_points: usize,
    /// Solar readings above this are reported as implausible
    pub solar_ceiling_kw: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            method: ForecastMethod::default(),
            horizon: 48,
            blend_weight: DEFAULT_BLEND_WEIGHT,
            output_unit: PowerUnit::default(),
            interval: Interval::default(),
            confidence: DEFAULT_CONFIDENCE,
            model: ModelSettings::default(),
            retention: RetentionSettings::default(),
            validation: ValidationSettings::default(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            order: SarimaOrder::default(),
            season_length: DAILY_SEASON,
        }
    }
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            forecast_window: FORECAST_WINDOW,
            store_capacity: STORE_CAPACITY,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            min_points: 24,
            solar_ceiling_kw: 50.0,
        }
    }
}

impl ForecastConfig {
    /// Read and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded forecast config");
        Ok(config)
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SOLAR_FORECAST_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, then validate
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(method) = lookup(ENV_METHOD) {
            self.method = method.parse()?;
        }
        if let Some(horizon) = lookup(ENV_HORIZON) {
            self.horizon = horizon.trim().parse().map_err(|_| {
                ForecastError::Config(format!("{} must be an integer, got '{}'", ENV_HORIZON, horizon))
            })?;
        }
        if let Some(unit) = lookup(ENV_UNIT) {
            self.output_unit = unit.parse()?;
        }
        if let Some(interval) = lookup(ENV_INTERVAL) {
            self.interval = interval.parse()?;
        }
        if let Some(weight) = lookup(ENV_BLEND_WEIGHT) {
            self.blend_weight = weight.trim().parse().map_err(|_| {
                ForecastError::Config(format!(
                    "{} must be a number, got '{}'",
                    ENV_BLEND_WEIGHT, weight
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::Config("horizon must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.blend_weight) {
            return Err(ForecastError::Config(format!(
                "blend_weight must be within [0, 1], got {}",
                self.blend_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ForecastError::Config(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            )));
        }
        if self.model.season_length == 0 {
            return Err(ForecastError::Config(
                "model.season_length must be at least 1".to_string(),
            ));
        }
        self.model
            .order
            .validate()
            .map_err(|e| ForecastError::Config(format!("model.order: {}", e)))?;
        if self.retention.forecast_window < self.validation.min_points {
            return Err(ForecastError::Config(format!(
                "retention.forecast_window ({}) is smaller than validation.min_points ({})",
                self.retention.forecast_window, self.validation.min_points
            )));
        }
        if self.retention.store_capacity < self.retention.forecast_window {
            return Err(ForecastError::Config(format!(
                "retention.store_capacity ({}) is smaller than retention.forecast_window ({})",
                self.retention.store_capacity, self.retention.forecast_window
            )));
        }
        if !self.validation.solar_ceiling_kw.is_finite() || self.validation.solar_ceiling_kw <= 0.0 {
            return Err(ForecastError::Config(
                "validation.solar_ceiling_kw must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
