//! # Solar Forecast
//!
//! Short-horizon solar power forecasting from a rolling window of hourly
//! historical readings.
//!
//! ## Features
//!
//! - CSV-backed history with windowing, deduplication and forward-filling
//! - Persistence baseline and seasonal ARIMA forecasts, blended by a fixed weight
//! - Resampling to 15-minute steps and conversion between kW and Wh
//! - Target-time lookup that falls back to the daily pattern beyond the horizon
//! - Accuracy metrics and hold-out backtests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use solar_forecast::{ForecastConfig, ForecastRequest, HistoricalStore, SolarForecaster};
//! use solar_forecast::models::Interval;
//!
//! # fn main() -> solar_forecast::Result<()> {
//! let store = HistoricalStore::new("data/solar_history.csv");
//! let history = store.load()?;
//!
//! let forecaster = SolarForecaster::new(ForecastConfig::default())?;
//! let request = ForecastRequest::new().interval(Interval::QuarterHourly);
//!
//! let forecast = forecaster.forecast(&history, &request)?;
//! println!("{}", forecast.to_json()?);
//!
//! let target = forecaster.forecast_at_str(&history, "2026-02-01 14:00", &request)?;
//! println!("{} {} ({})", target.value, target.unit, target.match_kind);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod resample;
pub mod resolver;
pub mod units;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{HistoricalSeries, HistoricalStore, Reading};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastMethod, ForecastSeries, Forecaster};
pub use crate::pipeline::{ForecastRequest, SolarForecaster, TargetForecast};
pub use crate::resolver::MatchKind;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
