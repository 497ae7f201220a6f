//! # Solar Forecast Workspace
//!
//! Facade over the workspace crates:
//!
//! - [`solar_math`]: differencing, regression, interpolation and statistics
//!   on plain slices
//! - [`solar_forecast`]: historical data handling, forecasting models and the
//!   end-to-end pipeline
//!
//! ```
//! use solar_forecast_workspace::solar_forecast::models::ForecastMethod;
//!
//! let method: ForecastMethod = "arima".parse().unwrap();
//! assert_eq!(method, ForecastMethod::Statistical);
//! ```

pub use solar_forecast;
pub use solar_math;
