//! Error types for the solar_forecast crate

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the solar_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The historical data source does not exist
    #[error("Historical data not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Too few historical points to forecast from
    #[error("Insufficient data: need at least {required} points, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Unrecognised forecasting method name
    #[error("Invalid forecast method '{0}': expected 'baseline', 'statistical' or 'ensemble'")]
    InvalidMethod(String),

    /// The statistical model could not be fitted or projected
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Forecasts to be blended do not share a time index
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// A timestamp could not be parsed
    #[error("Invalid time '{0}'")]
    InvalidTime(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed historical data
    #[error("Data error: {0}")]
    DataError(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
