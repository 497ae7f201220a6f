//! # Solar Math
//!
//! Numeric building blocks for the solar forecasting pipeline.
//! This crate keeps the arithmetic free of any notion of timestamps or
//! readings so it can be tested on plain slices.

use thiserror::Error;

pub mod differencing;
pub mod interpolation;
pub mod linalg;
pub mod statistics;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
