//! Descriptive statistics over plain slices

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean of a non-empty slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Mean of an empty series is undefined".to_string(),
        ));
    }
    Ok(values.iter().mean())
}

/// Largest value of a non-empty slice
pub fn max(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Maximum of an empty series is undefined".to_string(),
        ));
    }
    Ok(Statistics::max(values.iter()))
}

/// Population variance (divides by `n`)
pub fn population_variance(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Variance of an empty series is undefined".to_string(),
        ));
    }
    Ok(values.iter().population_variance())
}

/// Biased sample autocovariances for lags `0..=max_lag`.
///
/// Each lag is normalised by `n` rather than `n - k`, which keeps the
/// resulting Toeplitz matrix positive semi-definite.
pub fn autocovariance(values: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    if values.len() <= max_lag {
        return Err(MathError::InsufficientData(format!(
            "Autocovariance up to lag {} needs more than {} observations, have {}",
            max_lag,
            max_lag,
            values.len()
        )));
    }

    let n = values.len();
    let mu = mean(values)?;
    let centered: Vec<f64> = values.iter().map(|v| v - mu).collect();

    let acov = (0..=max_lag)
        .map(|k| {
            centered[k..]
                .iter()
                .zip(&centered[..n - k])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect();

    Ok(acov)
}
