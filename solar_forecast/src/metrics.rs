//! Forecast summaries and accuracy metrics

use crate::error::{ForecastError, Result};
use crate::models::{ForecastSeries, PowerUnit};
use serde::Serialize;
use solar_math::statistics::mean;

/// Headline numbers of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// First forecast value
    pub next: f64,
    /// Mean of the first 6 steps
    pub next_6_mean: f64,
    /// Mean of the first 24 steps
    pub next_24_mean: f64,
    /// Mean over the whole horizon
    pub overall_mean: f64,
    pub unit: PowerUnit,
}

/// Summarize a forecast; shorter forecasts average what they have
pub fn summarize(forecast: &ForecastSeries) -> Result<ForecastSummary> {
    let values = forecast.values();
    let next = *values.first().ok_or(ForecastError::InsufficientData {
        required: 1,
        actual: 0,
    })?;

    let head_mean = |count: usize| mean(&values[..count.min(values.len())]);
    let to_error = |e: solar_math::MathError| ForecastError::DataError(e.to_string());

    Ok(ForecastSummary {
        next,
        next_6_mean: head_mean(6).map_err(to_error)?,
        next_24_mean: head_mean(24).map_err(to_error)?,
        overall_mean: mean(&values).map_err(to_error)?,
        unit: forecast.unit(),
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Night hours have zero actuals and are left out of MAPE.
    let (pct_sum, pct_count) = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&a, &e)| {
            (sum + e.abs() / a.abs() * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        0.0
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastMethod, Interval};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_accuracy_metrics() {
        let accuracy = forecast_accuracy(&[1.0, 2.0, 0.0, 4.0], &[2.0, 2.0, 0.0, 2.0]).unwrap();

        assert_relative_eq!(accuracy.mae, 0.75);
        assert_relative_eq!(accuracy.mse, 1.25);
        assert_relative_eq!(accuracy.rmse, 1.25f64.sqrt());
        // (50% + 0% + 100%) / 3 non-zero actuals
        assert_relative_eq!(accuracy.mape, 50.0);
        // (200/3 + 0 + 0 + 200/3) / 4
        assert_relative_eq!(accuracy.smape, 100.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_accuracy_rejects_mismatched_lengths() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_summary() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let values: Vec<f64> = (0..48).map(|i| i as f64).collect();
        let forecast =
            ForecastSeries::from_values(start, values, ForecastMethod::Ensemble, Interval::Hourly);

        let summary = summarize(&forecast).unwrap();
        assert_eq!(summary.next, 0.0);
        assert_relative_eq!(summary.next_6_mean, 2.5);
        assert_relative_eq!(summary.next_24_mean, 11.5);
        assert_relative_eq!(summary.overall_mean, 23.5);
        assert_eq!(summary.unit, PowerUnit::Kw);
    }

    #[test]
    fn test_summary_of_short_forecast() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let forecast = ForecastSeries::from_values(
            start,
            vec![2.0, 4.0],
            ForecastMethod::Baseline,
            Interval::Hourly,
        );

        let summary = summarize(&forecast).unwrap();
        assert_relative_eq!(summary.next_6_mean, 3.0);
        assert_relative_eq!(summary.next_24_mean, 3.0);
    }
}
