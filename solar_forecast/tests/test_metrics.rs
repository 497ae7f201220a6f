mod common;

use approx::assert_relative_eq;
use common::sunny_history;
use solar_forecast::metrics::{forecast_accuracy, summarize};
use solar_forecast::models::persistence::persistence;
use solar_forecast::ForecastError;

#[test]
fn test_perfect_forecast_scores_zero() {
    let actual = vec![0.0, 1.5, 4.0, 6.5, 2.0, 0.0];
    let accuracy = forecast_accuracy(&actual, &actual).unwrap();

    assert_eq!(accuracy.mae, 0.0);
    assert_eq!(accuracy.rmse, 0.0);
    assert_eq!(accuracy.mape, 0.0);
    assert_eq!(accuracy.smape, 0.0);
}

#[test]
fn test_all_night_actuals_have_zero_mape() {
    let accuracy = forecast_accuracy(&[0.5, 0.0], &[0.0, 0.0]).unwrap();
    assert_eq!(accuracy.mape, 0.0);
    assert_relative_eq!(accuracy.smape, 100.0);
    assert_relative_eq!(accuracy.mae, 0.25);
}

#[test]
fn test_accuracy_display() {
    let accuracy = forecast_accuracy(&[1.0, 2.0], &[1.0, 4.0]).unwrap();
    let text = accuracy.to_string();
    assert!(text.contains("MAE:   1.0000"));
    assert!(text.contains("RMSE:"));
}

#[test]
fn test_summary_of_baseline() {
    let history = sunny_history(7, 8);
    let forecast = persistence(&history, 48).unwrap();
    let summary = summarize(&forecast).unwrap();

    let solar = history.solar_values();
    let last_day = &solar[solar.len() - 24..];
    assert_eq!(summary.next, last_day[0]);
    assert_relative_eq!(
        summary.next_24_mean,
        last_day.iter().sum::<f64>() / 24.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(summary.overall_mean, summary.next_24_mean, epsilon = 1e-9);
}

#[test]
fn test_mismatched_lengths() {
    assert!(matches!(
        forecast_accuracy(&[1.0, 2.0], &[1.0]),
        Err(ForecastError::InvalidParameter(_))
    ));
}
