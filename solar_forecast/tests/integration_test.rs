mod common;

use chrono::{Duration, NaiveDate, Timelike};
use common::{clear_history, history_end, sunny_history};
use pretty_assertions::assert_eq;
use rstest::rstest;
use solar_forecast::models::{Interval, PowerUnit};
use solar_forecast::{
    ForecastConfig, ForecastError, ForecastMethod, ForecastRequest, HistoricalStore, MatchKind,
    SolarForecaster,
};
use tempfile::tempdir;

fn forecaster() -> SolarForecaster {
    SolarForecaster::new(ForecastConfig::default()).unwrap()
}

#[test]
fn test_full_forecast_workflow() {
    let dir = tempdir().unwrap();
    let store = HistoricalStore::new(dir.path().join("solar_history.csv"));

    // Persist a week of readings through the store, then forecast from it.
    for reading in sunny_history(7, 11).readings() {
        store
            .append(reading.timestamp, reading.solar_power_kw, reading.load_total_kw)
            .unwrap();
    }
    let history = store.load().unwrap();
    assert_eq!(history.len(), 168);

    let forecast = forecaster()
        .forecast_from_store(&store, &ForecastRequest::new())
        .unwrap();

    let first = NaiveDate::from_ymd_opt(2026, 2, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(forecast.len(), 48);
    assert_eq!(forecast.first_timestamp(), Some(first));
    assert_eq!(forecast.method(), ForecastMethod::Ensemble);
    assert_eq!(forecast.unit(), PowerUnit::Kw);
    assert!(forecast.values().iter().all(|v| *v >= 0.0 && v.is_finite()));
}

#[test]
fn test_forecast_at_inside_window_is_exact() {
    let history = sunny_history(7, 42);
    let target = forecaster()
        .forecast_at_str(&history, "2026-02-01 14:00", &ForecastRequest::new())
        .unwrap();

    assert_eq!(target.match_kind, MatchKind::Exact);
    assert_eq!(target.forecast_time, target.target_time);
    assert_eq!(target.target_hour, 14);
    assert_eq!(target.historical_points, 168);
    assert_eq!(target.upcoming.len(), 6);
    assert_eq!(target.upcoming[0].timestamp, target.forecast_time);
    assert_eq!(target.confidence, 0.87);
    assert!(target.value > 0.0);
}

#[test]
fn test_forecast_at_beyond_window_uses_pattern() {
    let history = sunny_history(7, 42);
    let target = forecaster()
        .forecast_at_str(&history, "2026-02-10 14:00", &ForecastRequest::new())
        .unwrap();

    assert_eq!(target.match_kind, MatchKind::Pattern);
    assert_eq!(target.forecast_time.hour(), 14);
    assert_eq!(
        target.forecast_time,
        history_end() + Duration::hours(15)
    );
    assert_eq!(target.forecast_window.end, history_end() + Duration::hours(48));

    let json = target.to_json().unwrap();
    assert!(json.contains("\"match_kind\": \"pattern\""));
}

#[test]
fn test_forecast_at_rejects_bad_time() {
    let history = sunny_history(7, 42);
    let result = forecaster().forecast_at_str(&history, "next tuesday", &ForecastRequest::new());
    assert!(matches!(result, Err(ForecastError::InvalidTime(_))));
}

#[rstest]
#[case(ForecastMethod::Baseline, 1)]
#[case(ForecastMethod::Baseline, 48)]
#[case(ForecastMethod::Statistical, 12)]
#[case(ForecastMethod::Statistical, 48)]
#[case(ForecastMethod::Ensemble, 24)]
#[case(ForecastMethod::Ensemble, 72)]
fn test_forecast_length_and_bounds(#[case] method: ForecastMethod, #[case] horizon: usize) {
    let history = sunny_history(7, 7);
    let forecast = forecaster()
        .forecast(&history, &ForecastRequest::new().method(method).horizon(horizon))
        .unwrap();

    assert_eq!(forecast.len(), horizon);
    assert_eq!(forecast.method(), method);
    assert!(forecast.values().iter().all(|v| *v >= 0.0));
}

#[test]
fn test_baseline_repeats_last_day() {
    let history = sunny_history(7, 3);
    let forecast = forecaster()
        .forecast(
            &history,
            &ForecastRequest::new().method(ForecastMethod::Baseline).horizon(24),
        )
        .unwrap();

    let solar = history.solar_values();
    assert_eq!(forecast.values(), solar[solar.len() - 24..].to_vec());
}

#[test]
fn test_statistical_forecast_follows_clear_days() {
    let history = clear_history(7);
    let forecast = forecaster()
        .forecast(
            &history,
            &ForecastRequest::new().method(ForecastMethod::Statistical).horizon(24),
        )
        .unwrap();

    let solar = history.solar_values();
    for (predicted, observed) in forecast.values().iter().zip(&solar[solar.len() - 24..]) {
        assert!((predicted - observed).abs() < 1e-3);
    }
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(9)]
fn test_ensemble_mean_between_components(#[case] seed: u64) {
    let history = sunny_history(7, seed);
    let forecaster = forecaster();
    let mean_of = |method| {
        forecaster
            .forecast(&history, &ForecastRequest::new().method(method))
            .unwrap()
            .mean()
            .unwrap()
    };

    let baseline = mean_of(ForecastMethod::Baseline);
    let statistical = mean_of(ForecastMethod::Statistical);
    let ensemble = mean_of(ForecastMethod::Ensemble);

    let low = baseline.min(statistical) * 0.9;
    let high = baseline.max(statistical) * 1.1;
    assert!(
        (low..=high).contains(&ensemble),
        "ensemble mean {} outside [{}, {}]",
        ensemble,
        low,
        high
    );
}

#[test]
fn test_quarter_hour_output() {
    let history = sunny_history(7, 42);
    let forecaster = forecaster();
    let hourly = forecaster
        .forecast(&history, &ForecastRequest::new().horizon(24))
        .unwrap();
    let quarter = forecaster
        .forecast(
            &history,
            &ForecastRequest::new().horizon(24).interval(Interval::QuarterHourly),
        )
        .unwrap();

    assert_eq!(quarter.len(), 96);
    assert_eq!(quarter.interval(), Interval::QuarterHourly);
    for (i, value) in hourly.values().iter().enumerate() {
        approx::assert_relative_eq!(quarter.values()[i * 4], *value, epsilon = 1e-9);
    }
    assert_eq!(
        quarter.get(1).unwrap().timestamp - quarter.get(0).unwrap().timestamp,
        Duration::minutes(15)
    );
}

#[test]
fn test_energy_output_matches_power() {
    let history = sunny_history(7, 42);
    let forecaster = forecaster();
    let request = ForecastRequest::new().interval(Interval::QuarterHourly);

    let power = forecaster.forecast(&history, &request).unwrap();
    let energy = forecaster
        .forecast(&history, &request.unit(PowerUnit::Wh))
        .unwrap();

    assert_eq!(energy.unit(), PowerUnit::Wh);
    for (kw, wh) in power.values().iter().zip(energy.values()) {
        approx::assert_relative_eq!(wh, kw * 250.0, epsilon = 1e-6);
    }
}

#[test]
fn test_short_history_is_rejected() {
    let history = sunny_history(7, 42).tail(20);
    let result = forecaster().forecast(&history, &ForecastRequest::new());
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { required: 24, actual: 20 })
    ));
}

#[test]
fn test_three_days_support_the_default_ensemble() {
    let history = sunny_history(3, 42);

    let forecast = forecaster()
        .forecast(&history, &ForecastRequest::new())
        .unwrap();
    assert_eq!(forecast.method(), ForecastMethod::Ensemble);
    assert_eq!(forecast.len(), 48);
    assert!(forecast.values().iter().all(|v| *v >= 0.0));

    assert!(forecaster()
        .forecast(&history, &ForecastRequest::new().method(ForecastMethod::Statistical))
        .is_ok());
}

#[test]
fn test_statistical_needs_more_than_a_day() {
    // One day plus an hour is fully consumed by differencing.
    let history = sunny_history(2, 42).tail(25);
    let result = forecaster().forecast(
        &history,
        &ForecastRequest::new().method(ForecastMethod::Statistical),
    );
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));

    // The ensemble fails with it.
    let result = forecaster().forecast(&history, &ForecastRequest::new());
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));

    // The baseline still works.
    assert!(forecaster()
        .forecast(&history, &ForecastRequest::new().method(ForecastMethod::Baseline))
        .is_ok());
}

#[test]
fn test_zero_horizon_is_rejected() {
    let history = sunny_history(7, 42);
    let result = forecaster().forecast(&history, &ForecastRequest::new().horizon(0));
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_next_intervals_and_summary() {
    let history = sunny_history(7, 42);
    let forecaster = forecaster();
    let request = ForecastRequest::new().interval(Interval::QuarterHourly);

    let now = history_end() + Duration::minutes(12 * 60 + 50);
    let upcoming = forecaster.next_intervals(&history, now, 4, &request).unwrap();
    assert_eq!(upcoming.len(), 4);
    assert_eq!(upcoming[0].timestamp, history_end() + Duration::minutes(12 * 60 + 45));

    let summary = forecaster.summary(&history, &request).unwrap();
    assert!(summary.next_24_mean >= 0.0);
    assert!(summary.overall_mean > 0.0);
}

#[test]
fn test_backtest_scores_holdout() {
    let history = sunny_history(7, 42);
    let forecaster = forecaster();

    let baseline = forecaster
        .backtest(&history, ForecastMethod::Baseline, 24)
        .unwrap();
    assert_eq!(baseline.training_points, 144);
    assert!(baseline.accuracy.mae < 1.0);

    let ensemble = forecaster
        .backtest(&history, ForecastMethod::Ensemble, 24)
        .unwrap();
    assert!(ensemble.accuracy.rmse.is_finite());

    assert!(forecaster
        .backtest(&history, ForecastMethod::Baseline, 168)
        .is_err());
}
