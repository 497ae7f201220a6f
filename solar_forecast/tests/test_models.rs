mod common;

use common::{clear_history, sunny_history};
use solar_forecast::models::ensemble::{blend, EnsembleModel};
use solar_forecast::models::persistence::{persistence, PersistenceModel};
use solar_forecast::models::sarima::{arima, SarimaModel, SarimaOrder};
use solar_forecast::models::{ForecastModel, Forecaster, TrainedForecastModel};
use solar_forecast::{ForecastError, ForecastMethod};

#[test]
fn test_models_share_timestamps() {
    let history = sunny_history(7, 21);

    let baseline = persistence(&history, 48).unwrap();
    let statistical = arima(&history, 48).unwrap();

    assert_eq!(baseline.timestamps(), statistical.timestamps());
    assert_eq!(baseline.method(), ForecastMethod::Baseline);
    assert_eq!(statistical.method(), ForecastMethod::Statistical);

    let blended = blend(&statistical, &baseline, 0.7).unwrap();
    assert_eq!(blended.len(), 48);
    assert!(blended.values().iter().all(|v| *v >= 0.0));
}

#[test]
fn test_blend_weight_extremes() {
    let history = sunny_history(7, 21);
    let baseline = persistence(&history, 24).unwrap();
    let statistical = arima(&history, 24).unwrap().clip_non_negative();

    let only_baseline = blend(&statistical, &baseline, 0.0).unwrap();
    assert_eq!(only_baseline.values(), baseline.values());

    let only_statistical = blend(&statistical, &baseline, 1.0).unwrap();
    assert_eq!(only_statistical.values(), statistical.values());
}

#[test]
fn test_trained_sarima_is_reusable() {
    let history = clear_history(7);
    let trained = SarimaModel::default().train(&history).unwrap();

    let short = trained.forecast(6).unwrap();
    let long = trained.forecast(30).unwrap();
    assert_eq!(short.values()[..], long.values()[..6]);
    assert!(trained.name().contains("SARIMA"));
}

#[test]
fn test_non_seasonal_order() {
    let order = SarimaOrder {
        p: 1,
        d: 1,
        q: 1,
        seasonal_p: 0,
        seasonal_d: 0,
        seasonal_q: 0,
        period: 0,
    };
    let model = SarimaModel::new(order).unwrap();
    let forecast = model.forecast(&sunny_history(7, 2), 12).unwrap();

    assert_eq!(forecast.len(), 12);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_ensemble_model_through_trait_object() {
    let models: Vec<Box<dyn Forecaster>> = vec![
        Box::new(PersistenceModel::default()),
        Box::new(SarimaModel::default()),
        Box::new(
            EnsembleModel::new(SarimaModel::default(), PersistenceModel::default(), 0.7).unwrap(),
        ),
    ];

    let history = sunny_history(7, 4);
    for model in &models {
        assert_eq!(model.forecast(&history, 10).unwrap().len(), 10);
    }
}

#[test]
fn test_invalid_ensemble_weight() {
    let result = EnsembleModel::new(SarimaModel::default(), PersistenceModel::default(), -0.1);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}
