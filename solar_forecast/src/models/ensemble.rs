//! Fixed-weight ensemble of the statistical and persistence forecasts

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::persistence::{PersistenceModel, TrainedPersistence};
use crate::models::sarima::{SarimaModel, TrainedSarima};
use crate::models::{
    ensure_horizon, ForecastMethod, ForecastModel, ForecastPoint, ForecastSeries,
    TrainedForecastModel,
};
use tracing::debug;

/// Default share of the statistical forecast in the blend
pub const DEFAULT_BLEND_WEIGHT: f64 = 0.7;

/// Blend two forecasts pointwise and clip the result at zero.
///
/// Computes `weight * primary + (1 - weight) * persistence`. Both inputs must
/// cover exactly the same timestamps.
pub fn blend(
    primary: &ForecastSeries,
    persistence: &ForecastSeries,
    weight: f64,
) -> Result<ForecastSeries> {
    validate_weight(weight)?;

    if primary.len() != persistence.len() {
        return Err(ForecastError::Alignment(format!(
            "primary forecast has {} points but persistence has {}",
            primary.len(),
            persistence.len()
        )));
    }
    if primary.interval() != persistence.interval() || primary.unit() != persistence.unit() {
        return Err(ForecastError::Alignment(
            "forecasts differ in interval or unit".to_string(),
        ));
    }

    let points = primary
        .points()
        .iter()
        .zip(persistence.points())
        .map(|(a, b)| {
            if a.timestamp != b.timestamp {
                return Err(ForecastError::Alignment(format!(
                    "timestamps differ: {} vs {}",
                    a.timestamp, b.timestamp
                )));
            }
            Ok(ForecastPoint {
                timestamp: a.timestamp,
                value: (weight * a.value + (1.0 - weight) * b.value).max(0.0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(
        ForecastSeries::new(points, ForecastMethod::Ensemble, primary.interval())
            .with_unit(primary.unit())
            .with_confidence(primary.confidence()),
    )
}

fn validate_weight(weight: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(ForecastError::InvalidParameter(format!(
            "Blend weight must be within [0, 1], got {}",
            weight
        )));
    }
    Ok(())
}

/// Ensemble of a seasonal ARIMA model and the persistence baseline
#[derive(Debug, Clone)]
pub struct EnsembleModel {
    /// Name of the model
    name: String,
    statistical: SarimaModel,
    baseline: PersistenceModel,
    /// Share of the statistical forecast
    weight: f64,
}

/// Trained ensemble
#[derive(Debug, Clone)]
pub struct TrainedEnsemble {
    name: String,
    statistical: TrainedSarima,
    baseline: TrainedPersistence,
    weight: f64,
}

impl EnsembleModel {
    /// Create a new ensemble giving `weight` to the statistical model
    pub fn new(statistical: SarimaModel, baseline: PersistenceModel, weight: f64) -> Result<Self> {
        validate_weight(weight)?;
        Ok(Self {
            name: format!(
                "Ensemble ({:.0}% {} + {:.0}% {})",
                weight * 100.0,
                statistical.name(),
                (1.0 - weight) * 100.0,
                baseline.name()
            ),
            statistical,
            baseline,
            weight,
        })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl ForecastModel for EnsembleModel {
    type Trained = TrainedEnsemble;

    fn train(&self, series: &HistoricalSeries) -> Result<TrainedEnsemble> {
        // A statistical fit failure aborts the whole ensemble.
        let statistical = self.statistical.train(series)?;
        let baseline = self.baseline.train(series)?;

        Ok(TrainedEnsemble {
            name: self.name.clone(),
            statistical,
            baseline,
            weight: self.weight,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedEnsemble {
    fn forecast(&self, horizon: usize) -> Result<ForecastSeries> {
        ensure_horizon(horizon)?;

        let primary = self.statistical.forecast(horizon)?;
        let persistence = self.baseline.forecast(horizon)?;
        debug!(
            horizon,
            weight = self.weight,
            statistical_mean = primary.mean(),
            baseline_mean = persistence.mean(),
            "blending forecasts"
        );

        blend(&primary, &persistence, self.weight)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn forecast(values: Vec<f64>, method: ForecastMethod) -> ForecastSeries {
        ForecastSeries::from_values(start(), values, method, Interval::Hourly)
    }

    #[test]
    fn test_blend_weights_and_clips() {
        let primary = forecast(vec![10.0, -5.0, 4.0], ForecastMethod::Statistical);
        let baseline = forecast(vec![0.0, 1.0, 4.0], ForecastMethod::Baseline);

        let blended = blend(&primary, &baseline, 0.7).unwrap();
        let values = blended.values();

        assert_relative_eq!(values[0], 7.0);
        // 0.7 * -5 + 0.3 * 1 is negative and clipped
        assert_eq!(values[1], 0.0);
        assert_relative_eq!(values[2], 4.0);
        assert_eq!(blended.method(), ForecastMethod::Ensemble);
    }

    #[test]
    fn test_blend_rejects_length_mismatch() {
        let primary = forecast(vec![1.0, 2.0], ForecastMethod::Statistical);
        let baseline = forecast(vec![1.0], ForecastMethod::Baseline);

        assert!(matches!(
            blend(&primary, &baseline, 0.7),
            Err(ForecastError::Alignment(_))
        ));
    }

    #[test]
    fn test_blend_rejects_shifted_timestamps() {
        let primary = forecast(vec![1.0, 2.0], ForecastMethod::Statistical);
        let baseline = ForecastSeries::from_values(
            start() + Duration::hours(1),
            vec![1.0, 2.0],
            ForecastMethod::Baseline,
            Interval::Hourly,
        );

        assert!(matches!(
            blend(&primary, &baseline, 0.7),
            Err(ForecastError::Alignment(_))
        ));
    }

    #[test]
    fn test_blend_rejects_invalid_weight() {
        let primary = forecast(vec![1.0], ForecastMethod::Statistical);
        assert!(matches!(
            blend(&primary, &primary, 1.5),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ensemble_model_name() {
        let model = EnsembleModel::new(
            SarimaModel::default(),
            PersistenceModel::default(),
            DEFAULT_BLEND_WEIGHT,
        )
        .unwrap();
        assert!(model.name().starts_with("Ensemble (70% SARIMA"));
        assert_relative_eq!(model.weight(), 0.7);
    }
}
