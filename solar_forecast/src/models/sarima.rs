//! Seasonal ARIMA models for solar power forecasting
//!
//! The model is `SARIMA(p, d, q)(P, D, Q, s)`: the solar channel is
//! differenced with `(1 - B)^d (1 - B^s)^D`, an ARMA model with ordinary and
//! seasonal lags is fitted to the differenced series, and projections are
//! integrated back onto the original scale.
//!
//! ## Fitting
//!
//! Coefficients are estimated with the Hannan-Rissanen procedure:
//!
//! 1. A long autoregression (Yule-Walker via Levinson-Durbin) estimates the
//!    unobserved innovations.
//! 2. Least squares regresses the differenced series on its own AR lags and
//!    on the lagged innovation estimates (MA lags).
//!
//! Seasonal lags enter the regression additively. A perfectly periodic series
//! differences to zero and fits as an all-zero model, which projects the last
//! cycle forward.
//!
//! Short histories keep the differencing but shed lags they cannot support:
//! seasonal lags go first, then MA lags, then every regressor. The long
//! autoregression is capped at a third of the differenced observations. Only
//! a series too short to difference fails.

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    ensure_horizon, ForecastMethod, ForecastModel, ForecastPoint, ForecastSeries, Forecaster,
    Interval, TrainedForecastModel,
};
use crate::utils::future_timestamps;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use solar_math::differencing::{apply_difference, differencing_polynomial, integrate};
use solar_math::linalg::{least_squares, levinson_durbin};
use solar_math::statistics::{autocovariance, mean, population_variance};
use tracing::debug;

/// Ridge penalty keeping the regression solvable on flat input
const RIDGE: f64 = 1e-8;

/// Observations required beyond the number of regressors
const MIN_DEGREES_OF_FREEDOM: usize = 10;

/// Fixed model orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub seasonal_p: usize,
    /// Seasonal differencing order (D)
    pub seasonal_d: usize,
    /// Seasonal MA order (Q)
    pub seasonal_q: usize,
    /// Season length in steps (s)
    pub period: usize,
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self {
            p: 2,
            d: 1,
            q: 2,
            seasonal_p: 1,
            seasonal_d: 1,
            seasonal_q: 1,
            period: 24,
        }
    }
}

impl SarimaOrder {
    fn ar_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.p).collect();
        lags.extend((1..=self.seasonal_p).map(|k| k * self.period));
        lags.sort_unstable();
        lags.dedup();
        lags
    }

    fn ma_lags(&self) -> Vec<usize> {
        let mut lags: Vec<usize> = (1..=self.q).collect();
        lags.extend((1..=self.seasonal_q).map(|k| k * self.period));
        lags.sort_unstable();
        lags.dedup();
        lags
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if (self.seasonal_p > 0 || self.seasonal_d > 0 || self.seasonal_q > 0) && self.period < 2 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be at least 2 when seasonal terms are used".to_string(),
            ));
        }
        if self.d > 2 || self.seasonal_d > 1 {
            return Err(ForecastError::InvalidParameter(
                "Differencing order must be <= 2 and seasonal differencing <= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct SarimaModel {
    /// Name of the model
    name: String,
    /// Model orders
    order: SarimaOrder,
}

/// Trained seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarima {
    /// Name of the model
    name: String,
    /// Differencing lag polynomial
    difference_poly: Vec<f64>,
    /// Lags and coefficients of the AR terms
    ar_terms: Vec<(usize, f64)>,
    /// Lags and coefficients of the MA terms
    ma_terms: Vec<(usize, f64)>,
    /// Mean of the differenced series (zero when differenced)
    constant: f64,
    /// Historical solar values
    history: Vec<f64>,
    /// Differenced, demeaned history
    differenced: Vec<f64>,
    /// In-sample innovations aligned with `differenced`
    residuals: Vec<f64>,
    /// Timestamp of the last observation
    last_timestamp: NaiveDateTime,
}

impl SarimaModel {
    /// Create a new SARIMA model
    pub fn new(order: SarimaOrder) -> Result<Self> {
        order.validate()?;
        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{},{})",
                order.p,
                order.d,
                order.q,
                order.seasonal_p,
                order.seasonal_d,
                order.seasonal_q,
                order.period
            ),
            order,
        })
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }
}

impl Default for SarimaModel {
    fn default() -> Self {
        Self {
            name: "SARIMA(2,1,2)(1,1,1,24)".to_string(),
            order: SarimaOrder::default(),
        }
    }
}

fn fit_error(context: &str) -> impl Fn(solar_math::MathError) -> ForecastError + '_ {
    move |err| ForecastError::ModelFit(format!("{}: {}", context, err))
}

/// Lags the differenced series can support
struct LagPlan {
    ar_lags: Vec<usize>,
    ma_lags: Vec<usize>,
    long_order: usize,
    start: usize,
}

impl LagPlan {
    fn new(ar_lags: Vec<usize>, ma_lags: Vec<usize>, n: usize) -> Self {
        let max_ar = ar_lags.last().copied().unwrap_or(0);
        let max_ma = ma_lags.last().copied().unwrap_or(0);
        let long_order = if ma_lags.is_empty() {
            0
        } else {
            (max_ar.max(max_ma) + 1).min(n / 3)
        };
        Self {
            start: max_ar.max(long_order + max_ma),
            ar_lags,
            ma_lags,
            long_order,
        }
    }

    fn fits(&self, n: usize) -> bool {
        let regressors = self.ar_lags.len() + self.ma_lags.len();
        if regressors == 0 {
            return true;
        }
        (self.ma_lags.is_empty() || self.long_order > 0)
            && n >= self.start + regressors + MIN_DEGREES_OF_FREEDOM
    }

    /// Full order first, then without seasonal lags, then AR only, then no
    /// regressors at all, which projects by integration alone.
    fn for_observations(order: &SarimaOrder, n: usize) -> Self {
        let ar_lags = order.ar_lags();
        let ma_lags = order.ma_lags();
        let short_ar: Vec<usize> = (1..=order.p).collect();
        let short_ma: Vec<usize> = (1..=order.q).collect();

        let candidates = [
            (ar_lags, ma_lags),
            (short_ar.clone(), short_ma),
            (short_ar, Vec::new()),
        ];
        candidates
            .into_iter()
            .map(|(ar, ma)| Self::new(ar, ma, n))
            .find(|plan| plan.fits(n))
            .unwrap_or_else(|| Self::new(Vec::new(), Vec::new(), n))
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarima;

    fn train(&self, series: &HistoricalSeries) -> Result<TrainedSarima> {
        let solar = series.solar_values();
        if solar.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Series contains NaN or infinite values".to_string(),
            ));
        }
        let last_timestamp = series.last_timestamp().ok_or_else(|| {
            ForecastError::ModelFit("Cannot fit a model to an empty series".to_string())
        })?;

        let order = self.order;
        let poly = differencing_polynomial(order.d, order.seasonal_d, order.period)
            .map_err(fit_error("invalid differencing"))?;
        let differenced =
            apply_difference(&solar, &poly).map_err(fit_error("series too short"))?;

        let constant = if order.d == 0 && order.seasonal_d == 0 {
            mean(&differenced).map_err(fit_error("series too short"))?
        } else {
            0.0
        };
        let z: Vec<f64> = differenced.iter().map(|w| w - constant).collect();
        let n = z.len();

        let LagPlan {
            ar_lags,
            ma_lags,
            long_order,
            start,
        } = LagPlan::for_observations(&order, n);
        if ar_lags != order.ar_lags() || ma_lags != order.ma_lags() {
            debug!(
                model = %self.name,
                observations = n,
                ar = ?ar_lags,
                ma = ?ma_lags,
                "reduced lag structure for a short series"
            );
        }

        // Stage 1: innovations from a long autoregression
        let mut innovations = vec![0.0; n];
        if long_order > 0 {
            let acov = autocovariance(&z, long_order).map_err(fit_error("series too short"))?;
            let phi =
                levinson_durbin(&acov, long_order).map_err(fit_error("long autoregression"))?;
            for t in long_order..n {
                let predicted: f64 = phi.iter().enumerate().map(|(i, c)| c * z[t - i - 1]).sum();
                innovations[t] = z[t] - predicted;
            }
        }

        // Stage 2: least squares on AR and MA lags
        let design: Vec<Vec<f64>> = (start..n)
            .map(|t| {
                ar_lags
                    .iter()
                    .map(|&lag| z[t - lag])
                    .chain(ma_lags.iter().map(|&lag| innovations[t - lag]))
                    .collect()
            })
            .collect();
        let beta = if ar_lags.is_empty() && ma_lags.is_empty() {
            Vec::new()
        } else {
            least_squares(&design, &z[start..], RIDGE).map_err(fit_error("regression failed"))?
        };
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Regression produced non-finite coefficients".to_string(),
            ));
        }

        let (ar_coeffs, ma_coeffs) = beta.split_at(ar_lags.len());
        let ar_terms: Vec<(usize, f64)> = ar_lags
            .iter()
            .copied()
            .zip(ar_coeffs.iter().copied())
            .collect();
        let ma_terms: Vec<(usize, f64)> = ma_lags
            .iter()
            .copied()
            .zip(ma_coeffs.iter().copied())
            .collect();

        let mut residuals = innovations;
        for (row, t) in design.iter().zip(start..n) {
            let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            residuals[t] = z[t] - fitted;
        }
        let sigma2 = population_variance(&residuals[start..]).unwrap_or(0.0);

        debug!(
            model = %self.name,
            observations = solar.len(),
            fitted_rows = n - start,
            ar = ?ar_terms,
            ma = ?ma_terms,
            sigma2,
            "fitted seasonal ARIMA"
        );

        Ok(TrainedSarima {
            name: self.name.clone(),
            difference_poly: poly,
            ar_terms,
            ma_terms,
            constant,
            history: solar,
            differenced: z,
            residuals,
            last_timestamp,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSarima {
    fn forecast(&self, horizon: usize) -> Result<ForecastSeries> {
        ensure_horizon(horizon)?;

        let mut z = self.differenced.clone();
        let mut e = self.residuals.clone();
        for _ in 0..horizon {
            let t = z.len();
            let ar: f64 = self.ar_terms.iter().map(|&(lag, c)| c * z[t - lag]).sum();
            let ma: f64 = self.ma_terms.iter().map(|&(lag, c)| c * e[t - lag]).sum();
            z.push(ar + ma);
            // future innovations have zero expectation
            e.push(0.0);
        }

        let future_differences: Vec<f64> = z[self.differenced.len()..]
            .iter()
            .map(|v| v + self.constant)
            .collect();
        let values = integrate(&self.history, &future_differences, &self.difference_poly)
            .map_err(fit_error("integration failed"))?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Projection diverged to non-finite values".to_string(),
            ));
        }

        let timestamps = future_timestamps(self.last_timestamp, horizon, Interval::Hourly);
        let points = timestamps
            .into_iter()
            .zip(values)
            .map(|(timestamp, value)| ForecastPoint { timestamp, value })
            .collect();

        Ok(ForecastSeries::new(points, ForecastMethod::Statistical, Interval::Hourly))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarima {
    /// Fitted AR coefficients by lag
    pub fn ar_terms(&self) -> &[(usize, f64)] {
        &self.ar_terms
    }

    /// Fitted MA coefficients by lag
    pub fn ma_terms(&self) -> &[(usize, f64)] {
        &self.ma_terms
    }
}

/// Fit the default SARIMA(2,1,2)(1,1,1,24) model and project `horizon` hours
pub fn arima(series: &HistoricalSeries, horizon: usize) -> Result<ForecastSeries> {
    SarimaModel::default().forecast(series, horizon)
}
