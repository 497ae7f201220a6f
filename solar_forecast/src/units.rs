//! Conversion between instantaneous power and per-interval energy

use crate::error::{ForecastError, Result};
use crate::models::{ForecastSeries, PowerUnit};

/// Energy in Wh produced by `kw` sustained for `step_minutes`
pub fn kw_to_wh(kw: f64, step_minutes: u32) -> f64 {
    kw * (f64::from(step_minutes) / 60.0) * 1000.0
}

/// Average power in kW that yields `wh` over `step_minutes`
pub fn wh_to_kw(wh: f64, step_minutes: u32) -> f64 {
    wh / 1000.0 / (f64::from(step_minutes) / 60.0)
}

fn ensure_step(step_minutes: u32) -> Result<()> {
    if step_minutes == 0 {
        return Err(ForecastError::InvalidParameter(
            "Step length must be at least one minute".to_string(),
        ));
    }
    Ok(())
}

/// Convert a kW forecast to Wh accumulated over each step
pub fn power_to_energy(series: ForecastSeries, step_minutes: u32) -> Result<ForecastSeries> {
    ensure_step(step_minutes)?;
    if series.unit() == PowerUnit::Wh {
        return Err(ForecastError::InvalidParameter(
            "Forecast is already expressed in Wh".to_string(),
        ));
    }
    Ok(series
        .map_values(|kw| kw_to_wh(kw, step_minutes))
        .with_unit(PowerUnit::Wh))
}

/// Convert a per-step Wh forecast back to kW
pub fn energy_to_power(series: ForecastSeries, step_minutes: u32) -> Result<ForecastSeries> {
    ensure_step(step_minutes)?;
    if series.unit() == PowerUnit::Kw {
        return Err(ForecastError::InvalidParameter(
            "Forecast is already expressed in kW".to_string(),
        ));
    }
    Ok(series
        .map_values(|wh| wh_to_kw(wh, step_minutes))
        .with_unit(PowerUnit::Kw))
}

/// Convert a forecast to `unit` using its own interval as the step
pub fn convert_to(series: ForecastSeries, unit: PowerUnit) -> Result<ForecastSeries> {
    let step = series.interval().minutes();
    match (series.unit(), unit) {
        (PowerUnit::Kw, PowerUnit::Wh) => power_to_energy(series, step),
        (PowerUnit::Wh, PowerUnit::Kw) => energy_to_power(series, step),
        _ => Ok(series),
    }
}
