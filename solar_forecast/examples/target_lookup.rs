use chrono::{Duration, NaiveDate, Timelike};
use solar_forecast::models::{Interval, PowerUnit};
use solar_forecast::{ForecastConfig, ForecastRequest, HistoricalStore, SolarForecaster};
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let store = HistoricalStore::new(dir.path().join("solar_history.csv"));

    let start = NaiveDate::from_ymd_opt(2026, 1, 25)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;
    for i in 0..168 {
        let timestamp = start + Duration::hours(i);
        let hour = timestamp.hour() as f64;
        let solar = (7.0 * (PI * (hour - 6.0) / 12.0).sin()).max(0.0);
        store.append(timestamp, solar, 1.0)?;
    }
    let history = store.load()?;

    let forecaster = SolarForecaster::new(ForecastConfig::default())?;
    let request = ForecastRequest::new()
        .interval(Interval::QuarterHourly)
        .unit(PowerUnit::Wh);

    for target in ["2026-02-01 14:00", "01/02/2026 09:20", "2026-02-10 14:00"] {
        let result = forecaster.forecast_at_str(&history, target, &request)?;
        println!(
            "{:<18} -> {} {:8.1} {} ({})",
            target, result.forecast_time, result.value, result.unit, result.match_kind
        );
    }

    let result = forecaster.forecast_at_str(&history, "2026-02-01T12:00:00", &request)?;
    println!("\n{}", result.to_json()?);

    Ok(())
}
