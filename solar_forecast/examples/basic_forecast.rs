use chrono::{Duration, NaiveDate, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use solar_forecast::data::write_readings_csv;
use solar_forecast::models::Interval;
use solar_forecast::{
    ForecastConfig, ForecastMethod, ForecastRequest, HistoricalStore, Reading, SolarForecaster,
};
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Solar Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    let path = std::env::temp_dir().join("solar_forecast_demo.csv");
    write_readings_csv(&path, &sample_week()?)?;
    let store = HistoricalStore::new(&path);
    let history = store.load()?;
    println!(
        "Loaded {} hourly readings ({} to {})\n",
        history.len(),
        history.first_timestamp().map(|t| t.to_string()).unwrap_or_default(),
        history.last_timestamp().map(|t| t.to_string()).unwrap_or_default()
    );

    let config = ForecastConfig::default().with_env_overrides()?;
    let forecaster = SolarForecaster::new(config)?;

    for method in [
        ForecastMethod::Baseline,
        ForecastMethod::Statistical,
        ForecastMethod::Ensemble,
    ] {
        let request = ForecastRequest::new().method(method).horizon(24);
        let summary = forecaster.summary(&history, &request)?;
        println!(
            "{:<12} next: {:6.2} kW  6h mean: {:6.2} kW  24h mean: {:6.2} kW",
            method, summary.next, summary.next_6_mean, summary.next_24_mean
        );
    }

    println!("\nQuarter-hourly ensemble forecast around noon:");
    let forecast =
        forecaster.forecast(&history, &ForecastRequest::new().interval(Interval::QuarterHourly))?;
    for point in forecast
        .points()
        .iter()
        .filter(|p| (11..13).contains(&p.timestamp.hour()))
        .take(8)
    {
        println!("  {}  {:6.2} {}", point.timestamp, point.value, forecast.unit());
    }

    println!("\nBacktest on the last day:");
    let report = forecaster.backtest(&history, ForecastMethod::Ensemble, 24)?;
    print!("{}", report.accuracy);

    Ok(())
}

fn sample_week() -> Result<Vec<Reading>, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(7);
    let cloud = Normal::new(0.0, 0.4)?;
    let start = NaiveDate::from_ymd_opt(2026, 1, 25)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;

    Ok((0..168)
        .map(|i| {
            let timestamp = start + Duration::hours(i);
            let hour = timestamp.hour() as f64;
            let clear = if (6.0..=18.0).contains(&hour) {
                6.5 * (PI * (hour - 6.0) / 12.0).sin()
            } else {
                0.0
            };
            let solar = if clear > 0.0 {
                (clear + cloud.sample(&mut rng)).max(0.0)
            } else {
                0.0
            };
            Reading::new(timestamp, solar, 1.5)
        })
        .collect())
}
