#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use solar_forecast::{HistoricalSeries, Reading};
use std::f64::consts::PI;

/// Last hour of the synthetic history
pub fn history_end() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 31)
        .unwrap()
        .and_hms_opt(23, 0, 0)
        .unwrap()
}

/// Clear-sky output: a sine arc between 06:00 and 18:00
pub fn clear_sky_kw(hour: u32) -> f64 {
    if (6..=18).contains(&hour) {
        8.0 * (PI * (hour as f64 - 6.0) / 12.0).sin()
    } else {
        0.0
    }
}

/// `days` of hourly readings ending at `history_end()`, with seeded noise
pub fn sunny_history(days: usize, seed: u64) -> HistoricalSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.15).unwrap();
    let load = Normal::new(1.2, 0.3).unwrap();

    let hours = days * 24;
    let start = history_end() - Duration::hours(hours as i64 - 1);
    let readings = (0..hours)
        .map(|i| {
            let timestamp = start + Duration::hours(i as i64);
            let clear = clear_sky_kw(timestamp.hour());
            let solar = if clear > 0.0 {
                (clear + noise.sample(&mut rng)).max(0.0)
            } else {
                0.0
            };
            let load_kw: f64 = load.sample(&mut rng);
            Reading::new(timestamp, solar, load_kw.max(0.1))
        })
        .collect();
    HistoricalSeries::from_readings(readings)
}

/// Noise-free history repeating the same clear-sky day
pub fn clear_history(days: usize) -> HistoricalSeries {
    let hours = days * 24;
    let start = history_end() - Duration::hours(hours as i64 - 1);
    let readings = (0..hours)
        .map(|i| {
            let timestamp = start + Duration::hours(i as i64);
            Reading::new(timestamp, clear_sky_kw(timestamp.hour()), 1.0)
        })
        .collect();
    HistoricalSeries::from_readings(readings)
}
