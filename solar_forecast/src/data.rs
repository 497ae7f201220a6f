//! Historical readings: loading, cleaning, validation and persistence

use crate::config::{RetentionSettings, ValidationSettings};
use crate::error::{ForecastError, Result};
use crate::utils::{parse_datetime, CSV_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Most recent points kept as forecasting input
pub const FORECAST_WINDOW: usize = 168;
/// Most recent points kept in the persisted store
pub const STORE_CAPACITY: usize = 720;
/// Solar value used when no earlier reading exists
pub const DEFAULT_SOLAR_KW: f64 = 0.0;
/// Load value used when no earlier reading exists
pub const DEFAULT_LOAD_KW: f64 = 5.0;

/// One hourly observation of the site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Solar generation in kW
    pub solar_power_kw: f64,
    /// Household consumption in kW
    pub load_total_kw: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, solar_power_kw: f64, load_total_kw: f64) -> Self {
        Self {
            timestamp,
            solar_power_kw,
            load_total_kw,
        }
    }
}

/// Row as stored on disk; empty cells are missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    solar_power_kw: Option<f64>,
    load_total_kw: Option<f64>,
}

/// Parsed row as written; gaps and unusable cells are resolved by `clean`
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawReading {
    timestamp: NaiveDateTime,
    solar_power_kw: Option<f64>,
    load_total_kw: Option<f64>,
}

impl RawReading {
    fn to_row(self) -> CsvRow {
        CsvRow {
            timestamp: self.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string(),
            solar_power_kw: self.solar_power_kw,
            load_total_kw: self.load_total_kw,
        }
    }
}

/// Sort by timestamp and keep the last row for each duplicate timestamp
fn sort_and_dedup<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> NaiveDateTime,
{
    // Stable sort keeps file order among equal timestamps.
    rows.sort_by_key(|row| key(row));

    let mut deduped: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(last) = deduped.last_mut() {
            if key(last) == key(&row) {
                *last = row;
                continue;
            }
        }
        deduped.push(row);
    }
    deduped
}

fn keep_tail<T>(mut rows: Vec<T>, window: usize) -> Vec<T> {
    if rows.len() > window {
        rows.drain(..rows.len() - window);
    }
    rows
}

/// Clean, gap-free, strictly increasing hourly series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalSeries {
    readings: Vec<Reading>,
}

impl HistoricalSeries {
    /// Build a series from complete readings, ordering them and letting the
    /// last reading win on duplicate timestamps
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: sort_and_dedup(readings, |r| r.timestamp),
        }
    }

    /// Order, dedup, window and forward-fill raw rows
    fn clean(rows: Vec<RawReading>, window: usize) -> Self {
        let rows = keep_tail(sort_and_dedup(rows, |r| r.timestamp), window);

        let mut last_solar = DEFAULT_SOLAR_KW;
        let mut last_load = DEFAULT_LOAD_KW;
        let mut filled = 0usize;
        let readings = rows
            .into_iter()
            .map(|row| {
                let solar = usable(row.solar_power_kw);
                let load = usable(row.load_total_kw);
                if solar.is_none() || load.is_none() {
                    filled += 1;
                }
                last_solar = solar.unwrap_or(last_solar);
                last_load = load.unwrap_or(last_load);
                Reading::new(row.timestamp, last_solar, last_load)
            })
            .collect::<Vec<_>>();

        if filled > 0 {
            debug!(filled, points = readings.len(), "forward-filled missing readings");
        }
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.readings.iter().map(|r| r.timestamp).collect()
    }

    /// Solar channel in kW
    pub fn solar_values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.solar_power_kw).collect()
    }

    /// Load channel in kW
    pub fn load_values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.load_total_kw).collect()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.last().map(|r| r.timestamp)
    }

    /// The most recent `count` readings
    pub fn tail(&self, count: usize) -> Self {
        Self {
            readings: keep_tail(self.readings.clone(), count),
        }
    }

    /// Split into the readings before `index` and the readings from `index` on
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        let index = index.min(self.readings.len());
        let (head, tail) = self.readings.split_at(index);
        (
            Self {
                readings: head.to_vec(),
            },
            Self {
                readings: tail.to_vec(),
            },
        )
    }
}

/// Non-fatal finding about the historical data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// A solar reading above what the installation can plausibly produce
    HighSolar {
        timestamp: NaiveDateTime,
        value_kw: f64,
        ceiling_kw: f64,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::HighSolar {
                timestamp,
                value_kw,
                ceiling_kw,
            } => write!(
                f,
                "solar reading {:.2} kW at {} exceeds {:.1} kW",
                value_kw, timestamp, ceiling_kw
            ),
        }
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub points: usize,
    pub warnings: Vec<DataWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Check that a series is usable for forecasting.
///
/// Too few points is an error. Implausibly high solar readings are logged and
/// reported but never block forecasting.
pub fn validate(series: &HistoricalSeries, settings: &ValidationSettings) -> Result<ValidationReport> {
    if series.len() < settings.min_points {
        return Err(ForecastError::InsufficientData {
            required: settings.min_points,
            actual: series.len(),
        });
    }

    let warnings: Vec<DataWarning> = series
        .readings()
        .iter()
        .filter(|r| r.solar_power_kw > settings.solar_ceiling_kw)
        .map(|r| DataWarning::HighSolar {
            timestamp: r.timestamp,
            value_kw: r.solar_power_kw,
            ceiling_kw: settings.solar_ceiling_kw,
        })
        .collect();

    for warning in &warnings {
        warn!(%warning, "implausible historical reading");
    }

    Ok(ValidationReport {
        points: series.len(),
        warnings,
    })
}

/// Non-finite or negative cells count as missing
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Read every row of a historical CSV file, keeping cells exactly as parsed
fn read_rows(path: &Path) -> Result<Vec<RawReading>> {
    if !path.exists() {
        return Err(ForecastError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        let timestamp = parse_datetime(&row.timestamp).map_err(|_| {
            ForecastError::DataError(format!(
                "line {}: invalid timestamp '{}'",
                index + 2,
                row.timestamp
            ))
        })?;
        rows.push(RawReading {
            timestamp,
            solar_power_kw: row.solar_power_kw,
            load_total_kw: row.load_total_kw,
        });
    }
    Ok(rows)
}

/// Load a historical CSV file and keep the most recent `window` cleaned points
pub fn load_solar_csv<P: AsRef<Path>>(path: P, window: usize) -> Result<HistoricalSeries> {
    let rows = read_rows(path.as_ref())?;
    let raw_rows = rows.len();
    let series = HistoricalSeries::clean(rows, window);
    debug!(
        path = %path.as_ref().display(),
        raw_rows,
        points = series.len(),
        "loaded historical data"
    );
    Ok(series)
}

/// CSV-backed store of historical readings
#[derive(Debug)]
pub struct HistoricalStore {
    path: PathBuf,
    forecast_window: usize,
    capacity: usize,
    /// Serializes read-modify-write cycles on the file
    write_lock: Mutex<()>,
}

impl HistoricalStore {
    /// Create a store with the default 168/720 retention
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_retention(path, &RetentionSettings::default())
    }

    pub fn with_retention(path: impl Into<PathBuf>, retention: &RetentionSettings) -> Self {
        Self {
            path: path.into(),
            forecast_window: retention.forecast_window,
            capacity: retention.store_capacity,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the forecasting window of cleaned readings
    pub fn load(&self) -> Result<HistoricalSeries> {
        load_solar_csv(&self.path, self.forecast_window)
    }

    /// Load every stored reading, cleaned
    pub fn load_all(&self) -> Result<HistoricalSeries> {
        load_solar_csv(&self.path, usize::MAX)
    }

    /// Insert or overwrite the reading at `timestamp` and persist the store.
    ///
    /// The file is created when absent and truncated to the most recent
    /// `store_capacity` rows. Returns the number of rows stored.
    pub fn append(&self, timestamp: NaiveDateTime, solar_kw: f64, load_kw: f64) -> Result<usize> {
        for (name, value) in [("solar_kw", solar_kw), ("load_kw", load_kw)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        let _guard = self.write_lock.lock();

        let mut rows = if self.path.exists() {
            read_rows(&self.path)?
        } else {
            Vec::new()
        };
        rows.push(RawReading {
            timestamp,
            solar_power_kw: Some(solar_kw),
            load_total_kw: Some(load_kw),
        });

        let rows = keep_tail(sort_and_dedup(rows, |r| r.timestamp), self.capacity);
        self.write_atomic(&rows)?;

        info!(
            path = %self.path.display(),
            %timestamp,
            solar_kw,
            load_kw,
            stored = rows.len(),
            "appended reading"
        );
        Ok(rows.len())
    }

    /// Write to a temporary sibling file and rename it over the store
    fn write_atomic(&self, rows: &[RawReading]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            for row in rows {
                writer.serialize(row.to_row())?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| ForecastError::IoError(e.error))?;
        Ok(())
    }
}

/// Write complete readings to a new CSV file, replacing any existing one
pub fn write_readings_csv<P: AsRef<Path>>(path: P, readings: &[Reading]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for reading in readings {
        writer.serialize(CsvRow {
            timestamp: reading.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string(),
            solar_power_kw: Some(reading.solar_power_kw),
            load_total_kw: Some(reading.load_total_kw),
        })?;
    }
    writer.flush()?;
    Ok(())
}
