//! Synthetic sensor logs in the Open Hardware Monitor layout.
//!
//! Every core follows `base + core_offset + drift * i + noise`, with Gaussian
//! noise from a seeded `StdRng`, so the same settings always produces the same file.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{DEFAULT_STEP, MAX_CORES, TemperatureSeries};
use crate::error::AppError;

/// Timestamp layout Open Hardware Monitor writes in its first column.
pub const OHM_TIME_FMT: &str = "%m/%d/%Y %H:%M:%S";

/// Load columns written between the timestamp and the temperatures.
const LOAD_COLUMNS: usize = 5;

/// Degrees added per core index, so the lines do not sit on top of each other.
const CORE_OFFSET: f64 = 2.5;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpec {
    pub samples: usize,
    pub cores: usize,
    /// Seconds between samples.
    pub step: f64,
    pub seed: u64,
    /// Standard deviation of the Gaussian noise, in degrees.
    pub noise: f64,
    /// Temperature of core 0 at the first sample.
    pub base: f64,
    /// Degrees added per sample.
    pub drift: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            samples: 40,
            cores: 4,
            step: DEFAULT_STEP,
            seed: 42,
            noise: 0.75,
            base: 42.0,
            drift: 0.05,
        }
    }
}

/// A generated log: timestamps, load columns and core temperatures.
#[derive(Debug, Clone)]
pub struct SyntheticLog {
    pub timestamps: Vec<NaiveDateTime>,
    /// `LOAD_COLUMNS` values per row (CPU total, then one per core).
    pub loads: Vec<Vec<f64>>,
    pub series: TemperatureSeries,
}

pub fn generate(spec: &SyntheticSpec) -> Result<SyntheticLog, AppError> {
    if spec.samples == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if spec.cores == 0 || spec.cores > MAX_CORES {
        return Err(AppError::new(2, format!("Core count must be in 1..={MAX_CORES}, got {}.", spec.cores)));
    }
    if !(spec.step.is_finite() && spec.step > 0.0) {
        return Err(AppError::new(2, "Step must be a positive number of seconds."));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be >= 0."));
    }
    if !(spec.base.is_finite() && spec.drift.is_finite()) {
        return Err(AppError::new(2, "Base and drift must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let origin = NaiveDate::from_ymd_opt(2021, 6, 9)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .ok_or_else(|| AppError::new(4, "Invalid synthetic start timestamp."))?;
    let step_ms = (spec.step * 1000.0).round() as i64;

    let times: Vec<f64> = (0..spec.samples).map(|i| spec.step * i as f64).collect();
    let timestamps = (0..spec.samples)
        .map(|i| origin + Duration::milliseconds(step_ms * i as i64))
        .collect();

    let mut columns = vec![Vec::with_capacity(spec.samples); spec.cores];
    let mut loads = Vec::with_capacity(spec.samples);
    for i in 0..spec.samples {
        let row: Vec<f64> = (0..LOAD_COLUMNS).map(|_| round1(rng.gen_range(0.0..100.0))).collect();
        loads.push(row);

        for (c, col) in columns.iter_mut().enumerate() {
            let level = spec.base + CORE_OFFSET * c as f64 + spec.drift * i as f64;
            col.push(round1(level + normal.sample(&mut rng)));
        }
    }

    info!(samples = spec.samples, cores = spec.cores, seed = spec.seed, "generated synthetic log");

    Ok(SyntheticLog {
        timestamps,
        loads,
        series: TemperatureSeries::from_columns(times, columns),
    })
}

/// Write `log` as an OHM CSV: identifier header, sensor-name row, then data.
///
/// Column 0 holds the timestamp, columns 1..=5 the loads and the temperatures
/// start at column 6.
pub fn write_ohm_csv(path: &Path, log: &SyntheticLog) -> Result<(), AppError> {
    let err = |e: csv::Error| AppError::new(2, format!("Failed to write CSV '{}': {e}", path.display()));
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path).map_err(err)?;

    let cores = log.series.cores.len();
    let mut ids = vec![String::new()];
    let mut names = vec!["Time".to_string(), "CPU Total".to_string()];
    ids.extend((0..LOAD_COLUMNS).map(|i| format!("/intelcpu/0/load/{i}")));
    names.extend((1..LOAD_COLUMNS).map(|i| format!("CPU Core #{i}")));
    ids.extend((0..cores).map(|c| format!("/intelcpu/0/temperature/{c}")));
    names.extend((0..cores).map(|c| format!("CPU Core #{}", c + 1)));
    writer.write_record(&ids).map_err(err)?;
    writer.write_record(&names).map_err(err)?;

    for (i, ts) in log.timestamps.iter().enumerate() {
        let mut record = vec![ts.format(OHM_TIME_FMT).to_string()];
        record.extend(log.loads[i].iter().map(|v| v.to_string()));
        record.extend(log.series.cores.iter().map(|c| c.temps[i].to_string()));
        writer.write_record(&record).map_err(err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
