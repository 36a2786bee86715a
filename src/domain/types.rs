//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - rendered by the plot and TUI front-ends

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Seconds between two samples when the log carries no time column.
pub const DEFAULT_STEP: f64 = 30.0;

/// Zero-based CSV columns holding the four core temperatures in an
/// Open Hardware Monitor log.
pub const DEFAULT_COLUMNS: [usize; 4] = [6, 7, 8, 9];

/// Largest number of cores a series can hold; `CoreId` is a `u8`.
pub const MAX_CORES: usize = u8::MAX as usize + 1;

/// File name prefix of the per-core output files (`cpuTemps-core-0.txt`, ...).
pub const DEFAULT_PREFIX: &str = "cpuTemps-core-";

/// Significant digits kept in least-squares coefficients.
///
/// Four digits is what survives a round trip through a half-precision float.
pub const DEFAULT_DIGITS: u32 = 4;

/// Identifier of a CPU core (its position in the selected columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreId(pub u8);

impl CoreId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core {}", self.0)
    }
}

/// Temperatures of one core, aligned by index with `TemperatureSeries::times`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSeries {
    pub core: CoreId,
    pub temps: Vec<f64>,
}

/// All cores' samples over one shared time axis.
///
/// The time offsets are stored once: every core is sampled at the same instants.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSeries {
    pub times: Vec<f64>,
    pub cores: Vec<CoreSeries>,
}

impl TemperatureSeries {
    /// Build a series from plain temperature vectors; cores are numbered in order.
    pub fn from_columns(times: Vec<f64>, columns: Vec<Vec<f64>>) -> Self {
        let cores = columns
            .into_iter()
            .enumerate()
            .map(|(idx, temps)| CoreSeries {
                core: CoreId(idx as u8),
                temps,
            })
            .collect();
        Self { times, cores }
    }

    /// Number of time samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn core_ids(&self) -> Vec<CoreId> {
        self.cores.iter().map(|c| c.core).collect()
    }

    /// `(time, temperature)` pairs for one core.
    pub fn points(&self, core: &CoreSeries) -> Vec<(f64, f64)> {
        self.times.iter().copied().zip(core.temps.iter().copied()).collect()
    }

    pub fn stats(&self) -> Option<DatasetStats> {
        let t_min = self.times.first().copied()?;
        let t_max = self.times.last().copied()?;

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for core in &self.cores {
            for &y in &core.temps {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }

        Some(DatasetStats {
            n_samples: self.times.len(),
            n_cores: self.cores.len(),
            t_min,
            t_max,
            y_min,
            y_max,
        })
    }
}

/// Summary stats about the samples handed to the fitters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_samples: usize,
    pub n_cores: usize,
    pub t_min: f64,
    pub t_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Row selection rule used before eliminating each column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PivotRule {
    /// Signed comparison: a candidate row wins when its entry is greater.
    ///
    /// A negative entry of larger magnitude never wins, so sign-mixed systems
    /// can hit a zero pivot that `Magnitude` would avoid.
    Greater,
    /// Absolute-value comparison (textbook partial pivoting).
    Magnitude,
}

impl PivotRule {
    pub fn display_name(self) -> &'static str {
        match self {
            PivotRule::Greater => "greater",
            PivotRule::Magnitude => "magnitude",
        }
    }

    /// The other rule (used by the TUI toggle).
    pub fn toggled(self) -> Self {
        match self {
            PivotRule::Greater => PivotRule::Magnitude,
            PivotRule::Magnitude => PivotRule::Greater,
        }
    }
}

/// Where the time offsets come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSource {
    /// `start, start + step, start + 2*step, ...`
    Uniform { start: f64, step: f64 },
    /// Read from a CSV column (numbers or timestamps), rebased to the first kept row.
    Column(usize),
}

/// Ingest settings.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub csv_path: PathBuf,
    /// Zero-based temperature columns; one core per column.
    pub columns: Vec<usize>,
    /// Rows to ignore after the header row.
    pub skip_rows: usize,
    pub time: TimeSource,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ingest: IngestConfig,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub pivot: PivotRule,
    pub digits: u32,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub plot_svg: Option<PathBuf>,

    pub export_json: Option<PathBuf>,
}

/// Fit diagnostics, computed on the unrounded solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// Euclidean norm of `Xᵗ(Xβ − y)`; zero at the exact least-squares solution.
    pub gradient_norm: f64,
}

/// Global least-squares line for one core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRecord {
    pub core: CoreId,
    pub start: f64,
    pub end: f64,
    pub intercept: f64,
    pub slope: f64,
    pub quality: FitQuality,
}

/// Line through one consecutive pair of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolationRecord {
    pub core: CoreId,
    pub segment: usize,
    pub start: f64,
    pub end: f64,
    pub intercept: f64,
    pub slope: f64,
}

impl InterpolationRecord {
    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_cover_all_cores() {
        let series = TemperatureSeries::from_columns(
            vec![0.0, 30.0, 60.0],
            vec![vec![40.0, 42.0, 44.0], vec![38.0, 51.0, 47.0]],
        );
        let stats = series.stats().unwrap();
        assert_eq!(stats.n_samples, 3);
        assert_eq!(stats.n_cores, 2);
        assert_eq!(stats.t_min, 0.0);
        assert_eq!(stats.t_max, 60.0);
        assert_eq!(stats.y_min, 38.0);
        assert_eq!(stats.y_max, 51.0);
        assert_eq!(series.core_ids(), vec![CoreId(0), CoreId(1)]);
    }

    #[test]
    fn empty_series_has_no_stats() {
        let series = TemperatureSeries::from_columns(vec![], vec![vec![]]);
        assert!(series.stats().is_none());
    }
}
