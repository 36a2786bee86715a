//! CSV ingest and normalization.
//!
//! This module turns an Open Hardware Monitor style sensor log into a clean
//! `TemperatureSeries`: one shared time axis plus one temperature column per core.
//!
//! Design goals:
//! - **Strict schema** for the selected columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Aligned cores**: a row is kept or dropped as a whole, never per column
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::{DatasetStats, IngestConfig, MAX_CORES, TemperatureSeries, TimeSource};
use crate::error::AppError;

/// Timestamp layouts accepted in a time column.
///
/// Open Hardware Monitor writes `MM/dd/yyyy HH:mm:ss`; the ISO forms cover logs
/// that went through a spreadsheet.
const TIMESTAMP_FMTS: [&str; 4] = [
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized series + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: TemperatureSeries,
    pub stats: DatasetStats,
    /// Header names of the selected temperature columns, in core order.
    pub column_names: Vec<String>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the CSV named in `config`.
pub fn load_series(config: &IngestConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.csv_path.display()),
        )
    })?;
    read_series(file, config)
}

/// Parse a sensor log from any reader.
pub fn read_series<R: Read>(input: R, config: &IngestConfig) -> Result<IngestedData, AppError> {
    if config.columns.is_empty() {
        return Err(AppError::new(2, "At least one temperature column is required."));
    }
    if config.columns.len() > MAX_CORES {
        return Err(AppError::new(
            2,
            format!("At most {MAX_CORES} temperature columns are supported, got {}.", config.columns.len()),
        ));
    }
    if let TimeSource::Uniform { start, step } = config.time {
        if !(start.is_finite() && step.is_finite() && step > 0.0) {
            return Err(AppError::new(2, format!("Invalid time axis: start={start}, step={step}.")));
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut needed = config.columns.clone();
    if let TimeSource::Column(c) = config.time {
        needed.push(c);
    }
    if let Some(&col) = needed.iter().find(|&&c| c >= headers.len()) {
        return Err(AppError::new(
            2,
            format!("Column {col} is out of range: the header has {} columns.", headers.len()),
        ));
    }

    let column_names: Vec<String> = config
        .columns
        .iter()
        .map(|&c| normalize_header_name(headers.get(c).unwrap_or_default()))
        .collect();
    debug!(columns = ?config.columns, names = ?column_names, "selected temperature columns");

    let mut raw_times = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); config.columns.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        if idx < config.skip_rows {
            continue;
        }
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let parsed: Result<Vec<f64>, String> = config
            .columns
            .iter()
            .map(|&c| parse_temperature(record.get(c), c))
            .collect();
        // Uniform offsets follow the row's position in the log, so dropped rows leave a gap.
        let time = match config.time {
            TimeSource::Uniform { start, step } => Ok(start + step * (rows_read - 1) as f64),
            TimeSource::Column(c) => parse_time(record.get(c).unwrap_or_default()),
        };

        match (parsed, time) {
            (Ok(values), Ok(time)) => {
                for (col, v) in columns.iter_mut().zip(values) {
                    col.push(v);
                }
                raw_times.push(time);
            }
            (Err(message), _) | (_, Err(message)) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, message = %err.message, "skipped row");
    }

    let rows_used = columns.first().map(Vec::len).unwrap_or(0);
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }

    let times = match config.time {
        TimeSource::Uniform { .. } => raw_times,
        TimeSource::Column(_) => {
            let origin = raw_times[0];
            raw_times.iter().map(|t| t - origin).collect()
        }
    };

    let series = TemperatureSeries::from_columns(times, columns);
    let stats = series
        .stats()
        .ok_or_else(|| AppError::new(3, "No valid samples remain after parsing."))?;

    info!(rows_read, rows_used, cores = stats.n_cores, "ingested sensor log");

    Ok(IngestedData {
        series,
        stats,
        column_names,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Strip it so names print cleanly.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_temperature(field: Option<&str>, column: usize) -> Result<f64, String> {
    let s = field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value in column {column}"))?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid temperature '{s}' in column {column}")),
    }
}

/// Seconds, from either a plain number or a timestamp.
fn parse_time(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return if v.is_finite() {
            Ok(v)
        } else {
            Err(format!("Invalid time '{s}'"))
        };
    }
    for fmt in TIMESTAMP_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc().timestamp_millis() as f64 / 1000.0);
        }
    }
    Err(format!(
        "Invalid time '{s}'. Expected seconds or a timestamp like MM/DD/YYYY HH:MM:SS."
    ))
}
