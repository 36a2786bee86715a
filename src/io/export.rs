//! Export a batch to JSON.
//!
//! The export is meant to be easy to consume in notebooks or downstream scripts:
//! every fitted line, every interpolation segment and every recovered failure.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::BatchReport;
use crate::domain::{FitRecord, InterpolationRecord, PivotRule};
use crate::error::{AppError, FailureEntry};

/// Schema of the `--export-json` file.
#[derive(Debug, Clone, Serialize)]
pub struct BatchExport {
    pub tool: String,
    pub generated_at: String,
    pub pivot: PivotRule,
    pub digits: u32,
    pub fits: Vec<FitRecord>,
    pub segments: Vec<InterpolationRecord>,
    pub failures: Vec<FailureEntry>,
}

impl BatchExport {
    pub fn from_report(report: &BatchReport) -> Self {
        Self {
            tool: "ctemp".to_string(),
            generated_at: chrono::Local::now().to_rfc3339(),
            pivot: report.options.pivot,
            digits: report.options.digits,
            fits: report.fit_records().cloned().collect(),
            segments: report.segments().cloned().collect(),
            failures: report.failures().into_iter().map(FailureEntry::from).collect(),
        }
    }
}

/// Write the batch as pretty JSON.
pub fn write_batch_json(path: &Path, report: &BatchReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &BatchExport::from_report(report))
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TemperatureSeries;
    use crate::fit::FitOptions;
    use crate::io::sink::MemorySink;

    #[test]
    fn export_lists_fits_segments_and_failures() {
        let series = TemperatureSeries::from_columns(
            vec![0.0, 30.0, 30.0],
            vec![vec![40.0, 42.0, 44.0]],
        );
        let mut sink = MemorySink::new();
        let report = crate::app::pipeline::run_batch(&series, &FitOptions::default(), &mut sink, &mut []);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        write_batch_json(&path, &report).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["tool"], "ctemp");
        assert_eq!(json["pivot"], "greater");
        assert_eq!(json["digits"], 4);
        assert!(chrono::DateTime::parse_from_rfc3339(json["generated_at"].as_str().unwrap()).is_ok());

        assert_eq!(json["fits"].as_array().unwrap().len(), 1);
        assert_eq!(json["fits"][0]["core"], 0);
        assert!(json["fits"][0]["quality"]["rmse"].is_number());

        let segments = json["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0]["segment"], 0);

        let failures = json["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0]["kind"], "degenerate_segment");
        assert_eq!(failures[0]["segment"], 1);
    }

    #[test]
    fn unwritable_path_is_exit_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let series = TemperatureSeries::from_columns(vec![0.0, 30.0], vec![vec![40.0, 41.0]]);
        let mut sink = MemorySink::new();
        let report = crate::app::pipeline::run_batch(&series, &FitOptions::default(), &mut sink, &mut []);

        let err = write_batch_json(&dir.path().join("missing").join("x.json"), &report).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
