//! Formatted terminal output for a finished batch.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (easy to snapshot-test)

use crate::app::pipeline::{BatchReport, CoreOutcome};
use crate::io::ingest::IngestedData;
use crate::report::equation::fmt_coeff;

/// Format the full run summary (dataset stats + per-core fits + failures).
pub fn format_batch_summary(ingest: &IngestedData, report: &BatchReport) -> String {
    let mut out = String::new();
    let stats = &ingest.stats;

    out.push_str("=== ctemp - CPU Core Temperature Fits ===\n");
    out.push_str(&format!(
        "Samples: n={} | cores={} | time=[{:.1}, {:.1}]s | temp=[{:.2}, {:.2}]\n",
        stats.n_samples, stats.n_cores, stats.t_min, stats.t_max, stats.y_min, stats.y_max
    ));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Pivot: {} | digits: {}\n",
        report.options.pivot.display_name(),
        report.options.digits
    ));

    out.push_str("\nLeast squares:\n");
    out.push_str(&format!(
        "{:<8} {:>12} {:>12} {:>10} {:>10} {:>10}\n",
        "core", "intercept", "slope", "SSE", "RMSE", "|grad|"
    ));
    for core in &report.cores {
        out.push_str(&format_fit_row(core));
        out.push('\n');
    }

    out.push_str("\nInterpolation:\n");
    for core in &report.cores {
        let line = match &core.interpolation {
            Ok(interp) => format!(
                "{:<8} segments={} skipped={}",
                core.core.to_string(),
                interp.segments.len(),
                interp.skipped.len()
            ),
            Err(err) => format!("{:<8} FAILED ({})", core.core.to_string(), err.kind()),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let failures = report.failures();
    if failures.is_empty() {
        out.push_str("\nFailures: none\n");
    } else {
        out.push_str(&format!("\nFailures ({}):\n", failures.len()));
        for err in failures {
            out.push_str(&format!("- [{}] {err}\n", err.kind()));
        }
    }

    for err in &report.plot_errors {
        out.push_str(&format!("Plot failed: {err}\n"));
    }

    out
}

/// Format the ingest row errors (one per line, capped at `max`).
pub fn format_row_errors(ingest: &IngestedData, max: usize) -> String {
    let mut out = String::new();
    for err in ingest.row_errors.iter().take(max) {
        out.push_str(&format!("line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > max {
        out.push_str(&format!("... and {} more\n", ingest.row_errors.len() - max));
    }
    out
}

fn format_fit_row(core: &CoreOutcome) -> String {
    let label = core.core.to_string();
    match &core.fit {
        Ok(rec) => format!(
            "{:<8} {:>12} {:>12} {:>10.3} {:>10.3} {:>10.2e}",
            label,
            fmt_coeff(rec.intercept),
            fmt_coeff(rec.slope),
            rec.quality.sse,
            rec.quality.rmse,
            rec.quality.gradient_norm,
        ),
        Err(err) => format!("{label:<8} FAILED ({})", err.kind()),
    }
}
