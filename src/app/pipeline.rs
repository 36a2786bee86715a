//! Shared batch logic used by both the CLI and the TUI front-ends.
//!
//! One batch is:
//! least squares (every core) -> interpolation (every core) -> plot (once)
//!
//! Failures are collected per core and per segment; nothing in here aborts the
//! batch. The front-ends only decide how to present the `BatchReport`.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::{CoreId, FitRecord, InterpolationRecord, TemperatureSeries};
use crate::error::FitError;
use crate::fit::{CoreInterpolation, FitOptions, fit_all, interpolate_all};
use crate::io::sink::EquationSink;
use crate::plot::{PlotRenderer, chart_series};
use crate::report::{format_fit_record, format_interpolation_record};

/// Everything that happened to one core during a batch.
#[derive(Debug, Clone)]
pub struct CoreOutcome {
    pub core: CoreId,
    pub fit: Result<FitRecord, FitError>,
    pub interpolation: Result<CoreInterpolation, FitError>,
    /// First write failure for this core; later writes were not attempted.
    pub sink_error: Option<FitError>,
}

impl CoreOutcome {
    /// All failures of this core, in the order they happened.
    pub fn failures(&self) -> Vec<&FitError> {
        let mut out = Vec::new();
        if let Err(err) = &self.fit {
            out.push(err);
        }
        match &self.interpolation {
            Ok(interp) => out.extend(interp.skipped.iter()),
            Err(err) => out.push(err),
        }
        out.extend(self.sink_error.iter());
        out
    }
}

/// Result of one `run_batch` call.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub options: FitOptions,
    pub cores: Vec<CoreOutcome>,
    /// Renderer failures. Logged and shown, never counted as batch failures.
    pub plot_errors: Vec<String>,
}

impl BatchReport {
    pub fn failures(&self) -> Vec<&FitError> {
        self.cores.iter().flat_map(CoreOutcome::failures).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.cores.iter().map(|c| c.failures().len()).sum()
    }

    pub fn fit_records(&self) -> impl Iterator<Item = &FitRecord> {
        self.cores.iter().filter_map(|c| c.fit.as_ref().ok())
    }

    pub fn segments(&self) -> impl Iterator<Item = &InterpolationRecord> {
        self.cores
            .iter()
            .filter_map(|c| c.interpolation.as_ref().ok())
            .flat_map(|i| i.segments.iter())
    }
}

/// Run both fitting passes over every core, write the records, then plot.
pub fn run_batch(
    series: &TemperatureSeries,
    options: &FitOptions,
    sink: &mut dyn EquationSink,
    renderers: &mut [Box<dyn PlotRenderer>],
) -> BatchReport {
    let mut sink_errors: BTreeMap<CoreId, FitError> = BTreeMap::new();

    // 1) Least squares.
    let fits = fit_all(series, options);
    for rec in fits.iter().flatten() {
        write_core(sink, rec.core, &[format_fit_record(rec)], &mut sink_errors);
    }

    // 2) Interpolation, one write per core.
    let interpolations = interpolate_all(series);
    for interp in interpolations.iter().flatten() {
        if interp.segments.is_empty() {
            continue;
        }
        let lines: Vec<String> = interp.segments.iter().map(format_interpolation_record).collect();
        write_core(sink, interp.core, &lines, &mut sink_errors);
    }

    // 3) Plot once, after the last core.
    let mut plot_errors = Vec::new();
    if !renderers.is_empty() {
        let charts = chart_series(series);
        for renderer in renderers.iter_mut() {
            if let Err(err) = renderer.render(&charts) {
                warn!(%err, "plot failed");
                plot_errors.push(err.to_string());
            }
        }
    }

    let cores = series
        .cores
        .iter()
        .zip(fits)
        .zip(interpolations)
        .map(|((core, fit), interpolation)| CoreOutcome {
            core: core.core,
            fit,
            interpolation,
            sink_error: sink_errors.remove(&core.core),
        })
        .collect();

    let report = BatchReport {
        options: *options,
        cores,
        plot_errors,
    };
    info!(
        cores = report.cores.len(),
        failures = report.failure_count(),
        "batch finished"
    );
    report
}

fn write_core(
    sink: &mut dyn EquationSink,
    core: CoreId,
    lines: &[String],
    failed: &mut BTreeMap<CoreId, FitError>,
) {
    if failed.contains_key(&core) {
        debug!(%core, lines = lines.len(), "destination failed earlier; not writing");
        return;
    }
    if let Err(e) = sink.write_lines(core, lines) {
        let err = FitError::SinkWrite {
            core,
            destination: e.destination(),
            message: e.to_string(),
        };
        warn!(%err, "sink write failed");
        failed.insert(core, err);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::AppError;
    use crate::io::sink::{MemorySink, SinkError};
    use crate::plot::ChartSeries;

    fn example_series() -> TemperatureSeries {
        TemperatureSeries::from_columns(
            vec![0.0, 30.0, 60.0],
            vec![
                vec![40.0, 42.0, 44.0],
                vec![45.0, 45.0, 45.0],
                vec![41.0, 43.0, 42.0],
                vec![60.0, 57.0, 54.0],
            ],
        )
    }

    /// Fails every write for one core and counts attempts.
    struct BrokenCore {
        broken: CoreId,
        attempts: BTreeMap<CoreId, usize>,
        inner: MemorySink,
    }

    impl EquationSink for BrokenCore {
        fn write_lines(&mut self, core: CoreId, lines: &[String]) -> Result<(), SinkError> {
            *self.attempts.entry(core).or_default() += 1;
            if core == self.broken {
                return Err(SinkError::Io {
                    destination: format!("broken-{}.txt", core.0),
                    message: "disk full".to_string(),
                });
            }
            self.inner.write_lines(core, lines)
        }
    }

    struct Recorder {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl PlotRenderer for Recorder {
        fn render(&mut self, series: &[ChartSeries]) -> Result<(), AppError> {
            assert_eq!(series.len(), 4);
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AppError::new(2, "cannot draw"));
            }
            Ok(())
        }
    }

    #[test]
    fn writes_fit_then_segments_per_core() {
        let mut sink = MemorySink::new();
        let report = run_batch(&example_series(), &FitOptions::default(), &mut sink, &mut []);

        assert_eq!(report.failure_count(), 0);
        assert_eq!(
            sink.lines_for(CoreId(0)),
            &[
                "0 <=x< 60; y= 40.0 + 0.06667x;  least squares".to_string(),
                "0 <=x< 30; y_0= 40.0000 + 0.0667x; interpolation".to_string(),
                "30 <=x< 60; y_1= 40.0000 + 0.0667x; interpolation".to_string(),
            ]
        );
        assert_eq!(sink.lines_for(CoreId(1))[0], "0 <=x< 60; y= 45.0 + 0.0x;  least squares");
        assert_eq!(report.fit_records().count(), 4);
        assert_eq!(report.segments().count(), 8);
    }

    #[test]
    fn sink_failure_stops_only_that_core() {
        let mut sink = BrokenCore {
            broken: CoreId(2),
            attempts: BTreeMap::new(),
            inner: MemorySink::new(),
        };
        let report = run_batch(&example_series(), &FitOptions::default(), &mut sink, &mut []);

        // One attempt for the fit line, none for the segments.
        assert_eq!(sink.attempts[&CoreId(2)], 1);
        assert_eq!(sink.attempts[&CoreId(3)], 2);
        assert!(sink.inner.lines_for(CoreId(2)).is_empty());
        assert_eq!(sink.inner.lines_for(CoreId(3)).len(), 3);

        assert_eq!(report.failure_count(), 1);
        let err = report.cores[2].sink_error.as_ref().unwrap();
        assert_eq!(err.kind(), "sink_write");
        assert!(err.to_string().contains("broken-2.txt"));
        // The computation itself still succeeded.
        assert!(report.cores[2].fit.is_ok());
    }

    #[test]
    fn duplicate_times_fail_per_core_and_per_segment() {
        let series = TemperatureSeries::from_columns(vec![0.0, 0.0], vec![vec![40.0, 41.0], vec![50.0, 52.0]]);
        let mut sink = MemorySink::new();
        let report = run_batch(&series, &FitOptions::default(), &mut sink, &mut []);

        // Per core: singular least squares + one degenerate segment.
        assert_eq!(report.failure_count(), 4);
        let kinds: Vec<&str> = report.failures().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["singular_matrix", "degenerate_segment", "singular_matrix", "degenerate_segment"]
        );
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn renderers_run_once_and_plot_errors_do_not_count() {
        let calls = Rc::new(Cell::new(0));
        let mut renderers: Vec<Box<dyn PlotRenderer>> = vec![
            Box::new(Recorder {
                calls: Rc::clone(&calls),
                fail: false,
            }),
            Box::new(Recorder {
                calls: Rc::clone(&calls),
                fail: true,
            }),
        ];
        let mut sink = MemorySink::new();
        let report = run_batch(&example_series(), &FitOptions::default(), &mut sink, &mut renderers);

        assert_eq!(calls.get(), 2);
        assert_eq!(report.plot_errors, vec!["cannot draw".to_string()]);
        assert_eq!(report.failure_count(), 0);
    }
}
