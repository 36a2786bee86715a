//! Piecewise linear interpolation: one line per consecutive pair of samples.
//!
//! ```text
//! slope     = (y[i+1] - y[i]) / (x[i+1] - x[i])
//! intercept = y[i] - slope * x[i]
//! ```
//!
//! Segment `i` covers `[x[i], x[i+1])`. Nothing requires a constant step; only
//! the pairwise deltas matter.

use tracing::{info, warn};

use crate::domain::{CoreId, CoreSeries, InterpolationRecord, TemperatureSeries};
use crate::error::FitError;

/// Interpolation output for one core.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreInterpolation {
    pub core: CoreId,
    /// Segments in increasing time order. Indices of skipped segments are absent.
    pub segments: Vec<InterpolationRecord>,
    /// Segments that could not be built (zero time delta).
    pub skipped: Vec<FitError>,
}

/// Interpolate every core, in core order.
pub fn interpolate_all(series: &TemperatureSeries) -> Vec<Result<CoreInterpolation, FitError>> {
    info!(cores = series.cores.len(), samples = series.len(), "interpolation pass");

    series
        .cores
        .iter()
        .map(|core| {
            let result = interpolate_core(&series.times, core);
            match &result {
                Ok(out) => {
                    for err in &out.skipped {
                        warn!(%err, "segment skipped");
                    }
                    info!(core = %out.core, segments = out.segments.len(), skipped = out.skipped.len(), "interpolated");
                }
                Err(err) => warn!(%err, "interpolation failed"),
            }
            result
        })
        .collect()
}

/// Interpolate one core over the shared time axis.
pub fn interpolate_core(times: &[f64], core: &CoreSeries) -> Result<CoreInterpolation, FitError> {
    if core.temps.len() != times.len() {
        return Err(FitError::InputShape {
            core: core.core,
            message: format!(
                "series length {} does not match {} time offsets",
                core.temps.len(),
                times.len()
            ),
        });
    }
    if times.len() < 2 {
        return Err(FitError::InputShape {
            core: core.core,
            message: format!("need at least 2 samples, got {}", times.len()),
        });
    }
    if let Some(idx) = core.temps.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InputShape {
            core: core.core,
            message: format!("non-finite temperature at sample {idx}"),
        });
    }

    let mut segments = Vec::with_capacity(times.len() - 1);
    let mut skipped = Vec::new();

    for (segment, (x, y)) in times.windows(2).zip(core.temps.windows(2)).enumerate() {
        let (x0, x1) = (x[0], x[1]);
        let (y0, y1) = (y[0], y[1]);

        let dx = x1 - x0;
        if dx == 0.0 {
            skipped.push(FitError::DegenerateSegment {
                core: core.core,
                segment,
                x: x0,
            });
            continue;
        }

        let slope = (y1 - y0) / dx;
        let intercept = y0 - slope * x0;
        segments.push(InterpolationRecord {
            core: core.core,
            segment,
            start: x0,
            end: x1,
            intercept,
            slope,
        });
    }

    Ok(CoreInterpolation {
        core: core.core,
        segments,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(temps: Vec<f64>) -> CoreSeries {
        CoreSeries { core: CoreId(0), temps }
    }

    #[test]
    fn three_sample_example() {
        let out = interpolate_core(&[0.0, 30.0, 60.0], &core(vec![40.0, 42.0, 44.0])).unwrap();
        assert_eq!(out.segments.len(), 2);
        assert!(out.skipped.is_empty());

        for (idx, seg) in out.segments.iter().enumerate() {
            assert_eq!(seg.segment, idx);
            assert!((seg.intercept - 40.0).abs() < 1e-12);
            assert!((seg.slope - 2.0 / 30.0).abs() < 1e-12);
        }
        assert_eq!((out.segments[0].start, out.segments[0].end), (0.0, 30.0));
        assert_eq!((out.segments[1].start, out.segments[1].end), (30.0, 60.0));
    }

    #[test]
    fn segments_reproduce_endpoints() {
        let times = [0.0, 30.0, 60.0, 90.0];
        let temps = vec![47.0, 52.0, 49.0, 61.0];
        let out = interpolate_core(&times, &core(temps.clone())).unwrap();
        for seg in &out.segments {
            let i = seg.segment;
            assert!((seg.eval(times[i]) - temps[i]).abs() < 1e-9);
            assert!((seg.eval(times[i + 1]) - temps[i + 1]).abs() < 1e-9);
        }
    }

    #[test]
    fn non_uniform_steps() {
        let times = [0.0, 10.0, 45.0, 46.5];
        let out = interpolate_core(&times, &core(vec![40.0, 45.0, 38.0, 41.0])).unwrap();
        assert_eq!(out.segments.len(), 3);
        assert!((out.segments[0].slope - 0.5).abs() < 1e-12);
        assert!((out.segments[1].slope - (-0.2)).abs() < 1e-12);
        assert!((out.segments[2].slope - 2.0).abs() < 1e-12);
        assert!((out.segments[2].eval(46.5) - 41.0).abs() < 1e-9);
    }

    #[test]
    fn two_samples_give_one_segment() {
        let out = interpolate_core(&[0.0, 30.0], &core(vec![50.0, 56.0])).unwrap();
        assert_eq!(out.segments.len(), 1);
        assert!((out.segments[0].intercept - 50.0).abs() < 1e-12);
        assert!((out.segments[0].slope - 0.2).abs() < 1e-12);
    }

    #[test]
    fn zero_delta_segment_is_skipped_and_flagged() {
        let out = interpolate_core(&[0.0, 30.0, 30.0, 60.0], &core(vec![40.0, 42.0, 43.0, 44.0])).unwrap();
        assert_eq!(out.segments.iter().map(|s| s.segment).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(
            out.skipped,
            vec![FitError::DegenerateSegment {
                core: CoreId(0),
                segment: 1,
                x: 30.0
            }]
        );
    }

    #[test]
    fn shape_errors() {
        assert!(matches!(
            interpolate_core(&[0.0], &core(vec![40.0])),
            Err(FitError::InputShape { .. })
        ));
        assert!(matches!(
            interpolate_core(&[0.0, 30.0], &core(vec![40.0])),
            Err(FitError::InputShape { .. })
        ));
        assert!(matches!(
            interpolate_core(&[0.0, 30.0], &core(vec![40.0, f64::INFINITY])),
            Err(FitError::InputShape { .. })
        ));
    }

    #[test]
    fn all_cores_in_order() {
        let series = TemperatureSeries::from_columns(
            vec![0.0, 30.0],
            vec![vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0], vec![7.0, 9.0]],
        );
        let out = interpolate_all(&series);
        assert_eq!(out.len(), 4);
        assert!(out[1].is_err());
        let cores: Vec<u8> = out.iter().flatten().map(|c| c.core.0).collect();
        assert_eq!(cores, vec![0, 2, 3]);
    }
}
