//! Global least-squares line per core.
//!
//! For every core we solve the 2-unknown normal equations
//!
//! ```text
//! XᵗX β = Xᵗy,   X = [1, t]
//! ```
//!
//! with the explicit Gaussian elimination in `math::gauss`. `X` (and therefore
//! `XᵗX`) only depends on the shared time axis, so it is built once per batch
//! and reused read-only for every core.

use tracing::{debug, info, warn};

use crate::domain::{CoreSeries, FitRecord, PivotRule, TemperatureSeries, DEFAULT_DIGITS};
use crate::error::FitError;
use crate::math::{Matrix, MatrixError, design_matrix, fit_quality, round_significant, solve};

/// Options that affect how each core is solved and reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub pivot: PivotRule,
    /// Significant digits kept in the reported coefficients (0 keeps all).
    pub digits: u32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            pivot: PivotRule::Greater,
            digits: DEFAULT_DIGITS,
        }
    }
}

/// The parts of the normal equations shared by all cores.
#[derive(Debug, Clone)]
pub struct NormalSystem {
    times: Vec<f64>,
    xt: Matrix,
    xtx: Matrix,
}

impl NormalSystem {
    /// Build `Xᵗ` and `XᵗX` for a time axis.
    pub fn new(times: &[f64]) -> Result<Self, MatrixError> {
        let x = design_matrix(times);
        let xt = x.transpose();
        let xtx = xt.multiply(&x)?;
        Ok(Self {
            times: times.to_vec(),
            xt,
            xtx,
        })
    }

    pub fn xtx(&self) -> &Matrix {
        &self.xtx
    }

    /// `[XᵗX | Xᵗy]` for one core's temperatures.
    pub fn augmented(&self, temps: &[f64]) -> Result<Matrix, MatrixError> {
        let y = Matrix::column(temps);
        let xty = self.xt.multiply(&y)?;
        self.xtx.hstack(&xty)
    }
}

/// Fit every core. Results come back in core order; one failure never hides another core.
pub fn fit_all(series: &TemperatureSeries, opts: &FitOptions) -> Vec<Result<FitRecord, FitError>> {
    info!(cores = series.cores.len(), samples = series.len(), "least squares pass");

    let system = match prepare_system(&series.times) {
        Ok(system) => system,
        Err(message) => {
            return series
                .cores
                .iter()
                .map(|c| {
                    warn!(core = %c.core, %message, "least squares skipped");
                    Err(FitError::InputShape {
                        core: c.core,
                        message: message.clone(),
                    })
                })
                .collect();
        }
    };

    series
        .cores
        .iter()
        .map(|core| {
            let result = fit_core(&system, core, opts);
            match &result {
                Ok(rec) => info!(core = %rec.core, intercept = rec.intercept, slope = rec.slope, "least squares fit"),
                Err(err) => warn!(%err, "least squares failed"),
            }
            result
        })
        .collect()
}

/// Fit one core against a prepared normal system.
pub fn fit_core(system: &NormalSystem, core: &CoreSeries, opts: &FitOptions) -> Result<FitRecord, FitError> {
    let times = &system.times;
    let (start, end) = match (times.first(), times.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => {
            return Err(FitError::InputShape {
                core: core.core,
                message: "no samples".to_string(),
            });
        }
    };

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
    if let Some(idx) = core.temps.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InputShape {
            core: core.core,
            message: format!("non-finite temperature at sample {idx}"),
        });
    }

    let singular = |err: MatrixError| FitError::SingularMatrix {
        core: core.core,
        start,
        end,
        reason: err.to_string(),
    };

    let augmented = system.augmented(&core.temps).map_err(singular)?;
    let trace = solve(augmented, opts.pivot).map_err(singular)?;
    debug!(core = %core.core, swaps = ?trace.swaps, echelon = ?trace.echelon, "normal equations solved");

    let (intercept, slope) = (trace.solution[0], trace.solution[1]);
    let quality = fit_quality(times, &core.temps, intercept, slope).ok_or_else(|| FitError::InputShape {
        core: core.core,
        message: "cannot evaluate fit diagnostics".to_string(),
    })?;

    Ok(FitRecord {
        core: core.core,
        start,
        end,
        intercept: round_significant(intercept, opts.digits),
        slope: round_significant(slope, opts.digits),
        quality,
    })
}

fn prepare_system(times: &[f64]) -> Result<NormalSystem, String> {
    if times.len() < 2 {
        return Err(format!("need at least 2 samples, got {}", times.len()));
    }
    if let Some(idx) = times.iter().position(|t| !t.is_finite()) {
        return Err(format!("non-finite time offset at sample {idx}"));
    }
    NormalSystem::new(times).map_err(|e| e.to_string())
}
