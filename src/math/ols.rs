//! Least-squares diagnostics.
//!
//! The fit itself is solved by the explicit Gaussian elimination in
//! `math::gauss`; this module only measures how good a given line is:
//!
//! ```text
//! r = Xβ − y          (residuals)
//! SSE = rᵗr
//! RMSE = sqrt(SSE / n)
//! g = Xᵗr             (zero at the exact least-squares solution)
//! ```
//!
//! We use nalgebra here because the diagnostics operate on the full `N×2`
//! design matrix rather than the tiny normal-equations system.

use nalgebra::{DMatrix, DVector};

use crate::domain::FitQuality;

/// Compute fit diagnostics for the line `y = intercept + slope * t`.
///
/// Returns `None` when `times` and `temps` differ in length or are empty.
pub fn fit_quality(times: &[f64], temps: &[f64], intercept: f64, slope: f64) -> Option<FitQuality> {
    if times.is_empty() || times.len() != temps.len() {
        return None;
    }

    let n = times.len();
    let x = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { times[r] });
    let y = DVector::from_column_slice(temps);
    let beta = DVector::from_column_slice(&[intercept, slope]);

    let residuals = &x * &beta - &y;
    let sse = residuals.dot(&residuals);
    let gradient = x.transpose() * &residuals;

    Some(FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        gradient_norm: gradient.norm(),
    })
}
