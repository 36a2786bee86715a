//! Gaussian elimination on an augmented `n×(n+1)` matrix.
//!
//! The solver works in three observable stages so each can be tested on its own:
//!
//! 1. `pivot`: one row swap (at most) before eliminating a column
//! 2. `eliminate`: clear everything below the diagonal (row-echelon form)
//! 3. `back_substitute`: normalize the diagonal and clear everything above it
//!
//! After stage 3 the last column holds the solution. Both row operations use
//! the combination `row[j] = row[i] - factor * row[j]`, which scales the target
//! row instead of the source row; the diagonal is normalized at the end anyway.
//!
//! Singular systems are reported as errors, never as `inf`/`NaN` coefficients:
//! entries that cancel down to rounding noise are flushed to exactly zero, so a
//! collinear system ends with a zero diagonal entry.

use tracing::trace;

use crate::domain::PivotRule;
use crate::math::matrix::{Matrix, MatrixError};

/// Relative magnitude below which a row-operation result counts as cancelled.
pub const CANCEL_RTOL: f64 = 1e-10;

/// Intermediate states of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveTrace {
    /// Row swaps performed during elimination, in order.
    pub swaps: Vec<(usize, usize)>,
    /// The matrix after elimination (upper triangular coefficient block).
    pub echelon: Matrix,
    /// The matrix after back-substitution (identity coefficient block).
    pub reduced: Matrix,
    /// Last column of `reduced`.
    pub solution: Vec<f64>,
}

/// Pick the pivot row for `col` among rows `col..n`.
///
/// A candidate replaces the current best only when strictly greater under
/// `rule`, so ties keep the lower row index.
pub fn select_pivot(m: &Matrix, col: usize, rule: PivotRule) -> usize {
    let key = |v: f64| match rule {
        PivotRule::Greater => v,
        PivotRule::Magnitude => v.abs(),
    };

    let mut best = col;
    for r in (col + 1)..m.nrows() {
        if key(m[(r, col)]) > key(m[(best, col)]) {
            best = r;
        }
    }
    best
}

/// Swap the selected pivot row into place. Returns the swap, if any.
pub fn pivot(m: &mut Matrix, col: usize, rule: PivotRule) -> Option<(usize, usize)> {
    let best = select_pivot(m, col, rule);
    if best == col {
        return None;
    }
    m.swap_rows(col, best);
    trace!(col, from = best, "pivot swap");
    Some((col, best))
}

/// Reduce the coefficient block to upper-triangular form in place.
///
/// Returns the row swaps performed.
pub fn eliminate(m: &mut Matrix, rule: PivotRule) -> Result<Vec<(usize, usize)>, MatrixError> {
    check_augmented(m)?;
    let n = m.nrows();
    let mut swaps = Vec::new();

    for i in 0..n.saturating_sub(1) {
        if let Some(swap) = pivot(m, i, rule) {
            swaps.push(swap);
        }

        let p = m[(i, i)];
        for j in (i + 1)..n {
            let below = m[(j, i)];
            if below == 0.0 {
                continue;
            }
            if p == 0.0 {
                return Err(MatrixError::ZeroPivot { column: i });
            }
            let quotient = p / below;
            combine_rows(m, j, i, quotient);
            m[(j, i)] = 0.0;
        }
    }

    Ok(swaps)
}

/// Reduce an upper-triangular augmented matrix to `[I | x]` in place.
pub fn back_substitute(m: &mut Matrix) -> Result<(), MatrixError> {
    check_augmented(m)?;
    let n = m.nrows();

    for i in (0..n).rev() {
        let d = m[(i, i)];
        if d == 0.0 || !d.is_finite() {
            return Err(MatrixError::Singular { row: i });
        }
        for v in m.row_mut(i) {
            *v /= d;
        }
        m[(i, i)] = 1.0;

        for j in (0..i).rev() {
            let above = m[(j, i)];
            if above == 0.0 {
                continue;
            }
            let mult = m[(i, i)] / above;
            combine_rows(m, j, i, mult);
            m[(j, i)] = 0.0;
        }
    }

    Ok(())
}

/// Solve an augmented system, keeping every intermediate state.
pub fn solve(augmented: Matrix, rule: PivotRule) -> Result<SolveTrace, MatrixError> {
    let mut m = augmented;
    let swaps = eliminate(&mut m, rule)?;
    let echelon = m.clone();

    back_substitute(&mut m)?;
    let solution = m.column_values(m.ncols() - 1);
    if let Some(row) = solution.iter().position(|v| !v.is_finite()) {
        return Err(MatrixError::Singular { row });
    }

    Ok(SolveTrace {
        swaps,
        echelon,
        reduced: m,
        solution,
    })
}

/// `row[target] = row[source] - factor * row[target]`, flushing cancelled entries to zero.
fn combine_rows(m: &mut Matrix, target: usize, source: usize, factor: f64) {
    for c in 0..m.ncols() {
        let a = m[(source, c)];
        let b = factor * m[(target, c)];
        let v = a - b;
        let scale = a.abs().max(b.abs());
        m[(target, c)] = if v.abs() <= CANCEL_RTOL * scale { 0.0 } else { v };
    }
}

fn check_augmented(m: &Matrix) -> Result<(), MatrixError> {
    if m.nrows() == 0 || m.ncols() != m.nrows() + 1 {
        return Err(MatrixError::Dimension {
            op: "solve",
            lhs_rows: m.nrows(),
            lhs_cols: m.ncols(),
            rhs_rows: m.nrows(),
            rhs_cols: m.nrows() + 1,
        });
    }
    Ok(())
}
