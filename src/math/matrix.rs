//! Small dense matrices with owned, row-major storage.
//!
//! The least-squares system here never grows beyond `2×N` (design matrix
//! transposed) times `N×2`, so a plain triple loop is all the multiply needs.

use std::fmt;
use std::ops::{Index, IndexMut};

use thiserror::Error;

/// Errors raised by matrix construction and the Gaussian solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Operand shapes do not fit the operation.
    #[error("dimension mismatch in {op}: {lhs_rows}x{lhs_cols} vs {rhs_rows}x{rhs_cols}")]
    Dimension {
        op: &'static str,
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },
    /// The pivot of `column` is zero while a row below still has a non-zero entry.
    #[error("zero pivot in column {column}")]
    ZeroPivot { column: usize },
    /// A diagonal entry vanished during back-substitution, or the solution is not finite.
    #[error("singular system at row {row}")]
    Singular { row: usize },
}

#[derive(Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from row-major values.
    pub fn from_row_slice(rows: usize, cols: usize, values: &[f64]) -> Result<Self, MatrixError> {
        if values.len() != rows * cols {
            return Err(MatrixError::Dimension {
                op: "from_row_slice",
                lhs_rows: rows,
                lhs_cols: cols,
                rhs_rows: values.len(),
                rhs_cols: 1,
            });
        }
        Ok(Self {
            rows,
            cols,
            data: values.to_vec(),
        })
    }

    /// An `N×1` column vector.
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }

    pub fn column_values(&self, c: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self[(r, c)]).collect()
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out[(c, r)] = self[(r, c)];
            }
        }
        out
    }

    /// `[self | rhs]`: horizontal concatenation of two matrices with equal row counts.
    pub fn hstack(&self, rhs: &Matrix) -> Result<Self, MatrixError> {
        if self.rows != rhs.rows {
            return Err(self.dimension_error("hstack", rhs));
        }
        let cols = self.cols + rhs.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(self.row(r));
            data.extend_from_slice(rhs.row(r));
        }
        Ok(Self {
            rows: self.rows,
            cols,
            data,
        })
    }

    /// `self · rhs`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Self, MatrixError> {
        if self.cols != rhs.rows {
            return Err(self.dimension_error("multiply", rhs));
        }
        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self[(i, k)] * rhs[(k, j)];
                }
                out[(i, j)] = acc;
            }
        }
        Ok(out)
    }

    fn dimension_error(&self, op: &'static str, rhs: &Matrix) -> MatrixError {
        MatrixError::Dimension {
            op,
            lhs_rows: self.rows,
            lhs_cols: self.cols,
            rhs_rows: rhs.rows,
            rhs_cols: rhs.cols,
        }
    }
}

/// `a · b` for an `m×k` and a `k×n` matrix.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    a.multiply(b)
}

/// The `N×2` design matrix `[1, t]` for a sequence of time offsets.
pub fn design_matrix(times: &[f64]) -> Matrix {
    let mut out = Matrix::zeros(times.len(), 2);
    for (r, &t) in times.iter().enumerate() {
        out[(r, 0)] = 1.0;
        out[(r, 1)] = t;
    }
    out
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.data[r * self.cols + c]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{} [", self.rows, self.cols)?;
        for r in 0..self.rows {
            let parts: Vec<String> = self.row(r).iter().map(|v| format!("{v:.6}")).collect();
            writeln!(f, "  [{}]", parts.join(", "))?;
        }
        write!(f, "]")
    }
}
