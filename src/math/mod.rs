//! Mathematical utilities: small matrices, Gaussian elimination, rounding and
//! least-squares diagnostics.

pub mod gauss;
pub mod matrix;
pub mod ols;
pub mod rounding;

pub use gauss::*;
pub use matrix::*;
pub use ols::*;
pub use rounding::*;
