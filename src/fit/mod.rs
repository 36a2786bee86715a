//! The two fitting passes.
//!
//! - `least_squares`: one global line per core via the normal equations
//! - `interpolate`: one local line per consecutive pair of samples

pub mod interpolate;
pub mod least_squares;

pub use interpolate::*;
pub use least_squares::*;
