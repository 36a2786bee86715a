//! Reporting: per-core equation records and the batch summary.

pub mod equation;
pub mod format;

pub use equation::*;
pub use format::*;
