//! Data sources other than a recorded log.

pub mod synthetic;

pub use synthetic::*;
