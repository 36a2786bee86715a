//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - per-core equation files (`sink`)
//! - batch JSON export (`export`)

pub mod export;
pub mod ingest;
pub mod sink;

pub use export::*;
pub use ingest::*;
pub use sink::*;
