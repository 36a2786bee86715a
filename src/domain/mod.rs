//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the sample model (`TemperatureSeries`, `CoreSeries`, `CoreId`)
//! - run configuration (`RunConfig`, `IngestConfig`, `PivotRule`, `TimeSource`)
//! - fit outputs (`FitRecord`, `InterpolationRecord`, `FitQuality`)

pub mod types;

pub use types::*;
