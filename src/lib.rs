//! `core-temps` library crate.
//!
//! The binary (`ctemp`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the solver and fitters are reusable outside the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
