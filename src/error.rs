//! Error types.
//!
//! Two layers:
//!
//! - `AppError`: a message plus a process exit code, for failures that stop the
//!   program (bad flags, unreadable input, terminal errors).
//! - `FitError`: failures recovered per core or per segment inside a batch.
//!   These never stop the batch; they end up in the run summary.

use serde::Serialize;
use thiserror::Error;

use crate::domain::CoreId;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A failure isolated to one core (or one segment of one core).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("{core}: {message}")]
    InputShape { core: CoreId, message: String },

    #[error("{core}: normal equations are singular over [{start}, {end}] ({reason})")]
    SingularMatrix {
        core: CoreId,
        start: f64,
        end: f64,
        reason: String,
    },

    #[error("{core} segment {segment}: zero time delta at x={x}")]
    DegenerateSegment { core: CoreId, segment: usize, x: f64 },

    #[error("{core}: cannot write to '{destination}': {message}")]
    SinkWrite {
        core: CoreId,
        destination: String,
        message: String,
    },
}

impl FitError {
    /// Stable short name used in summaries and exports.
    pub fn kind(&self) -> &'static str {
        match self {
            FitError::InputShape { .. } => "input_shape",
            FitError::SingularMatrix { .. } => "singular_matrix",
            FitError::DegenerateSegment { .. } => "degenerate_segment",
            FitError::SinkWrite { .. } => "sink_write",
        }
    }

    pub fn core(&self) -> CoreId {
        match self {
            FitError::InputShape { core, .. }
            | FitError::SingularMatrix { core, .. }
            | FitError::DegenerateSegment { core, .. }
            | FitError::SinkWrite { core, .. } => *core,
        }
    }

    pub fn segment(&self) -> Option<usize> {
        match self {
            FitError::DegenerateSegment { segment, .. } => Some(*segment),
            _ => None,
        }
    }
}

/// Flattened failure entry for summaries and JSON exports.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub kind: &'static str,
    pub core: CoreId,
    pub segment: Option<usize>,
    pub message: String,
}

impl From<&FitError> for FailureEntry {
    fn from(err: &FitError) -> Self {
        Self {
            kind: err.kind(),
            core: err.core(),
            segment: err.segment(),
            message: err.to_string(),
        }
    }
}
