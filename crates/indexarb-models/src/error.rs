//! Enumerated error conditions for the analytical core.
//!
//! The platform's public functions never leak arbitrary errors; every
//! failure is one of these kinds so UI layers can render a specific
//! message per condition and programmatic callers can branch.

use std::time::Duration;

use thiserror::Error;

/// Platform-wide error kinds.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A referenced date, symbol, or file is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed configuration, unknown direction, non-positive quantity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required precondition does not hold: stale price under a required
    /// leg, broker not connected, too few bars for analysis.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    /// Input data contradicts itself (bid above ask, negative volume).
    #[error("inconsistent data: {0}")]
    InconsistentData(String),

    /// A broker call exceeded its per-call deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// A scan was cancelled before completion.
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable name of the condition.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::PreconditionNotMet(_) => "precondition_not_met",
            Error::InconsistentData(_) => "inconsistent_data",
            Error::DeadlineExceeded(_) => "deadline_exceeded",
            Error::Cancelled => "cancelled",
        }
    }
}
