//! Saga error types.
//!
//! Failures are split by who has to deal with them:
//! - [`ValidationError`] rejects a request before any step runs.
//! - [`StepError`] is what a booking or compensation step reports. Its
//!   [`ErrorKind`] decides whether the retry host tries again.
//! - [`CompensationFailure`] is a step error raised while unwinding. It is
//!   logged and recorded, never propagated.
//! - [`SagaError`] is an infrastructure fault of the hosting runtime. It is
//!   the only error that escapes [`crate::SagaCoordinator::run_booking`].

use common::SagaId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hotel_booking::Leg;

/// Classification of a step failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Domain rule violation or invalid input. Never retried.
    Business,
    /// External dependency unavailable. Retried within the attempt budget.
    Transient,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Business => "business",
            ErrorKind::Transient => "transient",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure reported by a booking or compensation step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepError {
    /// Permanent failure: the same request will fail the same way.
    #[error("{message}")]
    Business { code: String, message: String },

    /// Temporary failure of an external system.
    #[error("{message}")]
    Transient { code: String, message: String },
}

impl StepError {
    /// Creates a business (non-retryable) error.
    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        StepError::Business {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a transient (retryable) error.
    pub fn transient(code: impl Into<String>, message: impl Into<String>) -> Self {
        StepError::Transient {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::Business { .. } => ErrorKind::Business,
            StepError::Transient { .. } => ErrorKind::Transient,
        }
    }

    /// Returns the machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            StepError::Business { code, .. } | StepError::Transient { code, .. } => code,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            StepError::Business { message, .. } | StepError::Transient { message, .. } => {
                message
            }
        }
    }
}

/// Structural defect in a [`crate::BookingRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty after trimming whitespace.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// Two optional fields contradict each other.
    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A compensation that failed terminally during unwind.
#[derive(Debug, Clone, Error)]
#[error("Compensation for {leg} failed: {source}")]
pub struct CompensationFailure {
    pub leg: Leg,
    pub resource_id: String,
    #[source]
    pub source: StepError,
}

/// Infrastructure faults that abort a saga run.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The saga journal rejected an append.
    #[error("Journal error for saga {saga_id}: {reason}")]
    Journal { saga_id: SagaId, reason: String },
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
