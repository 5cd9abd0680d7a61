//! Saga events recorded in the journal.

use chrono::{DateTime, Utc};
use common::{BookingId, SagaId};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, StepError};
use crate::hotel_booking::Leg;

/// Events that can occur during saga execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Saga execution started.
    SagaStarted(SagaStartedData),

    /// A booking step started execution.
    StepStarted(StepData),

    /// A booking step completed successfully.
    StepCompleted(StepCompletedData),

    /// A booking step failed terminally, after retries if any.
    StepFailed(StepFailedData),

    /// Compensation started after a step failure.
    CompensationStarted(CompensationData),

    /// A compensation step completed successfully.
    CompensationStepCompleted(StepCompletedData),

    /// A compensation step failed (logged, compensation continues).
    CompensationStepFailed(CompensationFailedData),

    /// Saga completed successfully.
    SagaCompleted(SagaCompletedData),

    /// Saga failed, after compensation if any.
    SagaFailed(SagaFailedData),
}

impl SagaEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::StepStarted(_) => "StepStarted",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::SagaCompleted(_) => "SagaCompleted",
            SagaEvent::SagaFailed(_) => "SagaFailed",
        }
    }
}

/// Data for SagaStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The saga instance ID.
    pub saga_id: SagaId,
    /// The booking being made.
    pub booking_id: BookingId,
    pub user_id: String,
    /// The type of saga (e.g., "HotelBooking").
    pub saga_type: String,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data for StepStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub leg: Leg,
}

/// Data for StepCompleted and CompensationStepCompleted events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletedData {
    pub leg: Leg,
    /// Resource booked, or released for a compensation.
    pub resource_id: String,
}

/// Data for StepFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailedData {
    /// The step that failed.
    pub leg: Leg,
    pub error_kind: ErrorKind,
    pub error_code: String,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for CompensationStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step whose failure triggered compensation.
    pub failed_leg: Leg,
    /// Legs to compensate, in the order they are unwound.
    pub legs: Vec<Leg>,
}

/// Data for CompensationStepFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationFailedData {
    pub leg: Leg,
    pub resource_id: String,
    pub error: String,
}

/// Data for SagaCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaCompletedData {
    /// When the saga completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for SagaFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaFailedData {
    /// Reason for failure.
    pub reason: String,
    /// When the saga failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    /// Creates a SagaStarted event.
    pub fn saga_started(
        saga_id: SagaId,
        booking_id: BookingId,
        user_id: impl Into<String>,
        saga_type: impl Into<String>,
    ) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id,
            booking_id,
            user_id: user_id.into(),
            saga_type: saga_type.into(),
            started_at: Utc::now(),
        })
    }

    /// Creates a StepStarted event.
    pub fn step_started(leg: Leg) -> Self {
        SagaEvent::StepStarted(StepData { leg })
    }

    /// Creates a StepCompleted event.
    pub fn step_completed(leg: Leg, resource_id: impl Into<String>) -> Self {
        SagaEvent::StepCompleted(StepCompletedData {
            leg,
            resource_id: resource_id.into(),
        })
    }

    /// Creates a StepFailed event from the step's terminal error.
    pub fn step_failed(leg: Leg, error: &StepError) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            leg,
            error_kind: error.kind(),
            error_code: error.code().to_string(),
            error: error.message().to_string(),
        })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(failed_leg: Leg, legs: Vec<Leg>) -> Self {
        SagaEvent::CompensationStarted(CompensationData { failed_leg, legs })
    }

    /// Creates a CompensationStepCompleted event.
    pub fn compensation_step_completed(leg: Leg, resource_id: impl Into<String>) -> Self {
        SagaEvent::CompensationStepCompleted(StepCompletedData {
            leg,
            resource_id: resource_id.into(),
        })
    }

    /// Creates a CompensationStepFailed event.
    pub fn compensation_step_failed(
        leg: Leg,
        resource_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        SagaEvent::CompensationStepFailed(CompensationFailedData {
            leg,
            resource_id: resource_id.into(),
            error: error.into(),
        })
    }

    /// Creates a SagaCompleted event.
    pub fn saga_completed() -> Self {
        SagaEvent::SagaCompleted(SagaCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event.
    pub fn saga_failed(reason: impl Into<String>) -> Self {
        SagaEvent::SagaFailed(SagaFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}
