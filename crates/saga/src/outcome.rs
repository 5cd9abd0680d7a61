//! Results produced by steps and by the saga as a whole.

use common::{BookingId, SagaId};
use serde::{Deserialize, Serialize};

use crate::hotel_booking::Leg;

/// Result of a successful booking step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    /// Handle of the reservation in the external system. Opaque to the saga.
    pub resource_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl StepResult {
    /// Creates a successful step result.
    pub fn succeeded(resource_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            resource_id: resource_id.into(),
            message: message.into(),
            error_code: None,
        }
    }
}

/// Result of a compensation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationResult {
    pub success: bool,
    pub message: String,
}

impl CompensationResult {
    /// Creates a successful compensation result.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A compensation the coordinator invoked while unwinding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationRecord {
    pub leg: Leg,
    pub resource_id: String,
    /// False when the compensation failed after exhausting its retries.
    pub success: bool,
    pub message: String,
}

/// Final result of one saga run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub saga_id: SagaId,
    pub success: bool,
    pub booking_id: BookingId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_result: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner_result: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_result: Option<StepResult>,
    /// Compensations in the order they were invoked.
    pub compensations: Vec<CompensationRecord>,
}

impl BookingOutcome {
    /// Starts a failed outcome with no leg booked yet.
    pub(crate) fn new(saga_id: SagaId, booking_id: BookingId) -> Self {
        Self {
            saga_id,
            success: false,
            booking_id,
            message: String::new(),
            hotel_result: None,
            dinner_result: None,
            parking_result: None,
            compensations: Vec::new(),
        }
    }

    pub(crate) fn record_result(&mut self, leg: Leg, result: StepResult) {
        let slot = match leg {
            Leg::Hotel => &mut self.hotel_result,
            Leg::Dinner => &mut self.dinner_result,
            Leg::Parking => &mut self.parking_result,
        };
        *slot = Some(result);
    }

    /// Returns the legs that were compensated, in invocation order.
    pub fn compensated_legs(&self) -> Vec<Leg> {
        self.compensations.iter().map(|c| c.leg).collect()
    }

    /// Returns the step result recorded for a leg, if that leg was booked.
    pub fn result_for(&self, leg: Leg) -> Option<&StepResult> {
        match leg {
            Leg::Hotel => self.hotel_result.as_ref(),
            Leg::Dinner => self.dinner_result.as_ref(),
            Leg::Parking => self.parking_result.as_ref(),
        }
    }
}
