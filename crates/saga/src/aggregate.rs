//! Saga instance view rebuilt from journal events.

use std::collections::BTreeMap;

use common::{BookingId, SagaId};
use serde::{Deserialize, Serialize};

use crate::events::SagaEvent;
use crate::hotel_booking::Leg;
use crate::state::SagaState;

/// State of one saga run, derived purely from its events.
///
/// Tracks the legs booked so far together with the resources they hold, the
/// legs compensated while unwinding and the reason the saga failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SagaInstance {
    id: Option<SagaId>,
    booking_id: Option<BookingId>,
    user_id: Option<String>,
    saga_type: String,
    state: SagaState,
    completed_steps: Vec<Leg>,
    resource_ids: BTreeMap<Leg, String>,
    compensated_steps: Vec<Leg>,
    failed_compensations: Vec<Leg>,
    /// Reason for failure, if any.
    failure_reason: Option<String>,
    /// Number of events applied.
    version: u64,
}

impl SagaInstance {
    /// Rebuilds an instance by applying `events` in order.
    pub fn replay(events: impl IntoIterator<Item = SagaEvent>) -> Self {
        let mut saga = SagaInstance::default();
        for event in events {
            saga.apply(event);
        }
        saga
    }

    pub fn apply(&mut self, event: SagaEvent) {
        self.version += 1;
        match event {
            SagaEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.booking_id = Some(data.booking_id);
                self.user_id = Some(data.user_id);
                self.saga_type = data.saga_type;
                self.state = SagaState::Validating;
            }
            SagaEvent::StepStarted(data) => {
                self.state = SagaState::booking(data.leg);
            }
            SagaEvent::StepCompleted(data) => {
                self.completed_steps.push(data.leg);
                self.resource_ids.insert(data.leg, data.resource_id);
            }
            SagaEvent::StepFailed(data) => {
                self.failure_reason = Some(data.error);
            }
            SagaEvent::CompensationStarted(_) => {
                self.state = SagaState::Compensating;
            }
            SagaEvent::CompensationStepCompleted(data) => {
                self.compensated_steps.push(data.leg);
            }
            SagaEvent::CompensationStepFailed(data) => {
                // The saga keeps unwinding; the reservation stays held.
                self.failed_compensations.push(data.leg);
            }
            SagaEvent::SagaCompleted(_) => {
                self.state = SagaState::Succeeded;
            }
            SagaEvent::SagaFailed(data) => {
                self.state = SagaState::Failed;
                self.failure_reason = Some(data.reason);
            }
        }
    }
}

// Query methods
impl SagaInstance {
    pub fn id(&self) -> Option<SagaId> {
        self.id
    }

    pub fn booking_id(&self) -> Option<&BookingId> {
        self.booking_id.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn saga_type(&self) -> &str {
        &self.saga_type
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Legs booked successfully, in booking order.
    pub fn completed_steps(&self) -> &[Leg] {
        &self.completed_steps
    }

    /// Resource held by a booked leg.
    pub fn resource_id(&self, leg: Leg) -> Option<&str> {
        self.resource_ids.get(&leg).map(String::as_str)
    }

    /// Legs compensated successfully, in the order their results were recorded.
    pub fn compensated_steps(&self) -> &[Leg] {
        &self.compensated_steps
    }

    /// Legs whose compensation failed after exhausting retries.
    pub fn failed_compensations(&self) -> &[Leg] {
        &self.failed_compensations
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
