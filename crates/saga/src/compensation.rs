//! Pending compensations and the stack they are unwound from.

use std::str::FromStr;

use common::BookingId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hotel_booking::Leg;

/// Undo action for a booking step that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCompensation {
    Hotel {
        booking_id: BookingId,
        resource_id: String,
    },
    Dinner {
        booking_id: BookingId,
        resource_id: String,
    },
    Parking {
        booking_id: BookingId,
        resource_id: String,
    },
}

impl PendingCompensation {
    /// Creates the compensation for a completed leg.
    pub fn for_leg(leg: Leg, booking_id: BookingId, resource_id: impl Into<String>) -> Self {
        let resource_id = resource_id.into();
        match leg {
            Leg::Hotel => PendingCompensation::Hotel {
                booking_id,
                resource_id,
            },
            Leg::Dinner => PendingCompensation::Dinner {
                booking_id,
                resource_id,
            },
            Leg::Parking => PendingCompensation::Parking {
                booking_id,
                resource_id,
            },
        }
    }

    pub fn leg(&self) -> Leg {
        match self {
            PendingCompensation::Hotel { .. } => Leg::Hotel,
            PendingCompensation::Dinner { .. } => Leg::Dinner,
            PendingCompensation::Parking { .. } => Leg::Parking,
        }
    }

    pub fn booking_id(&self) -> &BookingId {
        match self {
            PendingCompensation::Hotel { booking_id, .. }
            | PendingCompensation::Dinner { booking_id, .. }
            | PendingCompensation::Parking { booking_id, .. } => booking_id,
        }
    }

    pub fn resource_id(&self) -> &str {
        match self {
            PendingCompensation::Hotel { resource_id, .. }
            | PendingCompensation::Dinner { resource_id, .. }
            | PendingCompensation::Parking { resource_id, .. } => resource_id,
        }
    }
}

/// Compensations of one saga run, pushed in booking order.
///
/// The stack is consumed by [`CompensationStack::unwind`], which yields the
/// entries last-in first-out.
#[derive(Debug, Default)]
pub struct CompensationStack {
    pending: Vec<PendingCompensation>,
}

impl CompensationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, compensation: PendingCompensation) {
        self.pending.push(compensation);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consumes the stack, returning compensations in reverse booking order.
    pub fn unwind(self) -> Vec<PendingCompensation> {
        let mut pending = self.pending;
        pending.reverse();
        pending
    }
}

/// How the coordinator runs the compensations of a failed saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationMode {
    /// One after another, most recent booking first.
    #[default]
    Sequential,
    /// All at once; results are joined before the saga finishes.
    Parallel,
}

impl CompensationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationMode::Sequential => "sequential",
            CompensationMode::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for CompensationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`CompensationMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown compensation mode '{0}', expected 'sequential' or 'parallel'")]
pub struct UnknownCompensationMode(pub String);

impl FromStr for CompensationMode {
    type Err = UnknownCompensationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(CompensationMode::Sequential),
            "parallel" => Ok(CompensationMode::Parallel),
            _ => Err(UnknownCompensationMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(leg: Leg) -> PendingCompensation {
        PendingCompensation::for_leg(leg, BookingId::new("b1"), format!("{leg}-1"))
    }

    #[test]
    fn test_unwind_is_lifo() {
        let mut stack = CompensationStack::new();
        stack.push(pending(Leg::Hotel));
        stack.push(pending(Leg::Dinner));
        assert_eq!(stack.len(), 2);

        let legs: Vec<Leg> = stack.unwind().iter().map(|c| c.leg()).collect();
        assert_eq!(legs, vec![Leg::Dinner, Leg::Hotel]);
    }

    #[test]
    fn test_empty_stack_unwinds_to_nothing() {
        let stack = CompensationStack::new();
        assert!(stack.is_empty());
        assert!(stack.unwind().is_empty());
    }

    #[test]
    fn test_accessors() {
        let comp = pending(Leg::Parking);
        assert_eq!(comp.leg(), Leg::Parking);
        assert_eq!(comp.booking_id().as_str(), "b1");
        assert_eq!(comp.resource_id(), "parking-1");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("parallel".parse::<CompensationMode>(), Ok(CompensationMode::Parallel));
        assert_eq!(" Sequential ".parse::<CompensationMode>(), Ok(CompensationMode::Sequential));
        assert!("sideways".parse::<CompensationMode>().is_err());
        assert_eq!(CompensationMode::default(), CompensationMode::Sequential);
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&CompensationMode::Parallel).unwrap();
        assert_eq!(json, "\"parallel\"");
    }
}
