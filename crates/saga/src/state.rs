//! Saga state machine.

use serde::{Deserialize, Serialize};

use crate::hotel_booking::Leg;

/// The state of a saga in its lifecycle.
///
/// State transitions:
/// ```text
/// NotStarted ──► Validating ──► BookingHotel ──► BookingDinner ──► BookingParking ──► Succeeded
///                    │               │                 │                 │
///                    │               └─────────┬───────┴─────────────────┘
///                    │                         ▼
///                    └─────────────────► Compensating ──► Failed
/// ```
///
/// A saga that fails before any leg is booked goes straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Saga has not started yet.
    #[default]
    NotStarted,

    /// The booking request is being validated.
    Validating,

    BookingHotel,
    BookingDinner,
    BookingParking,

    /// A step failed and compensating transactions are in progress.
    Compensating,

    /// All legs booked (terminal state).
    Succeeded,

    /// Saga failed, after compensation if any leg was booked (terminal state).
    Failed,
}

impl SagaState {
    /// The state entered when booking `leg` starts.
    pub fn booking(leg: Leg) -> Self {
        match leg {
            Leg::Hotel => SagaState::BookingHotel,
            Leg::Dinner => SagaState::BookingDinner,
            Leg::Parking => SagaState::BookingParking,
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Succeeded | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Validating => "Validating",
            SagaState::BookingHotel => "BookingHotel",
            SagaState::BookingDinner => "BookingDinner",
            SagaState::BookingParking => "BookingParking",
            SagaState::Compensating => "Compensating",
            SagaState::Succeeded => "Succeeded",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
