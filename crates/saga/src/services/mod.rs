//! External reservation system traits and simulated implementations.
//!
//! The coordinator only sees the traits; the simulated systems decide their
//! outcome from the booking ID and leg fields so scenarios are reproducible.

pub mod dinner;
pub mod hotel;
pub mod parking;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use common::BookingId;
use tokio::sync::RwLock;

use crate::error::StepError;

pub use dinner::{DinnerSystem, SimulatedDinnerSystem};
pub use hotel::{HotelSystem, SimulatedHotelSystem};
pub use parking::{ParkingSystem, SimulatedParkingSystem};

#[derive(Debug, Default)]
struct LedgerState {
    /// Active reservations: booking ID to resource ID.
    reservations: HashMap<BookingId, String>,
    book_calls: usize,
    cancel_calls: usize,
    book_failures: VecDeque<StepError>,
    cancel_failures: VecDeque<StepError>,
}

/// Bookkeeping shared by the simulated systems.
///
/// Counts every call that reaches the external system and lets tests queue
/// failures that are returned before the simulated outcome is evaluated.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl SimulatedLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues errors returned by the next `book` calls, one per call.
    pub async fn inject_book_failures(&self, errors: impl IntoIterator<Item = StepError>) {
        self.state.write().await.book_failures.extend(errors);
    }

    /// Queues errors returned by the next `cancel` calls, one per call.
    pub async fn inject_cancel_failures(&self, errors: impl IntoIterator<Item = StepError>) {
        self.state.write().await.cancel_failures.extend(errors);
    }

    /// Number of `book` calls received.
    pub async fn book_calls(&self) -> usize {
        self.state.read().await.book_calls
    }

    /// Number of `cancel` calls received.
    pub async fn cancel_calls(&self) -> usize {
        self.state.read().await.cancel_calls
    }

    /// Number of active reservations.
    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    /// Returns true if a reservation exists for the booking ID.
    pub async fn has_reservation(&self, booking_id: &BookingId) -> bool {
        self.state
            .read()
            .await
            .reservations
            .contains_key(booking_id)
    }

    pub(crate) async fn book(
        &self,
        booking_id: &BookingId,
        outcome: Result<&str, StepError>,
    ) -> Result<String, StepError> {
        let mut state = self.state.write().await;
        state.book_calls += 1;

        if let Some(err) = state.book_failures.pop_front() {
            return Err(err);
        }

        let resource_id = outcome?.to_string();
        state
            .reservations
            .insert(booking_id.clone(), resource_id.clone());
        Ok(resource_id)
    }

    pub(crate) async fn cancel(&self, booking_id: &BookingId) -> Result<(), StepError> {
        let mut state = self.state.write().await;
        state.cancel_calls += 1;

        if let Some(err) = state.cancel_failures.pop_front() {
            return Err(err);
        }

        // Unknown reservations cancel successfully.
        state.reservations.remove(booking_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_book_and_cancel() {
        let ledger = SimulatedLedger::new();
        let id = BookingId::new("b1");

        let resource = ledger.book(&id, Ok("room-123")).await.unwrap();
        assert_eq!(resource, "room-123");
        assert!(ledger.has_reservation(&id).await);

        ledger.cancel(&id).await.unwrap();
        assert_eq!(ledger.reservation_count().await, 0);
        assert_eq!(ledger.book_calls().await, 1);
        assert_eq!(ledger.cancel_calls().await, 1);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let ledger = SimulatedLedger::new();
        let id = BookingId::new("b1");
        ledger
            .inject_book_failures([
                StepError::transient("NETWORK_ERROR", "first"),
                StepError::transient("NETWORK_ERROR", "second"),
            ])
            .await;

        assert_eq!(
            ledger.book(&id, Ok("room-123")).await.unwrap_err().message(),
            "first"
        );
        assert_eq!(
            ledger.book(&id, Ok("room-123")).await.unwrap_err().message(),
            "second"
        );
        assert!(ledger.book(&id, Ok("room-123")).await.is_ok());
        assert_eq!(ledger.book_calls().await, 3);
    }

    #[tokio::test]
    async fn test_cancel_unknown_reservation_succeeds() {
        let ledger = SimulatedLedger::new();
        assert!(ledger.cancel(&BookingId::new("missing")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_outcome_records_nothing() {
        let ledger = SimulatedLedger::new();
        let id = BookingId::new("b1");
        let result = ledger
            .book(&id, Err(StepError::business("HOTEL_FULL", "full")))
            .await;
        assert!(result.is_err());
        assert_eq!(ledger.reservation_count().await, 0);
        assert_eq!(ledger.book_calls().await, 1);
    }
}
