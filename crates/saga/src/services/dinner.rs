//! Dinner catering system trait and simulated implementation.

use async_trait::async_trait;
use common::BookingId;

use crate::error::StepError;
use crate::request::DinnerBookingRequest;
use crate::services::SimulatedLedger;

/// Client of the catering (dinner ingredients) system.
#[async_trait]
pub trait DinnerSystem: Send + Sync {
    /// Orders the dinner menu and returns the order's resource ID.
    async fn book(&self, request: &DinnerBookingRequest) -> Result<String, StepError>;

    /// Cancels a previously placed dinner order.
    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError>;
}

/// Simulated catering system.
///
/// | trigger | outcome |
/// |---------|---------|
/// | booking ID `booking-system-error` or menu `system-error` | transient `SYSTEM_ERROR` |
/// | booking ID `booking-out-of-stock` or menu `out-of-stock` | business `OUT_OF_STOCK` |
/// | booking ID `booking-duplicate-dinner` | order `food-duplicate` |
/// | anything else | order `food-123` |
#[derive(Debug, Clone, Default)]
pub struct SimulatedDinnerSystem {
    ledger: SimulatedLedger,
}

impl SimulatedDinnerSystem {
    /// Creates a new simulated catering system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counters and failure injection.
    pub fn ledger(&self) -> &SimulatedLedger {
        &self.ledger
    }

    fn simulate(request: &DinnerBookingRequest) -> Result<&'static str, StepError> {
        match (request.booking_id.as_str(), request.dinner.menu_type.as_str()) {
            ("booking-system-error", _) | (_, "system-error") => Err(StepError::transient(
                "SYSTEM_ERROR",
                "the catering system is unavailable",
            )),
            ("booking-out-of-stock", _) | (_, "out-of-stock") => Err(StepError::business(
                "OUT_OF_STOCK",
                "ingredients for the requested menu are out of stock",
            )),
            ("booking-duplicate-dinner", _) => Ok("food-duplicate"),
            _ => Ok("food-123"),
        }
    }
}

#[async_trait]
impl DinnerSystem for SimulatedDinnerSystem {
    async fn book(&self, request: &DinnerBookingRequest) -> Result<String, StepError> {
        self.ledger
            .book(&request.booking_id, Self::simulate(request))
            .await
    }

    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError> {
        tracing::debug!(%booking_id, resource_id, "cancelling dinner order");
        self.ledger.cancel(booking_id).await
    }
}
