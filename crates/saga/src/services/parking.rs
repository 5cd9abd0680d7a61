//! Parking management system trait and simulated implementation.

use async_trait::async_trait;
use common::BookingId;

use crate::error::StepError;
use crate::request::ParkingBookingRequest;
use crate::services::SimulatedLedger;

/// Client of the parking management system.
#[async_trait]
pub trait ParkingSystem: Send + Sync {
    /// Reserves a parking space and returns its resource ID.
    async fn book(&self, request: &ParkingBookingRequest) -> Result<String, StepError>;

    /// Releases a previously reserved parking space.
    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError>;
}

/// Simulated parking system.
///
/// | trigger | outcome |
/// |---------|---------|
/// | booking ID `booking-connection-error` or space `connection-error` | transient `CONNECTION_ERROR` |
/// | space `full` | business `PARKING_FULL` |
/// | booking ID `booking-duplicate-parking` | space `parking-duplicate` |
/// | anything else | space `parking-123` |
#[derive(Debug, Clone, Default)]
pub struct SimulatedParkingSystem {
    ledger: SimulatedLedger,
}

impl SimulatedParkingSystem {
    /// Creates a new simulated parking system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counters and failure injection.
    pub fn ledger(&self) -> &SimulatedLedger {
        &self.ledger
    }

    fn simulate(request: &ParkingBookingRequest) -> Result<&'static str, StepError> {
        match (request.booking_id.as_str(), request.parking.space_type.as_str()) {
            ("booking-connection-error", _) | (_, "connection-error") => {
                Err(StepError::transient(
                    "CONNECTION_ERROR",
                    "could not connect to the parking management system",
                ))
            }
            ("booking-full", _) | (_, "full") => Err(StepError::business(
                "PARKING_FULL",
                "the requested car park is full",
            )),
            ("booking-duplicate-parking", _) => Ok("parking-duplicate"),
            _ => Ok("parking-123"),
        }
    }
}

#[async_trait]
impl ParkingSystem for SimulatedParkingSystem {
    async fn book(&self, request: &ParkingBookingRequest) -> Result<String, StepError> {
        self.ledger
            .book(&request.booking_id, Self::simulate(request))
            .await
    }

    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError> {
        tracing::debug!(%booking_id, resource_id, "releasing parking space");
        self.ledger.cancel(booking_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::ParkingRequest;

    fn request(booking_id: &str, space_type: &str) -> ParkingBookingRequest {
        ParkingBookingRequest {
            booking_id: BookingId::new(booking_id),
            user_id: "user-001".to_string(),
            parking: ParkingRequest {
                space_type: space_type.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_default_space() {
        let system = SimulatedParkingSystem::new();
        let space = system.book(&request("b1", "standard")).await.unwrap();
        assert_eq!(space, "parking-123");

        system.cancel(&BookingId::new("b1"), &space).await.unwrap();
        assert_eq!(system.ledger().reservation_count().await, 0);
        assert_eq!(system.ledger().cancel_calls().await, 1);
    }

    #[tokio::test]
    async fn test_full_car_park() {
        let system = SimulatedParkingSystem::new();
        let err = system.book(&request("b1", "full")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), "PARKING_FULL");
    }

    #[tokio::test]
    async fn test_connection_error() {
        let system = SimulatedParkingSystem::new();
        let err = system
            .book(&request("booking-connection-error", "standard"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }
}
