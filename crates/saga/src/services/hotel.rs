//! Hotel reservation system trait and simulated implementation.

use async_trait::async_trait;
use common::BookingId;

use crate::error::StepError;
use crate::request::HotelBookingRequest;
use crate::services::SimulatedLedger;

/// Client of the hotel reservation system.
#[async_trait]
pub trait HotelSystem: Send + Sync {
    /// Books a room and returns its resource ID.
    async fn book(&self, request: &HotelBookingRequest) -> Result<String, StepError>;

    /// Cancels a previously booked room.
    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError>;
}

/// Simulated hotel system.
///
/// | trigger | outcome |
/// |---------|---------|
/// | booking ID `booking-network-error` | transient `NETWORK_ERROR` |
/// | booking ID `booking-full` or hotel ID `hotel-full` | business `HOTEL_FULL` |
/// | booking ID `booking-duplicate` | room `room-duplicate` |
/// | anything else | room `room-123` |
#[derive(Debug, Clone, Default)]
pub struct SimulatedHotelSystem {
    ledger: SimulatedLedger,
}

impl SimulatedHotelSystem {
    /// Creates a new simulated hotel system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counters and failure injection.
    pub fn ledger(&self) -> &SimulatedLedger {
        &self.ledger
    }

    fn simulate(request: &HotelBookingRequest) -> Result<&'static str, StepError> {
        match (request.booking_id.as_str(), request.hotel.hotel_id.as_str()) {
            ("booking-network-error", _) => Err(StepError::transient(
                "NETWORK_ERROR",
                "network error while contacting the hotel system",
            )),
            ("booking-full", _) | (_, "hotel-full") => Err(StepError::business(
                "HOTEL_FULL",
                "the requested hotel is fully booked",
            )),
            ("booking-duplicate", _) => Ok("room-duplicate"),
            _ => Ok("room-123"),
        }
    }
}

#[async_trait]
impl HotelSystem for SimulatedHotelSystem {
    async fn book(&self, request: &HotelBookingRequest) -> Result<String, StepError> {
        self.ledger
            .book(&request.booking_id, Self::simulate(request))
            .await
    }

    async fn cancel(&self, booking_id: &BookingId, resource_id: &str) -> Result<(), StepError> {
        tracing::debug!(%booking_id, resource_id, "cancelling hotel room");
        self.ledger.cancel(booking_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::HotelRequest;

    fn request(booking_id: &str, hotel_id: &str) -> HotelBookingRequest {
        HotelBookingRequest {
            booking_id: BookingId::new(booking_id),
            user_id: "user-001".to_string(),
            hotel: HotelRequest {
                hotel_id: hotel_id.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_default_booking() {
        let system = SimulatedHotelSystem::new();
        let room = system.book(&request("b1", "h1")).await.unwrap();
        assert_eq!(room, "room-123");
        assert!(system.ledger().has_reservation(&BookingId::new("b1")).await);

        system.cancel(&BookingId::new("b1"), &room).await.unwrap();
        assert_eq!(system.ledger().reservation_count().await, 0);
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let system = SimulatedHotelSystem::new();

        let err = system
            .book(&request("booking-network-error", "h1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.code(), "NETWORK_ERROR");

        let err = system.book(&request("booking-full", "h1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), "HOTEL_FULL");

        let err = system.book(&request("b2", "hotel-full")).await.unwrap_err();
        assert_eq!(err.code(), "HOTEL_FULL");

        assert_eq!(system.ledger().reservation_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_room() {
        let system = SimulatedHotelSystem::new();
        let room = system.book(&request("booking-duplicate", "h1")).await.unwrap();
        assert_eq!(room, "room-duplicate");
    }
}
