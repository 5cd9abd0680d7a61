//! Parking space reservation and its compensation.

use common::BookingId;

use crate::error::StepError;
use crate::hotel_booking::Leg;
use crate::idempotency::IdempotencyCaches;
use crate::outcome::{CompensationResult, StepResult};
use crate::request::ParkingBookingRequest;
use crate::services::ParkingSystem;

/// Parking booking step bound to a parking system and the shared caches.
pub struct ParkingStep<'a, P: ?Sized> {
    system: &'a P,
    caches: &'a IdempotencyCaches,
}

impl<'a, P> ParkingStep<'a, P>
where
    P: ParkingSystem + ?Sized,
{
    pub fn new(system: &'a P, caches: &'a IdempotencyCaches) -> Self {
        Self { system, caches }
    }

    /// Reserves a parking space at most once per booking ID.
    pub async fn execute(&self, request: &ParkingBookingRequest) -> Result<StepResult, StepError> {
        request.validate()?;
        super::book_once(
            Leg::Parking,
            &self.caches.parking_booking,
            &self.caches.parking_compensation,
            &request.booking_id,
            "parking space reserved",
            || self.system.book(request),
        )
        .await
    }

    pub async fn compensate(
        &self,
        booking_id: &BookingId,
        resource_id: &str,
    ) -> Result<CompensationResult, StepError> {
        super::compensate_once(
            Leg::Parking,
            &self.caches.parking_compensation,
            booking_id,
            resource_id,
            "parking reservation released",
            || self.system.cancel(booking_id, resource_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::ParkingRequest;
    use crate::services::SimulatedParkingSystem;

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
    async fn test_duplicate_trigger_resource() {
        let system = SimulatedParkingSystem::new();
        let caches = IdempotencyCaches::new();
        let step = ParkingStep::new(&system, &caches);

        let result = step
            .execute(&request("booking-duplicate-parking", "standard"))
            .await
            .unwrap();
        assert_eq!(result.resource_id, "parking-duplicate");
    }

    #[tokio::test]
    async fn test_full_booking_id_is_not_cached() {
        let system = SimulatedParkingSystem::new();
        let caches = IdempotencyCaches::new();
        let step = ParkingStep::new(&system, &caches);

        let err = step
            .execute(&request("booking-full", "standard"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), "PARKING_FULL");
        assert!(caches.parking_booking.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_space_type() {
        let system = SimulatedParkingSystem::new();
        let caches = IdempotencyCaches::new();
        let step = ParkingStep::new(&system, &caches);

        let err = step.execute(&request("b1", "")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), "INVALID_SPACE_TYPE");
        assert_eq!(err.message(), "SpaceType is required");
    }

    #[tokio::test]
    async fn test_caches_are_per_step_kind() {
        let system = SimulatedParkingSystem::new();
        let caches = IdempotencyCaches::new();
        let step = ParkingStep::new(&system, &caches);
        let id = BookingId::new("b1");

        step.execute(&request("b1", "standard")).await.unwrap();
        assert!(caches.parking_booking.get(&id).await.is_some());
        assert!(caches.parking_compensation.get(&id).await.is_none());
        assert!(caches.hotel_booking.get(&id).await.is_none());
    }
}
