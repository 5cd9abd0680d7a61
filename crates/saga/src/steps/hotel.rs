//! Hotel room booking and its compensation.

use common::BookingId;

use crate::error::StepError;
use crate::hotel_booking::Leg;
use crate::idempotency::IdempotencyCaches;
use crate::outcome::{CompensationResult, StepResult};
use crate::request::HotelBookingRequest;
use crate::services::HotelSystem;

/// Hotel booking step bound to a reservation system and the shared caches.
pub struct HotelStep<'a, H: ?Sized> {
    system: &'a H,
    caches: &'a IdempotencyCaches,
}

impl<'a, H> HotelStep<'a, H>
where
    H: HotelSystem + ?Sized,
{
    pub fn new(system: &'a H, caches: &'a IdempotencyCaches) -> Self {
        Self { system, caches }
    }

    /// Books a hotel room at most once per booking ID.
    pub async fn execute(&self, request: &HotelBookingRequest) -> Result<StepResult, StepError> {
        request.validate()?;
        super::book_once(
            Leg::Hotel,
            &self.caches.hotel_booking,
            &self.caches.hotel_compensation,
            &request.booking_id,
            "hotel room booked",
            || self.system.book(request),
        )
        .await
    }

    /// Cancels the room. Repeated calls after a success return the cached result.
    pub async fn compensate(
        &self,
        booking_id: &BookingId,
        resource_id: &str,
    ) -> Result<CompensationResult, StepError> {
        super::compensate_once(
            Leg::Hotel,
            &self.caches.hotel_compensation,
            booking_id,
            resource_id,
            "hotel room booking cancelled",
            || self.system.cancel(booking_id, resource_id),
        )
        .await
    }
}
