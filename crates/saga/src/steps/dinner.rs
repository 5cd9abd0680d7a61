//! Dinner ingredient ordering and its compensation.

use common::BookingId;

use crate::error::StepError;
use crate::hotel_booking::Leg;
use crate::idempotency::IdempotencyCaches;
use crate::outcome::{CompensationResult, StepResult};
use crate::request::DinnerBookingRequest;
use crate::services::DinnerSystem;

/// Dinner booking step bound to a catering system and the shared caches.
pub struct DinnerStep<'a, D: ?Sized> {
    system: &'a D,
    caches: &'a IdempotencyCaches,
}

impl<'a, D> DinnerStep<'a, D>
where
    D: DinnerSystem + ?Sized,
{
    pub fn new(system: &'a D, caches: &'a IdempotencyCaches) -> Self {
        Self { system, caches }
    }

    /// Orders dinner ingredients at most once per booking ID.
    pub async fn execute(&self, request: &DinnerBookingRequest) -> Result<StepResult, StepError> {
        request.validate()?;
        super::book_once(
            Leg::Dinner,
            &self.caches.dinner_booking,
            &self.caches.dinner_compensation,
            &request.booking_id,
            "dinner ingredients ordered",
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
            Leg::Dinner,
            &self.caches.dinner_compensation,
            booking_id,
            resource_id,
            "dinner order cancelled",
            || self.system.cancel(booking_id, resource_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DinnerRequest;
    use crate::services::SimulatedDinnerSystem;

    fn request(booking_id: &str, menu_type: &str) -> DinnerBookingRequest {
        DinnerBookingRequest {
            booking_id: BookingId::new(booking_id),
            user_id: "user-001".to_string(),
            dinner: DinnerRequest {
                menu_type: menu_type.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_cached_result_wins_over_new_input() {
        let system = SimulatedDinnerSystem::new();
        let caches = IdempotencyCaches::new();
        let step = DinnerStep::new(&system, &caches);

        let first = step.execute(&request("b1", "standard")).await.unwrap();
        // Same booking ID, different menu: the first result is returned.
        let second = step.execute(&request("b1", "out-of-stock")).await.unwrap();

        assert_eq!(first.resource_id, "food-123");
        assert_eq!(second, first);
        assert_eq!(system.ledger().book_calls().await, 1);
    }

    #[tokio::test]
    async fn test_out_of_stock_leaves_cache_empty() {
        let system = SimulatedDinnerSystem::new();
        let caches = IdempotencyCaches::new();
        let step = DinnerStep::new(&system, &caches);

        let err = step.execute(&request("b1", "out-of-stock")).await.unwrap_err();
        assert_eq!(err.code(), "OUT_OF_STOCK");
        assert!(caches.dinner_booking.get(&BookingId::new("b1")).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_compensation_can_be_retried() {
        let system = SimulatedDinnerSystem::new();
        let caches = IdempotencyCaches::new();
        let step = DinnerStep::new(&system, &caches);
        let id = BookingId::new("b1");
        system
            .ledger()
            .inject_cancel_failures([StepError::transient("SYSTEM_ERROR", "down")])
            .await;

        assert!(step.compensate(&id, "food-123").await.is_err());
        assert!(caches.dinner_compensation.is_empty().await);

        let result = step.compensate(&id, "food-123").await.unwrap();
        assert!(result.success);
        assert_eq!(system.ledger().cancel_calls().await, 2);
    }
}
