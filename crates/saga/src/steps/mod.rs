//! Booking and compensation steps.
//!
//! A step validates its input, consults its idempotency cache and only then
//! calls the reservation system. Results are cached on success only, so a
//! failed attempt can be retried while a completed one is never repeated.
//! A booking whose compensation already ran is refused, since the cached
//! reservation no longer exists.

pub mod dinner;
pub mod hotel;
pub mod parking;

use std::future::Future;

use common::BookingId;

use crate::error::StepError;
use crate::hotel_booking::Leg;
use crate::idempotency::IdempotencyCache;
use crate::outcome::{CompensationResult, StepResult};

pub use dinner::DinnerStep;
pub use hotel::HotelStep;
pub use parking::ParkingStep;

/// Runs `book` unless `cache` already holds a result for `booking_id`.
///
/// Fails with `BOOKING_COMPENSATED` once `compensations` holds an entry for
/// `booking_id`.
async fn book_once<F, Fut>(
    leg: Leg,
    cache: &IdempotencyCache<StepResult>,
    compensations: &IdempotencyCache<CompensationResult>,
    booking_id: &BookingId,
    message: &'static str,
    book: F,
) -> Result<StepResult, StepError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, StepError>>,
{
    if compensations.get(booking_id).await.is_some() {
        tracing::warn!(%booking_id, step = leg.step_name(), "booking was already compensated");
        return Err(StepError::business(
            "BOOKING_COMPENSATED",
            format!("{leg} booking {booking_id} was cancelled by an earlier saga"),
        ));
    }

    let entry = cache
        .get_or_try_insert_with(booking_id, || async move {
            let resource_id = book().await?;
            Ok::<_, StepError>(StepResult::succeeded(resource_id, message))
        })
        .await?;

    if entry.was_cached() {
        tracing::info!(%booking_id, step = leg.step_name(), "booking already completed, returning cached result");
    } else {
        tracing::info!(%booking_id, step = leg.step_name(), "booking completed");
    }
    Ok(entry.into_value())
}

/// Runs `cancel` unless `cache` already holds a result for `booking_id`.
async fn compensate_once<F, Fut>(
    leg: Leg,
    cache: &IdempotencyCache<CompensationResult>,
    booking_id: &BookingId,
    resource_id: &str,
    message: &'static str,
    cancel: F,
) -> Result<CompensationResult, StepError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), StepError>>,
{
    let entry = cache
        .get_or_try_insert_with(booking_id, || async move {
            cancel().await?;
            Ok::<_, StepError>(CompensationResult::succeeded(message))
        })
        .await?;

    if entry.was_cached() {
        tracing::info!(%booking_id, step = leg.compensation_name(), resource_id, "compensation already completed");
    } else {
        tracing::info!(%booking_id, step = leg.compensation_name(), resource_id, "compensation completed");
    }
    Ok(entry.into_value())
}
