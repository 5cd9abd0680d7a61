//! Booking saga trigger and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::BookingId;
use saga::{BookingOutcome, BookingRequest};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct BookingSagasResponse {
    pub booking_id: String,
    pub saga_ids: Vec<String>,
}

/// POST /bookings: runs a booking saga to completion.
///
/// Business failures are reported in the outcome with `success: false` and a
/// `200` status.
#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingOutcome>, ApiError> {
    let Json(request) = body?;
    let outcome = state.coordinator.run_booking(request).await?;

    let result = if outcome.success { "succeeded" } else { "failed" };
    metrics::counter!("http_booking_requests_total", "result" => result).increment(1);

    Ok(Json(outcome))
}

/// GET /bookings/{booking_id}/sagas: lists the saga runs for a booking.
#[tracing::instrument(skip(state))]
pub async fn sagas(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingSagasResponse>, ApiError> {
    let saga_ids = state
        .coordinator
        .sagas_for_booking(&BookingId::new(booking_id.as_str()))
        .await?;

    Ok(Json(BookingSagasResponse {
        booking_id,
        saga_ids: saga_ids.iter().map(ToString::to_string).collect(),
    }))
}
