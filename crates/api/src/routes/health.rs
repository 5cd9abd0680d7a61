//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use saga::CompensationMode;
use saga::hotel_booking::SAGA_TYPE;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub saga_type: &'static str,
    pub compensation_mode: CompensationMode,
}

/// GET /health: worker liveness and the saga settings it runs with.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        saga_type: SAGA_TYPE,
        compensation_mode: state.coordinator.config().compensation_mode,
    })
}
