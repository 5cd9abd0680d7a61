//! Saga status and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::SagaId;
use saga::{Leg, RecordedEvent};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SagaStatusResponse {
    pub saga_id: String,
    pub booking_id: Option<String>,
    pub state: String,
    pub terminal: bool,
    pub completed_steps: Vec<Leg>,
    pub hotel_resource_id: Option<String>,
    pub dinner_resource_id: Option<String>,
    pub parking_resource_id: Option<String>,
    pub compensated_steps: Vec<Leg>,
    pub failed_compensations: Vec<Leg>,
    pub failure_reason: Option<String>,
}

/// GET /sagas/{saga_id}: saga state replayed from its journal.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SagaStatusResponse>, ApiError> {
    let saga_id = parse_saga_id(&id)?;
    let saga = state
        .coordinator
        .get_saga(saga_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Saga {id} not found")))?;

    let resource = |leg| saga.resource_id(leg).map(str::to_string);
    Ok(Json(SagaStatusResponse {
        saga_id: saga_id.to_string(),
        booking_id: saga.booking_id().map(ToString::to_string),
        state: saga.state().to_string(),
        terminal: saga.state().is_terminal(),
        completed_steps: saga.completed_steps().to_vec(),
        hotel_resource_id: resource(Leg::Hotel),
        dinner_resource_id: resource(Leg::Dinner),
        parking_resource_id: resource(Leg::Parking),
        compensated_steps: saga.compensated_steps().to_vec(),
        failed_compensations: saga.failed_compensations().to_vec(),
        failure_reason: saga.failure_reason().map(str::to_string),
    }))
}

/// GET /sagas/{saga_id}/events: raw journal entries of a saga.
#[tracing::instrument(skip(state))]
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RecordedEvent>>, ApiError> {
    let saga_id = parse_saga_id(&id)?;
    let events = state.coordinator.saga_events(saga_id).await?;
    if events.is_empty() {
        return Err(ApiError::NotFound(format!("Saga {id} not found")));
    }
    Ok(Json(events))
}

fn parse_saga_id(id: &str) -> Result<SagaId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid saga ID format: {e}")))
}
