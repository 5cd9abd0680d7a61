//! Worker process for the hotel booking saga.
//!
//! Hosts a [`saga::SagaCoordinator`] behind REST endpoints, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    IdempotencyCaches, InMemorySagaJournal, SagaConfig, SagaCoordinator, SimulatedDinnerSystem,
    SimulatedHotelSystem, SimulatedParkingSystem,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Coordinator wired to the in-memory journal and simulated systems.
pub type BookingCoordinator = SagaCoordinator<
    InMemorySagaJournal,
    SimulatedHotelSystem,
    SimulatedDinnerSystem,
    SimulatedParkingSystem,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: BookingCoordinator,
    pub hotel: SimulatedHotelSystem,
    pub dinner: SimulatedDinnerSystem,
    pub parking: SimulatedParkingSystem,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/bookings", post(routes::bookings::create))
        .route(
            "/bookings/{booking_id}/sagas",
            get(routes::bookings::sagas),
        )
        .route("/sagas/{saga_id}", get(routes::sagas::get))
        .route("/sagas/{saga_id}/events", get(routes::sagas::events))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with a fresh journal, caches and simulated systems.
pub fn create_default_state(config: SagaConfig) -> Arc<AppState> {
    let hotel = SimulatedHotelSystem::new();
    let dinner = SimulatedDinnerSystem::new();
    let parking = SimulatedParkingSystem::new();

    let coordinator = SagaCoordinator::new(
        InMemorySagaJournal::new(),
        hotel.clone(),
        dinner.clone(),
        parking.clone(),
        IdempotencyCaches::new(),
    )
    .with_config(config);

    Arc::new(AppState {
        coordinator,
        hotel,
        dinner,
        parking,
    })
}
