//! Saga pattern implementation for hotel bookings.
//!
//! A booking reserves three resources in separate systems:
//! 1. Book a hotel room
//! 2. Order dinner ingredients
//! 3. Reserve a parking space
//!
//! If any step fails, previously completed steps are compensated in reverse
//! order. Steps are idempotent per booking ID, so retries and repeated
//! compensations never duplicate side effects.

pub mod aggregate;
pub mod compensation;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod hotel_booking;
pub mod idempotency;
pub mod journal;
pub mod outcome;
pub mod request;
pub mod retry;
pub mod services;
pub mod state;
pub mod steps;

pub use aggregate::SagaInstance;
pub use compensation::{CompensationMode, CompensationStack, PendingCompensation};
pub use config::SagaConfig;
pub use coordinator::SagaCoordinator;
pub use error::{CompensationFailure, ErrorKind, SagaError, StepError, ValidationError};
pub use events::SagaEvent;
pub use hotel_booking::Leg;
pub use idempotency::{IdempotencyCache, IdempotencyCaches};
pub use journal::{InMemorySagaJournal, RecordedEvent, SagaJournal};
pub use outcome::{BookingOutcome, CompensationRecord, CompensationResult, StepResult};
pub use request::{BookingRequest, DinnerRequest, HotelRequest, ParkingRequest};
pub use retry::{ActivityOptions, RetryPolicy};
pub use services::{
    DinnerSystem, HotelSystem, ParkingSystem, SimulatedDinnerSystem, SimulatedHotelSystem,
    SimulatedLedger, SimulatedParkingSystem,
};
pub use state::SagaState;
