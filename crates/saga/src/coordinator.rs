//! Saga coordinator for the hotel booking saga.

use std::time::Instant;

use common::{BookingId, SagaId};
use futures_util::future::join_all;

use crate::aggregate::SagaInstance;
use crate::compensation::{CompensationMode, CompensationStack, PendingCompensation};
use crate::config::SagaConfig;
use crate::error::{CompensationFailure, Result, SagaError, StepError};
use crate::events::SagaEvent;
use crate::hotel_booking::{self, Leg};
use crate::idempotency::IdempotencyCaches;
use crate::journal::{RecordedEvent, SagaJournal};
use crate::outcome::{BookingOutcome, CompensationRecord, CompensationResult, StepResult};
use crate::request::BookingRequest;
use crate::retry;
use crate::services::{DinnerSystem, HotelSystem, ParkingSystem};
use crate::steps::{DinnerStep, HotelStep, ParkingStep};

/// Orchestrates hotel booking sagas.
///
/// The coordinator books hotel, dinner and parking in that order. Each
/// completed booking pushes its compensation; when a later booking fails the
/// stack is unwound, most recent first. Every booking and compensation call
/// runs under the configured retry policy. Business failures end up in the
/// returned [`BookingOutcome`]; only journal faults surface as errors.
pub struct SagaCoordinator<J, H, D, P>
where
    J: SagaJournal,
    H: HotelSystem,
    D: DinnerSystem,
    P: ParkingSystem,
{
    journal: J,
    hotel: H,
    dinner: D,
    parking: P,
    caches: IdempotencyCaches,
    config: SagaConfig,
}

impl<J, H, D, P> SagaCoordinator<J, H, D, P>
where
    J: SagaJournal,
    H: HotelSystem,
    D: DinnerSystem,
    P: ParkingSystem,
{
    /// Creates a coordinator with the default configuration.
    pub fn new(journal: J, hotel: H, dinner: D, parking: P, caches: IdempotencyCaches) -> Self {
        Self {
            journal,
            hotel,
            dinner,
            parking,
            caches,
            config: SagaConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: SagaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Runs one booking saga to completion.
    #[tracing::instrument(
        skip(self, request),
        fields(saga_type = hotel_booking::SAGA_TYPE, booking_id = %request.booking_id, saga_id)
    )]
    pub async fn run_booking(&self, request: BookingRequest) -> Result<BookingOutcome> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();

        let saga_id = SagaId::new();
        tracing::Span::current().record("saga_id", tracing::field::display(saga_id));
        self.record(
            saga_id,
            SagaEvent::saga_started(
                saga_id,
                request.booking_id.clone(),
                request.user_id.clone(),
                hotel_booking::SAGA_TYPE,
            ),
        )
        .await?;

        let mut outcome = BookingOutcome::new(saga_id, request.booking_id.clone());

        if let Err(err) = request.validate() {
            tracing::warn!(error = %err, "booking request rejected");
            return self
                .finish_failed(outcome, format!("validation failed: {err}"), saga_start)
                .await;
        }

        let mut stack = CompensationStack::new();
        for leg in Leg::ORDER {
            tracing::info!(step = leg.step_name(), "saga step started");
            self.record(saga_id, SagaEvent::step_started(leg)).await?;

            match self.book(leg, &request).await {
                Ok(result) => {
                    tracing::info!(
                        step = leg.step_name(),
                        resource_id = %result.resource_id,
                        "saga step completed"
                    );
                    self.record(saga_id, SagaEvent::step_completed(leg, &result.resource_id))
                        .await?;
                    stack.push(PendingCompensation::for_leg(
                        leg,
                        request.booking_id.clone(),
                        result.resource_id.clone(),
                    ));
                    outcome.record_result(leg, result);
                }
                Err(err) => {
                    tracing::warn!(
                        step = leg.step_name(),
                        kind = %err.kind(),
                        code = err.code(),
                        error = %err,
                        "saga step failed"
                    );
                    self.record(saga_id, SagaEvent::step_failed(leg, &err))
                        .await?;

                    if !stack.is_empty() {
                        outcome.compensations = self.unwind(saga_id, leg, stack).await?;
                    }
                    return self
                        .finish_failed(outcome, format!("{leg} booking failed: {err}"), saga_start)
                        .await;
                }
            }
        }

        self.record(saga_id, SagaEvent::saga_completed()).await?;
        outcome.success = true;
        outcome.message = "booking saga completed successfully".to_string();

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(%saga_id, duration, "saga completed successfully");

        Ok(outcome)
    }

    /// Loads a saga instance by replaying its journal.
    pub async fn get_saga(&self, saga_id: SagaId) -> Result<Option<SagaInstance>> {
        let events = self.journal.events(saga_id).await?;

        if events.is_empty() {
            return Ok(None);
        }

        Ok(Some(SagaInstance::replay(
            events.into_iter().map(|recorded| recorded.event),
        )))
    }

    /// Returns the raw journal entries of a saga.
    pub async fn saga_events(&self, saga_id: SagaId) -> Result<Vec<RecordedEvent>> {
        self.journal.events(saga_id).await
    }

    /// Returns the sagas run for a booking ID, oldest first.
    pub async fn sagas_for_booking(&self, booking_id: &BookingId) -> Result<Vec<SagaId>> {
        self.journal.sagas_for_booking(booking_id).await
    }

    async fn book(&self, leg: Leg, request: &BookingRequest) -> std::result::Result<StepResult, StepError> {
        let options = &self.config.activity;
        let activity = leg.step_name();
        match leg {
            Leg::Hotel => {
                let step = HotelStep::new(&self.hotel, &self.caches);
                let request = request.hotel_request();
                retry::execute(options, activity, |_| step.execute(&request)).await
            }
            Leg::Dinner => {
                let step = DinnerStep::new(&self.dinner, &self.caches);
                let request = request.dinner_request();
                retry::execute(options, activity, |_| step.execute(&request)).await
            }
            Leg::Parking => {
                let step = ParkingStep::new(&self.parking, &self.caches);
                let request = request.parking_request();
                retry::execute(options, activity, |_| step.execute(&request)).await
            }
        }
    }

    async fn compensate(
        &self,
        pending: &PendingCompensation,
    ) -> std::result::Result<CompensationResult, StepError> {
        let options = &self.config.activity;
        let activity = pending.leg().compensation_name();
        let booking_id = pending.booking_id();
        let resource_id = pending.resource_id();
        match pending {
            PendingCompensation::Hotel { .. } => {
                let step = HotelStep::new(&self.hotel, &self.caches);
                retry::execute(options, activity, |_| step.compensate(booking_id, resource_id))
                    .await
            }
            PendingCompensation::Dinner { .. } => {
                let step = DinnerStep::new(&self.dinner, &self.caches);
                retry::execute(options, activity, |_| step.compensate(booking_id, resource_id))
                    .await
            }
            PendingCompensation::Parking { .. } => {
                let step = ParkingStep::new(&self.parking, &self.caches);
                retry::execute(options, activity, |_| step.compensate(booking_id, resource_id))
                    .await
            }
        }
    }

    /// Runs the compensations of completed steps in reverse order.
    ///
    /// A compensation that fails after its retries is recorded and skipped;
    /// the remaining ones still run. A journal fault is returned only after
    /// every compensation has been attempted.
    #[tracing::instrument(skip(self, stack), fields(mode = %self.config.compensation_mode))]
    async fn unwind(
        &self,
        saga_id: SagaId,
        failed_leg: Leg,
        stack: CompensationStack,
    ) -> Result<Vec<CompensationRecord>> {
        let pending = stack.unwind();
        let legs: Vec<Leg> = pending.iter().map(PendingCompensation::leg).collect();
        tracing::info!(failed_step = failed_leg.step_name(), ?legs, "compensation started");

        let mut journal_error = None;
        self.record_deferred(
            saga_id,
            SagaEvent::compensation_started(failed_leg, legs),
            &mut journal_error,
        )
        .await;

        let mut records = Vec::with_capacity(pending.len());
        match self.config.compensation_mode {
            CompensationMode::Sequential => {
                for compensation in &pending {
                    let result = self.compensate(compensation).await;
                    records.push(
                        self.record_compensation(saga_id, compensation, result, &mut journal_error)
                            .await,
                    );
                }
            }
            CompensationMode::Parallel => {
                let results = join_all(pending.iter().map(|c| self.compensate(c))).await;
                for (compensation, result) in pending.iter().zip(results) {
                    records.push(
                        self.record_compensation(saga_id, compensation, result, &mut journal_error)
                            .await,
                    );
                }
            }
        }

        match journal_error {
            Some(err) => Err(err),
            None => Ok(records),
        }
    }

    async fn record_compensation(
        &self,
        saga_id: SagaId,
        compensation: &PendingCompensation,
        result: std::result::Result<CompensationResult, StepError>,
        journal_error: &mut Option<SagaError>,
    ) -> CompensationRecord {
        let leg = compensation.leg();
        let resource_id = compensation.resource_id().to_string();

        match result {
            Ok(result) => {
                self.record_deferred(
                    saga_id,
                    SagaEvent::compensation_step_completed(leg, resource_id.clone()),
                    journal_error,
                )
                .await;
                CompensationRecord {
                    leg,
                    resource_id,
                    success: result.success,
                    message: result.message,
                }
            }
            Err(source) => {
                let failure = CompensationFailure {
                    leg,
                    resource_id: resource_id.clone(),
                    source,
                };
                metrics::counter!("compensation_failures_total", "leg" => leg.as_str())
                    .increment(1);
                tracing::error!(
                    step = leg.compensation_name(),
                    %resource_id,
                    error = %failure,
                    "compensation failed, continuing with remaining compensations"
                );
                self.record_deferred(
                    saga_id,
                    SagaEvent::compensation_step_failed(leg, resource_id.clone(), failure.to_string()),
                    journal_error,
                )
                .await;
                CompensationRecord {
                    leg,
                    resource_id,
                    success: false,
                    message: failure.to_string(),
                }
            }
        }
    }

    /// Journals an unwind event, keeping the first append failure in `deferred`.
    async fn record_deferred(
        &self,
        saga_id: SagaId,
        event: SagaEvent,
        deferred: &mut Option<SagaError>,
    ) {
        if let Err(err) = self.record(saga_id, event).await {
            tracing::error!(%saga_id, error = %err, "journal append failed during compensation");
            deferred.get_or_insert(err);
        }
    }

    async fn finish_failed(
        &self,
        mut outcome: BookingOutcome,
        message: String,
        saga_start: Instant,
    ) -> Result<BookingOutcome> {
        self.record(outcome.saga_id, SagaEvent::saga_failed(message.clone()))
            .await?;
        outcome.success = false;
        outcome.message = message;

        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
        metrics::counter!("saga_failed").increment(1);
        tracing::warn!(
            saga_id = %outcome.saga_id,
            reason = %outcome.message,
            compensations = outcome.compensations.len(),
            "saga failed"
        );

        Ok(outcome)
    }

    async fn record(&self, saga_id: SagaId, event: SagaEvent) -> Result<()> {
        self.journal.append(saga_id, event).await?;
        Ok(())
    }
}
