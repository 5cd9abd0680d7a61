//! Append-only journal of saga events.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BookingId, SagaId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, SagaError};
use crate::events::SagaEvent;

/// An event as stored in the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub saga_id: SagaId,
    /// Position in the saga's stream, starting at 1.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event_type: String,
    pub event: SagaEvent,
}

/// Storage for saga event streams.
#[async_trait]
pub trait SagaJournal: Send + Sync {
    /// Appends `event` to the stream of `saga_id`.
    ///
    /// A stream must begin with `SagaStarted`, and only once.
    async fn append(&self, saga_id: SagaId, event: SagaEvent) -> Result<RecordedEvent>;

    /// Returns the stream of `saga_id` in append order. Empty if unknown.
    async fn events(&self, saga_id: SagaId) -> Result<Vec<RecordedEvent>>;

    /// Returns the sagas started for `booking_id`, oldest first.
    async fn sagas_for_booking(&self, booking_id: &BookingId) -> Result<Vec<SagaId>>;
}

#[derive(Debug, Default)]
struct JournalState {
    streams: HashMap<SagaId, Vec<RecordedEvent>>,
    by_booking: HashMap<BookingId, Vec<SagaId>>,
}

/// In-memory journal. Cloning shares the underlying streams.
#[derive(Debug, Clone, Default)]
pub struct InMemorySagaJournal {
    state: Arc<RwLock<JournalState>>,
    fail_on_append: Arc<AtomicBool>,
}

impl InMemorySagaJournal {
    /// Creates a new empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the journal to reject appends (for testing).
    pub fn set_fail_on_append(&self, fail: bool) {
        self.fail_on_append.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of sagas recorded.
    pub async fn saga_count(&self) -> usize {
        self.state.read().await.streams.len()
    }

    /// Returns the total number of events recorded.
    pub async fn event_count(&self) -> usize {
        self.state
            .read()
            .await
            .streams
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[async_trait]
impl SagaJournal for InMemorySagaJournal {
    async fn append(&self, saga_id: SagaId, event: SagaEvent) -> Result<RecordedEvent> {
        if self.fail_on_append.load(Ordering::SeqCst) {
            return Err(SagaError::Journal {
                saga_id,
                reason: "journal unavailable".to_string(),
            });
        }

        let mut state = self.state.write().await;
        let JournalState {
            streams,
            by_booking,
        } = &mut *state;

        if let SagaEvent::SagaStarted(data) = &event {
            if streams.contains_key(&saga_id) {
                return Err(SagaError::Journal {
                    saga_id,
                    reason: "saga already started".to_string(),
                });
            }
            by_booking
                .entry(data.booking_id.clone())
                .or_default()
                .push(saga_id);
            streams.insert(saga_id, Vec::new());
        }

        let Some(stream) = streams.get_mut(&saga_id) else {
            return Err(SagaError::Journal {
                saga_id,
                reason: format!("{} appended before SagaStarted", event.event_type()),
            });
        };

        let recorded = RecordedEvent {
            saga_id,
            sequence: stream.len() as u64 + 1,
            recorded_at: Utc::now(),
            event_type: event.event_type().to_string(),
            event,
        };
        stream.push(recorded.clone());
        Ok(recorded)
    }

    async fn events(&self, saga_id: SagaId) -> Result<Vec<RecordedEvent>> {
        let state = self.state.read().await;
        Ok(state.streams.get(&saga_id).cloned().unwrap_or_default())
    }

    async fn sagas_for_booking(&self, booking_id: &BookingId) -> Result<Vec<SagaId>> {
        let state = self.state.read().await;
        Ok(state
            .by_booking
            .get(booking_id)
            .cloned()
            .unwrap_or_default())
    }
}
