//! Write-once idempotency caches keyed by booking ID.
//!
//! Each key owns a [`OnceCell`]. Racing callers on the same key serialize on
//! that cell only: the first successful initialization wins and every caller,
//! including those that were waiting, observes that value. A failed
//! initialization leaves the cell empty so a later retry can try again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use common::BookingId;
use tokio::sync::{OnceCell, RwLock};

use crate::outcome::{CompensationResult, StepResult};

/// How a cache lookup was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<V> {
    /// The key already had a value; no initializer ran.
    Cached(V),
    /// This call ran the initializer and stored its value.
    Inserted(V),
}

impl<V> Entry<V> {
    /// Returns true if the value came from the cache.
    pub fn was_cached(&self) -> bool {
        matches!(self, Entry::Cached(_))
    }

    /// Unwraps the stored value.
    pub fn into_value(self) -> V {
        match self {
            Entry::Cached(v) | Entry::Inserted(v) => v,
        }
    }
}

/// Concurrency-safe, write-once map from booking ID to a step result.
#[derive(Debug)]
pub struct IdempotencyCache<V> {
    name: &'static str,
    cells: Arc<RwLock<HashMap<BookingId, Arc<OnceCell<V>>>>>,
}

impl<V> Clone for IdempotencyCache<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            cells: Arc::clone(&self.cells),
        }
    }
}

impl<V> IdempotencyCache<V>
where
    V: Clone + Send + Sync,
{
    /// Creates an empty cache. `name` labels logs and metrics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cells: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the stored value for `key`, if any.
    pub async fn get(&self, key: &BookingId) -> Option<V> {
        let cells = self.cells.read().await;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Returns the number of keys holding a value.
    pub async fn len(&self) -> usize {
        let cells = self.cells.read().await;
        cells.values().filter(|cell| cell.initialized()).count()
    }

    /// Returns true if no key holds a value.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn cell(&self, key: &BookingId) -> Arc<OnceCell<V>> {
        if let Some(cell) = self.cells.read().await.get(key) {
            return Arc::clone(cell);
        }
        let mut cells = self.cells.write().await;
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    /// Returns the value for `key`, running `init` only if none is stored.
    ///
    /// `init` runs at most once at a time per key. An `Err` from `init` is
    /// returned to this caller and nothing is stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &BookingId,
        init: F,
    ) -> Result<Entry<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key).await;
        if let Some(value) = cell.get() {
            metrics::counter!("idempotency_cache_hits_total", "cache" => self.name).increment(1);
            return Ok(Entry::Cached(value.clone()));
        }

        let mut inserted = false;
        let value = cell
            .get_or_try_init(|| {
                inserted = true;
                init()
            })
            .await?
            .clone();

        if inserted {
            Ok(Entry::Inserted(value))
        } else {
            metrics::counter!("idempotency_cache_hits_total", "cache" => self.name).increment(1);
            Ok(Entry::Cached(value))
        }
    }
}

/// The six caches of the booking saga, one per step kind.
///
/// Cloning shares the underlying maps, so one `IdempotencyCaches` can be
/// handed to every coordinator in a process while tests build a fresh one
/// each.
#[derive(Debug, Clone)]
pub struct IdempotencyCaches {
    pub hotel_booking: IdempotencyCache<StepResult>,
    pub dinner_booking: IdempotencyCache<StepResult>,
    pub parking_booking: IdempotencyCache<StepResult>,
    pub hotel_compensation: IdempotencyCache<CompensationResult>,
    pub dinner_compensation: IdempotencyCache<CompensationResult>,
    pub parking_compensation: IdempotencyCache<CompensationResult>,
}

impl IdempotencyCaches {
    /// Creates six empty caches.
    pub fn new() -> Self {
        Self {
            hotel_booking: IdempotencyCache::new("hotel_booking"),
            dinner_booking: IdempotencyCache::new("dinner_booking"),
            parking_booking: IdempotencyCache::new("parking_booking"),
            hotel_compensation: IdempotencyCache::new("hotel_compensation"),
            dinner_compensation: IdempotencyCache::new("dinner_compensation"),
            parking_compensation: IdempotencyCache::new("parking_compensation"),
        }
    }
}

impl Default for IdempotencyCaches {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    async fn put<V>(cache: &IdempotencyCache<V>, key: &BookingId, value: V) -> Entry<V>
    where
        V: Clone + Send + Sync,
    {
        cache
            .get_or_try_insert_with(key, || async move { Ok::<_, ()>(value) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_insert_wins() {
        let cache: IdempotencyCache<String> = IdempotencyCache::new("test");
        let key = BookingId::new("b1");

        let first = put(&cache, &key, "first".to_string()).await;
        let second = put(&cache, &key, "second".to_string()).await;

        assert_eq!(first, Entry::Inserted("first".to_string()));
        assert_eq!(second, Entry::Cached("first".to_string()));
        assert_eq!(cache.get(&key).await.as_deref(), Some("first"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_initializer_runs_once() {
        let cache: IdempotencyCache<u32> = IdempotencyCache::new("test");
        let key = BookingId::new("b1");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let entry = cache
                .get_or_try_insert_with(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(7)
                })
                .await
                .unwrap();
            assert_eq!(entry.into_value(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initializer_stores_nothing() {
        let cache: IdempotencyCache<u32> = IdempotencyCache::new("test");
        let key = BookingId::new("b1");

        let err = cache
            .get_or_try_insert_with(&key, || async { Err::<u32, _>("down") })
            .await;
        assert_eq!(err, Err("down"));
        assert!(cache.is_empty().await);
        assert_eq!(cache.get(&key).await, None);

        let entry = cache
            .get_or_try_insert_with(&key, || async { Ok::<_, &str>(1) })
            .await
            .unwrap();
        assert!(!entry.was_cached());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache: IdempotencyCache<u32> = IdempotencyCache::new("test");
        put(&cache, &BookingId::new("a"), 1).await;
        put(&cache, &BookingId::new("b"), 2).await;

        assert_eq!(cache.get(&BookingId::new("a")).await, Some(1));
        assert_eq!(cache.get(&BookingId::new("b")).await, Some(2));
        assert_eq!(cache.get(&BookingId::new("c")).await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_agree() {
        let cache: IdempotencyCache<usize> = IdempotencyCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let key = BookingId::new("shared");

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_insert_with(&key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, ()>(i)
                    })
                    .await
                    .unwrap()
                    .into_value()
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_cloned_caches_share_entries() {
        let caches = IdempotencyCaches::new();
        let clone = caches.clone();
        let key = BookingId::new("b1");

        put(
            &clone.hotel_compensation,
            &key,
            CompensationResult::succeeded("done"),
        )
        .await;

        assert!(caches.hotel_compensation.get(&key).await.is_some());
        assert!(caches.dinner_compensation.get(&key).await.is_none());
    }
}
