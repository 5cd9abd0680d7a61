//! In-process execution host: runs an activity under a retry policy.
//!
//! This is the "execute with retry policy" primitive the coordinator relies
//! on. It is not durable: a crash loses in-flight attempts.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, StepError};

/// Error code reported when one attempt exceeds its start-to-close timeout.
pub const ACTIVITY_TIMEOUT: &str = "ACTIVITY_TIMEOUT";

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => super::duration_ms::serialize(d, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}

/// Exponential backoff retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt.
    #[serde(rename = "initial_interval_ms", with = "duration_ms")]
    pub initial_interval: Duration,
    /// Factor applied to the delay after each further failure.
    pub backoff_coefficient: f64,
    /// Upper bound for a single delay.
    #[serde(rename = "maximum_interval_ms", with = "duration_ms")]
    pub maximum_interval: Duration,
    /// Total attempts, including the first one.
    pub maximum_attempts: NonZeroU32,
    /// Error kinds that fail immediately.
    pub non_retryable_error_kinds: Vec<ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(60),
            maximum_attempts: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            non_retryable_error_kinds: vec![ErrorKind::Business],
        }
    }
}

impl RetryPolicy {
    /// Returns true if `err` may be retried under this policy.
    pub fn is_retryable(&self, err: &StepError) -> bool {
        !self.non_retryable_error_kinds.contains(&err.kind())
    }

    /// Delay to wait after the given (1-based) attempt failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_interval.as_secs_f64() * self.backoff_coefficient.powi(exponent);
        if !secs.is_finite() || secs >= self.maximum_interval.as_secs_f64() {
            return self.maximum_interval;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Options applied to every booking and compensation activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivityOptions {
    pub retry_policy: RetryPolicy,
    /// Limit for a single attempt. `None` disables the timeout.
    #[serde(rename = "start_to_close_timeout_ms", with = "option_duration_ms")]
    pub start_to_close_timeout: Option<Duration>,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            start_to_close_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. Returns the last error in the latter two cases.
///
/// `op` receives the 1-based attempt number. Backoff delays are awaited with
/// `tokio::time::sleep`, so the task yields while waiting.
pub async fn execute<T, F, Fut>(
    options: &ActivityOptions,
    activity: &str,
    mut op: F,
) -> Result<T, StepError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StepError>>,
{
    let policy = &options.retry_policy;
    let max_attempts = policy.maximum_attempts.get();
    let mut attempt = 1;

    loop {
        let result = match options.start_to_close_timeout {
            Some(limit) => tokio::time::timeout(limit, op(attempt))
                .await
                .unwrap_or_else(|_| {
                    Err(StepError::transient(
                        ACTIVITY_TIMEOUT,
                        format!("{activity} timed out after {}ms", limit.as_millis()),
                    ))
                }),
            None => op(attempt).await,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !policy.is_retryable(&err) {
            tracing::debug!(activity, attempt, code = err.code(), "non-retryable failure");
            return Err(err);
        }
        if attempt >= max_attempts {
            tracing::warn!(
                activity,
                attempts = attempt,
                code = err.code(),
                error = %err,
                "retry budget exhausted"
            );
            return Err(err);
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::warn!(
            activity,
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "activity failed, retrying"
        );
        metrics::counter!("step_retries_total", "activity" => activity.to_string()).increment(1);

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn options() -> ActivityOptions {
        ActivityOptions::default()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.initial_interval, Duration::from_secs(1));
        assert_eq!(policy.backoff_coefficient, 2.0);
        assert_eq!(policy.maximum_interval, Duration::from_secs(60));
        assert_eq!(policy.maximum_attempts.get(), 3);
        assert_eq!(policy.non_retryable_error_kinds, vec![ErrorKind::Business]);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(7), Duration::from_secs(60));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_classification_drives_retryability() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retryable(&StepError::business("HOTEL_FULL", "full")));
        assert!(policy.is_retryable(&StepError::transient("NETWORK_ERROR", "down")));
    }

    #[test]
    fn test_policy_deserializes_from_millis() {
        let json = r#"{"initial_interval_ms": 500, "maximum_attempts": 5}"#;
        let policy: RetryPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.initial_interval, Duration::from_millis(500));
        assert_eq!(policy.maximum_attempts.get(), 5);
        assert_eq!(policy.maximum_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_policy_rejects_zero_attempts_and_unknown_fields() {
        assert!(serde_json::from_str::<RetryPolicy>(r#"{"maximum_attempts": 0}"#).is_err());
        assert!(serde_json::from_str::<RetryPolicy>(r#"{"attempts": 2}"#).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retried_until_budget() {
        let calls = &AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = execute(&options(), "book_hotel", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StepError::transient("NETWORK_ERROR", "down"))
        })
        .await;

        assert_eq!(result.unwrap_err().code(), "NETWORK_ERROR");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second.
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_error_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = execute(&options(), "book_dinner", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StepError::business("OUT_OF_STOCK", "out of stock"))
        })
        .await;

        assert_eq!(result.unwrap_err().code(), "OUT_OF_STOCK");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let result = execute(&options(), "book_parking", |attempt| async move {
            if attempt < 3 {
                Err(StepError::transient("CONNECTION_ERROR", "refused"))
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_times_out_as_transient() {
        let mut opts = options();
        opts.start_to_close_timeout = Some(Duration::from_secs(5));
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = execute(&opts, "compensate_hotel", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.code(), ACTIVITY_TIMEOUT);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
