//! Retry and fallback strategies for remote calls.
//!
//! Every cross-service call runs under a [`RetryPolicy`]: up to
//! `max_retries` attempts, exponential backoff between them, and a timeout
//! per attempt that is independent of the retry budget. Any non-OK status
//! counts as a failure — a transport error and an error payload carried in
//! an otherwise-delivered response are treated the same.

use std::future::Future;
use std::time::Duration;

use tonic::Status;
use tracing::warn;

/// Retry behavior for a remote call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (initial attempt included).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
    /// Timeout applied to each attempt individually.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Calculate the backoff delay for a given attempt number (0-indexed).
    ///
    /// Exponential: `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential_ms = base_ms.saturating_mul(1u64 << attempt.min(20));
        let capped_ms = exponential_ms.min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped_ms)
    }

    /// Whether another attempt remains after the given one (0-indexed).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_retries
    }

    /// Execute `op` under this policy, returning the last error once the
    /// attempt budget is exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, Status>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Status>>,
    {
        let mut attempt = 0u32;
        loop {
            let result = match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(Status::deadline_exceeded(format!(
                    "{} exceeded per-attempt timeout of {:?}",
                    operation, self.attempt_timeout
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(status) if self.should_retry(attempt) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay = ?delay,
                        error = %status,
                        "Call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(status) => {
                    warn!(
                        operation,
                        attempts = attempt + 1,
                        error = %status,
                        "Call failed, retries exhausted"
                    );
                    return Err(status);
                }
            }
        }
    }
}

/// Run `fallback` only when the whole `primary` chain — including any
/// retries inside it — has failed.
///
/// The fallback is nested around the retry loop, not inside it: a transient
/// failure of the preferred query shape is retried first, and only a
/// permanently failing primary falls through to the legacy shape.
pub async fn with_fallback<T, P, PFut, S, SFut>(
    operation: &str,
    primary: P,
    fallback: S,
) -> Result<T, Status>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T, Status>>,
    S: FnOnce() -> SFut,
    SFut: Future<Output = Result<T, Status>>,
{
    match primary().await {
        Ok(value) => Ok(value),
        Err(status) => {
            warn!(
                operation,
                error = %status,
                "Primary query shape failed, trying fallback"
            );
            fallback().await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = quick_policy();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry() {
        let policy = quick_policy();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let start = tokio::time::Instant::now();

        let result = quick_policy()
            .run("test.transient", move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Status::unavailable("transient"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Slept 1s after the first failure, 2s after the second.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(4), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_raises_last_error_without_fourth_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), Status> = quick_policy()
            .run("test.always_down", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Status::unavailable("still down"))
                }
            })
            .await;

        let status = result.unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_gets_its_own_timeout() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), Status> = quick_policy()
            .run("test.hung", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { std::future::pending().await }
            })
            .await;

        let status = result.unwrap_err();
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_payload_is_retried_like_transport_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), Status> = quick_policy()
            .run("test.error_payload", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Status::internal("error list in response"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_runs_only_after_primary_exhaustion() {
        let primary_attempts = Arc::new(AtomicU32::new(0));
        let policy = quick_policy();

        let counter = primary_attempts.clone();
        let result = with_fallback(
            "test.fallback",
            || {
                let policy = policy.clone();
                let counter = counter.clone();
                async move {
                    policy
                        .run("test.fallback.primary", move || {
                            let counter = counter.clone();
                            async move {
                                counter.fetch_add(1, Ordering::SeqCst);
                                Err::<u32, _>(Status::unimplemented("no such query"))
                            }
                        })
                        .await
                }
            },
            || async { Ok(7) },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        // The legacy shape ran only after the preferred shape burned its
        // full retry budget.
        assert_eq!(primary_attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fallback_skipped_when_primary_succeeds() {
        let result = with_fallback(
            "test.no_fallback",
            || async { Ok::<_, Status>(1) },
            || async { Ok(2) },
        )
        .await;
        assert_eq!(result.unwrap(), 1);
    }
}
