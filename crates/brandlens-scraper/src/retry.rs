//! Retry executor for provider calls.
//!
//! Every remote call made on behalf of a source goes through
//! [`run_with_retry`]: each attempt is bounded by the policy's per-call
//! timeout, and failed attempts are followed by a linear backoff
//! (`base_delay × attempt`). Waiting is delegated to a [`Sleeper`] so tests
//! can observe the schedule without real time passing.

use std::future::Future;
use std::time::Duration;

use brandlens_core::RetryPolicy;
use futures::future::BoxFuture;

use crate::error::ScraperError;

/// Source of delays for retries and throttling.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// The waits [`run_with_retry`] performs when every attempt fails.
///
/// One entry per gap between attempts, so `max_attempts - 1` entries. With
/// the default policy (3 attempts, 2 s base) this is `[2s, 4s]`.
#[must_use]
pub fn backoff_schedule(policy: &RetryPolicy) -> Vec<Duration> {
    (1..policy.max_attempts())
        .map(|attempt| policy.delay_for(attempt))
        .collect()
}

/// Executes `operation` up to `policy.max_attempts()` times.
///
/// Returns the first success. An attempt that exceeds `policy.call_timeout()`
/// counts as a failed attempt with [`ScraperError::Timeout`]. Non-retriable
/// errors (see [`ScraperError::is_retriable`]) are returned immediately,
/// unchanged. When every attempt fails the last error is wrapped in
/// [`ScraperError::ExhaustedRetries`]. No wait follows the final attempt.
///
/// # Errors
///
/// See above.
pub async fn run_with_retry<T, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
    description: &str,
    sleeper: &dyn Sleeper,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        tracing::debug!(attempt, max_attempts, description, "provider call attempt");

        let err = match tokio::time::timeout(policy.call_timeout(), operation()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_) => ScraperError::Timeout {
                description: description.to_string(),
                timeout_secs: policy.call_timeout().as_secs(),
            },
        };

        if !err.is_retriable() {
            tracing::warn!(attempt, description, error = %err, "non-retriable provider error");
            return Err(err);
        }

        if attempt >= max_attempts {
            tracing::error!(attempts = attempt, description, error = %err, "all attempts failed");
            return Err(ScraperError::ExhaustedRetries {
                description: description.to_string(),
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_secs = delay.as_secs_f64(),
            description,
            error = %err,
            "provider call failed, retrying after backoff"
        );
        sleeper.sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            self.waits.lock().unwrap().push(duration);
            Box::pin(async {})
        }
    }

    fn policy(attempts: u32, base_secs: u64) -> RetryPolicy {
        RetryPolicy::new(
            attempts,
            Duration::from_secs(base_secs),
            Duration::from_secs(60),
        )
    }

    fn api_error() -> ScraperError {
        ScraperError::Api {
            status: 502,
            message: "bad gateway".to_owned(),
        }
    }

    #[test]
    fn schedule_is_linear() {
        assert_eq!(
            backoff_schedule(&policy(3, 2)),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert_eq!(
            backoff_schedule(&policy(4, 1)),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[test]
    fn single_attempt_has_no_waits() {
        assert!(backoff_schedule(&policy(1, 2)).is_empty());
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let sleeper = RecordingSleeper::default();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = run_with_retry(
            || {
                let cc = Arc::clone(&cc);
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, ScraperError>(42)
                }
            },
            &policy(3, 2),
            "test op",
            &sleeper,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let sleeper = RecordingSleeper::default();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = run_with_retry(
            || {
                let cc = Arc::clone(&cc);
                async move {
                    let n = cc.fetch_add(1, Ordering::SeqCst);
                    if n < 1 {
                        Err(api_error())
                    } else {
                        Ok::<u32, ScraperError>(7)
                    }
                }
            },
            &policy(3, 2),
            "test op",
            &sleeper,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert_eq!(*sleeper.waits.lock().unwrap(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts_with_linear_waits() {
        let sleeper = RecordingSleeper::default();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = run_with_retry(
            || {
                let cc = Arc::clone(&cc);
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, ScraperError>(api_error())
                }
            },
            &policy(3, 2),
            "fetch items",
            &sleeper,
        )
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.waits.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        match result {
            Err(ScraperError::ExhaustedRetries {
                description,
                attempts,
                source,
            }) => {
                assert_eq!(description, "fetch items");
                assert_eq!(attempts, 3);
                assert!(matches!(*source, ScraperError::Api { status: 502, .. }));
            }
            other => panic!("expected ExhaustedRetries, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn does_not_retry_unauthorized() {
        let sleeper = RecordingSleeper::default();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = run_with_retry(
            || {
                let cc = Arc::clone(&cc);
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, ScraperError>(ScraperError::Unauthorized {
                        status: 401,
                        message: "invalid token".to_owned(),
                    })
                }
            },
            &policy(3, 2),
            "test op",
            &sleeper,
        )
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::Unauthorized { .. })));
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out_and_is_retried() {
        let sleeper = RecordingSleeper::default();
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let policy = RetryPolicy::new(2, Duration::from_secs(1), Duration::from_millis(50));
        let result = run_with_retry(
            || {
                let cc = Arc::clone(&cc);
                async move {
                    let n = cc.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        tokio::time::sleep(Duration::from_secs(10)).await;
                    }
                    Ok::<u32, ScraperError>(5)
                }
            },
            &policy,
            "slow op",
            &sleeper,
        )
        .await;

        assert_eq!(result.unwrap(), 5);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert_eq!(*sleeper.waits.lock().unwrap(), vec![Duration::from_secs(1)]);
    }
}
