//! Resilient-call wrapper: bounded attempts, pure exponential backoff, and a
//! fire-and-forget recovery hook for connection failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::error::AssistantError;
use crate::traits::RecoveryHook;

pub struct RetryExecutor {
    max_attempts: u32,
    recovery: Arc<dyn RecoveryHook>,
}

impl RetryExecutor {
    pub fn new(max_attempts: u32, recovery: Arc<dyn RecoveryHook>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            recovery,
        }
    }

    /// Drive `operation` until it succeeds or the attempt budget is spent.
    /// Between failed attempts, sleeps `2^attempt` seconds (attempt starting
    /// at 1); no sleep after the final failure. Connection failures also
    /// fire the recovery hook as a detached task.
    ///
    /// Exhaustion reports only the attempt count — the last underlying
    /// error is logged here, not returned.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, AssistantError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Attempt failed"
                    );

                    if is_connection_failure(&err) {
                        error!("Model server connection failed; firing recovery hook");
                        let recovery = Arc::clone(&self.recovery);
                        tokio::spawn(async move {
                            recovery.attempt_recovery().await;
                        });
                    }

                    if attempt < self.max_attempts {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(AssistantError::OperationExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// `2^attempt * 1000ms`: 2s after the first failure, then 4s, 8s, ...
/// No jitter — the backend is a single local process, not a shared service.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000u64.saturating_mul(2u64.saturating_pow(attempt)))
}

/// A refused connection or failed fetch means the local model server is not
/// running; everything else retries without triggering recovery.
pub(crate) fn is_connection_failure(err: &anyhow::Error) -> bool {
    if err
        .downcast_ref::<reqwest::Error>()
        .is_some_and(|e| e.is_connect())
    {
        return true;
    }
    let message = format!("{err:#}");
    message.contains("Connection refused")
        || message.contains("ECONNREFUSED")
        || message.contains("fetch failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingRecovery;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn executor(max_attempts: u32) -> (RetryExecutor, Arc<CountingRecovery>) {
        let recovery = Arc::new(CountingRecovery::default());
        (
            RetryExecutor::new(max_attempts, recovery.clone()),
            recovery,
        )
    }

    #[test]
    fn backoff_is_pure_exponential() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let (executor, _) = executor(3);
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        let result = executor
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(anyhow!("transient"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two failures: 2s + 4s of backoff before the third attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts_without_trailing_sleep() {
        let (executor, _) = executor(3);
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        let result: Result<(), _> = executor
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow!("still down")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(AssistantError::OperationExhausted { attempts: 3 })
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn connection_failure_fires_recovery_hook() {
        let (executor, recovery) = executor(2);

        let result: Result<(), _> = executor
            .execute(|| async { Err(anyhow!("tcp connect error: Connection refused (os error 61)")) })
            .await;

        assert!(result.is_err());
        // The hook runs on a detached task; let it get scheduled.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(recovery.calls() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_failure_does_not_fire_recovery() {
        let (executor, recovery) = executor(2);

        let result: Result<(), _> = executor
            .execute(|| async { Err(anyhow!("model returned 500")) })
            .await;

        assert!(result.is_err());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(recovery.calls(), 0);
    }

    #[test]
    fn classifier_matches_refusals_and_fetch_failures() {
        assert!(is_connection_failure(&anyhow!("Connection refused")));
        assert!(is_connection_failure(&anyhow!("ECONNREFUSED")));
        assert!(is_connection_failure(&anyhow!("fetch failed")));
        assert!(!is_connection_failure(&anyhow!("no choices in response")));
    }
}
