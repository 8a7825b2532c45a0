//! Exponential backoff with jitter. Wraps every remote call in the crate.
//!
//! The backoff sleep suspends the calling task without occupying a worker
//! thread, so many chats can retry concurrently. It is also the loop's
//! cancellation point: aborting the owning task lands before the next
//! attempt.

use crate::domain::IngestError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry policy. Constructor-normalized so the invariants hold by the time a
/// value exists: at least one attempt, a positive base delay, a cap no
/// smaller than the base, jitter inside `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_factor: f64,
}

impl RetryConfig {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        jitter_factor: f64,
    ) -> Self {
        let base_delay = base_delay.max(Duration::from_millis(1));
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter_factor: jitter_factor.clamp(0.0, 0.99),
        }
    }

    /// Preset for authentication-adjacent calls: more patient, longer cap.
    pub fn auth() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(60), 0.25)
    }

    /// Preset for cheap lookups where failing fast beats waiting.
    pub fn quick() -> Self {
        Self::new(2, Duration::from_millis(250), Duration::from_secs(2), 0.25)
    }

    /// Backoff before the attempt after `attempt` (1-based) failures:
    /// `min(max_delay, base_delay * 2^(attempt-1))`, uniformly jittered
    /// within ±`jitter_factor`, floored at 1 ms.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63);
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let capped = ((base_ms as u128) << exp).min(max_ms as u128) as u64;

        let ms = if self.jitter_factor > 0.0 {
            let span = capped as f64 * self.jitter_factor;
            let lo = capped as f64 - span;
            let hi = capped as f64 + span;
            rand::thread_rng().gen_range(lo..=hi).round() as u64
        } else {
            capped
        };
        Duration::from_millis(ms.max(1))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(30), 0.25)
    }
}

/// Outcome of a retried operation. Exhaustion never synthesizes a success:
/// `attempts` is how many were actually tried and `last_failure` is the final
/// error verbatim.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    Exhausted {
        attempts: u32,
        last_failure: IngestError,
    },
}

impl<T> RetryOutcome<T> {
    /// Fold exhaustion into the error taxonomy for callers that propagate.
    pub fn into_result(self) -> Result<T, IngestError> {
        match self {
            RetryOutcome::Success(value) => Ok(value),
            RetryOutcome::Exhausted {
                attempts,
                last_failure,
            } => Err(IngestError::Exhausted {
                attempts,
                last: Box::new(last_failure),
            }),
        }
    }
}

/// Executes a fallible async operation under a [`RetryConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RetryEngine {
    config: RetryConfig,
}

impl RetryEngine {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Retry `op` on retryable failures (transient transport errors).
    pub async fn run<T, F, Fut>(&self, op: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IngestError>>,
    {
        self.run_if(op, IngestError::is_retryable).await
    }

    /// Retry `op` while `should_retry` accepts the failure. A rejected
    /// failure stops immediately, even with attempts left.
    pub async fn run_if<T, F, Fut, P>(&self, mut op: F, should_retry: P) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IngestError>>,
        P: Fn(&IngestError) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return RetryOutcome::Success(value),
                Err(err) => {
                    if attempt >= self.config.max_attempts || !should_retry(&err) {
                        return RetryOutcome::Exhausted {
                            attempts: attempt,
                            last_failure: err,
                        };
                    }
                    let delay = self.config.delay_for(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
