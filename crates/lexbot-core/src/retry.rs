//! Bounded retry for transient bot service failures.
//!
//! Only [`BotError::TransientUnavailable`] is retried, and only where a
//! caller opts in by wrapping a call in [`with_retry`]. The workflow uses it
//! for reads (list/describe); mutations are never retried implicitly.

use std::future::Future;
use std::time::Duration;

use lexbot_types::error::BotError;

/// How many times to try and how long to back off between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Whether a retry should follow a failed `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32, error: &BotError) -> bool {
        attempt < self.max_attempts && error.is_transient()
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Run `call` until it succeeds, fails with a non-transient error, or the
/// attempts run out. The last error is returned as-is.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, BotError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BotError>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.should_retry(attempt, &err) => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    ?backoff,
                    error = %err,
                    "transient failure, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
