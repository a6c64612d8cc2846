//! Bounded retry for ledger operations that lost a race.
//!
//! An operation signals a lost race by returning an error for which
//! [`Error::is_conflict`] holds. Its transaction has already been rolled back
//! at that point, so the whole operation is simply run again after a short,
//! doubling delay.

use crate::errors::{Error, Result};
use std::{future::Future, time::Duration};
use tracing::warn;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration for retry behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(MAX_BACKOFF)
    }
}

/// Runs `operation` until it succeeds, fails with a non-conflict error, or
/// the attempt budget is spent. Exhaustion is reported as [`Error::Busy`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Err(err) if err.is_conflict() => {
                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "Giving up after repeated concurrent modification"
                    );
                    return Err(Error::Busy { attempts: attempt });
                }

                warn!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    "Concurrent modification detected, retrying"
                );
                tokio::time::sleep(policy.backoff_for(attempt)).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
