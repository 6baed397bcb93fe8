//! Bounded retry for single external calls
//!
//! Rate-limited failures back off exponentially (`rate_limit_base ^ attempt`
//! seconds, or the provider's hint when larger). Other retriable failures wait
//! `retry_delay * attempt`. Fatal failures return at once.

use crate::config::PipelineConfig;
use crate::provider::{FailureClass, ProviderError};
use std::future::Future;
use std::time::Duration;

/// Upper bound for a single backoff, in seconds
const MAX_BACKOFF_SECS: f64 = 300.0;

/// Retry settings
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts including the first one
    pub max_attempts: u32,
    /// Linear step for transient failures
    pub retry_delay: Duration,
    /// Exponential base for rate limits, in seconds
    pub rate_limit_base: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
            rate_limit_base: config.rate_limit_base,
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based)
    ///
    /// `None` means the failure must not be retried.
    pub fn delay_after(&self, error: &ProviderError, attempt: u32) -> Option<Duration> {
        match error.class() {
            FailureClass::Fatal => None,
            FailureClass::Retriable => Some(self.retry_delay.saturating_mul(attempt)),
            FailureClass::RateLimited => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = self.rate_limit_base.powi(exponent).min(MAX_BACKOFF_SECS);
                let computed = Duration::from_secs_f64(secs);
                let hinted = error
                    .retry_after()
                    .map(|s| Duration::from_secs_f64((s as f64).min(MAX_BACKOFF_SECS)))
                    .unwrap_or_default();
                Some(computed.max(hinted))
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Failure after the executor gave up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{last} (attempts: {attempts})")]
pub struct RetryError {
    pub attempts: u32,
    pub last: ProviderError,
}

/// Runs one external call under a [`RetryPolicy`]
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Call `call` until it succeeds, fails fatally, or attempts run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(call = label, attempt, "calling provider");

            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                tracing::warn!(call = label, attempt, error = %err, "giving up after last attempt");
                return Err(RetryError {
                    attempts: attempt,
                    last: err,
                });
            }

            match self.policy.delay_after(&err, attempt) {
                Some(delay) => {
                    tracing::warn!(
                        call = label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::warn!(call = label, attempt, error = %err, "not retriable");
                    return Err(RetryError {
                        attempts: attempt,
                        last: err,
                    });
                }
            }
        }
    }
}
