//! Timeouts and bounded retries for external calls.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, RetrievalError};

/// Upper bound on a single backoff delay.
const MAX_BACKOFF_MS: u64 = 5_000;

/// How external calls (embedding, vector store, localization) are bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry; doubled on each further retry.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            base_backoff_ms: 200,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            max_attempts: 1,
            base_backoff_ms: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.base_backoff_ms
                .saturating_mul(factor)
                .min(MAX_BACKOFF_MS),
        )
    }

    /// Run `call` once under the per-attempt timeout.
    pub async fn with_timeout<T, E, Fut>(&self, operation: &'static str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RetrievalError>,
    {
        match tokio::time::timeout(self.timeout(), call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(RetrievalError::Timeout {
                operation,
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    /// Run `call` until it succeeds, fails with a non-transient error, or the
    /// attempts are exhausted. The last error is returned on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RetrievalError>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.with_timeout(operation, call()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempts < self.max_attempts.max(1) => {
                    let backoff = self.backoff(attempts);
                    warn!(
                        operation,
                        attempt = attempts,
                        wait_ms = backoff.as_millis() as u64,
                        "External call failed, retrying after backoff: {err}"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
