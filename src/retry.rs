//! Shared retry policy: bounded attempts with exponential backoff.
//!
//! Every fetch strategy retries transient network errors through the same
//! policy instead of rolling its own loop.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::{ExtractError, ExtractResult};

/// Retry parameters: number of attempts and base delay; the delay doubles
/// after each failed attempt (1s, 2s, 4s with the defaults).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is exhausted. The closure receives the zero-based
    /// attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ExtractResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ExtractResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!("giving up after {} attempts: {err}", self.max_attempts);
                        return Err(err);
                    }
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "transient error on attempt {attempt}/{}, retrying in {delay:?}: {err}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
