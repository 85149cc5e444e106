//! Retry with exponential backoff for flaky network operations
//!
//! Used by listing discovery, where navigation and element clicks fail
//! transiently. Page fetches during a crawl are never retried.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Upper bound on any single backoff delay
const MAX_DELAY: Duration = Duration::from_secs(30);

/// How many times to attempt an operation and how long to wait in between
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_percent: u64,
    cancel: CancellationToken,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` counts the first try and is at least 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: MAX_DELAY,
            jitter_percent: 10,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops retrying once `cancel` fires; a pending backoff ends immediately
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the random jitter added to each delay, as a percentage
    pub fn with_jitter(mut self, jitter_percent: u64) -> Self {
        self.jitter_percent = jitter_percent;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (0-based): base doubled per retry,
    /// capped, plus jitter
    pub fn delay(&self, retry: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let capped = base_ms
            .saturating_mul(2u64.saturating_pow(retry.min(20)))
            .min(self.max_delay.as_millis() as u64);

        let jitter = if self.jitter_percent > 0 && capped > 0 {
            fastrand::u64(0..=capped * self.jitter_percent / 100)
        } else {
            0
        };

        Duration::from_millis(capped + jitter)
    }

    /// Runs `op` until it succeeds or the attempts are used up
    ///
    /// # Arguments
    ///
    /// * `operation` - Label used in log lines
    /// * `op` - Called with the 1-based attempt number
    ///
    /// # Returns
    ///
    /// The first success, or the error from the final attempt (or from the
    /// attempt that was followed by cancellation)
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    tracing::warn!(
                        "{} failed after {} attempt(s): {}",
                        operation,
                        attempt,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay(attempt - 1);
                    tracing::debug!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation,
                        attempt,
                        self.max_attempts,
                        e,
                        delay
                    );
                    let cancelled = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => true,
                        _ = tokio::time::sleep(delay) => false,
                    };
                    if cancelled {
                        tracing::debug!("{} cancelled during backoff", operation);
                        return Err(e);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
