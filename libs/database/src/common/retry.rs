use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff settings for startup connections
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (1-based), capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

/// Retry an async operation until it succeeds or the retry budget is spent.
/// The last error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) if attempt >= config.max_retries => {
                warn!(attempts = attempt + 1, error = %e, "Giving up after retries");
                return Err(e);
            }
            Err(e) => {
                attempt += 1;
                let delay = config.delay_for(attempt);
                debug!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
