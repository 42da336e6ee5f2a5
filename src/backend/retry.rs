use std::future::Future;
use std::time::Duration;

use crate::backend::error::BackendError;

/// Fixed-delay retry for backend calls that are safe to repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    /// Retry every failure, not only the ones classified retryable.
    pub retry_all: bool,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
            retry_all: false,
        }
    }

    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            retry_all: false,
        }
    }

    pub const fn retrying_all(self) -> Self {
        Self {
            retry_all: true,
            ..self
        }
    }

    /// Avatar generation: two retries, two seconds apart, whatever the failure.
    pub const fn avatar() -> Self {
        Self::fixed(2, Duration::from_secs(2)).retrying_all()
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && (self.retry_all || err.is_retryable()) => {
                    tracing::warn!(
                        what,
                        attempt,
                        attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "backend call failed; retrying"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
