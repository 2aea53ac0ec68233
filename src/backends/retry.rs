//! Exponential backoff for backend I/O.
//!
//! [`RetryBackend`] wraps any [`Backend`] and retries calls that fail with a
//! transient error (see [`BackendError::is_transient`]). Permanent failures
//! and missing blobs are returned immediately.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use super::{Backend, BackendError};
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Decorator adding retries with exponential backoff and jitter to a [`Backend`].
pub struct RetryBackend<B> {
    inner: B,
    /// Maximum number of retries after the first attempt.
    max_retries: usize,
    /// Delay before the first retry; doubles with each attempt.
    base_delay: Duration,
    max_delay: Duration,
}

impl<B> RetryBackend<B>
where
    B: Backend,
{
    /// Wrap `inner`, retrying transient failures up to `max_retries` times.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let backend = ObjectStoreBackend::new(client, &endpoint, "bucket", "articles.json", None)?;
    /// let backend = RetryBackend::new(backend, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: B, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1 << exponent)
            .min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }

    async fn with_backoff<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let e = match call().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            attempt += 1;
            let elapsed_ms_total = total_t0.elapsed().as_millis();

            if !e.is_transient() {
                return Err(e);
            }
            if attempt > self.max_retries {
                error!(
                    operation,
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_total,
                    error = %e,
                    "Backend call exhausted retries"
                );
                return Err(e);
            }

            let delay = self.backoff(attempt);
            warn!(
                operation,
                attempt,
                max = self.max_retries,
                elapsed_ms_total,
                ?delay,
                error = %e,
                "Backend call failed; backing off"
            );
            sleep(delay).await;
        }
    }
}

impl<B> fmt::Debug for RetryBackend<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryBackend")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<B> Backend for RetryBackend<B>
where
    B: Backend,
{
    fn address(&self) -> String {
        self.inner.address()
    }

    #[instrument(level = "debug", skip_all)]
    async fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        self.with_backoff("read", || self.inner.read()).await
    }

    #[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    async fn write(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        self.with_backoff("write", || self.inner.write(bytes.clone()))
            .await
    }
}
