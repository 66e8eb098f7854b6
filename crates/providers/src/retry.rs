//! Bounded retry with per-attempt timeouts.
//!
//! Wraps a provider so that throttled calls are retried a few times with
//! exponential backoff. Every other failure, guardrail refusals included,
//! is returned on the first occurrence. A throttle that asks for a wait
//! longer than the backoff ceiling is returned without sleeping.

use async_trait::async_trait;
use finsight_core::error::ProviderError;
use finsight_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A provider that retries rate-limited calls on an inner provider.
pub struct RetryingProvider {
    inner: Arc<dyn Provider>,
    max_retries: u32,
    backoff: Duration,
    max_backoff: Option<Duration>,
    timeout: Duration,
}

impl RetryingProvider {
    /// Wrap `inner` with 2 retries, 500ms base backoff, and a 60s timeout.
    pub fn new(inner: Arc<dyn Provider>) -> Self {
        Self {
            inner,
            max_retries: 2,
            backoff: Duration::from_millis(500),
            max_backoff: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Extra attempts after the first rate-limited call.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Base delay; doubled after each retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Longest wait before a retry. Defaults to the per-attempt timeout.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    /// Deadline for each individual attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the next attempt, or `None` when the server asks for
    /// longer than the ceiling allows.
    fn delay_for(&self, attempt: u32, error: &ProviderError) -> Option<Duration> {
        let ceiling = self.max_backoff.unwrap_or(self.timeout);
        let exponential = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
        match error {
            ProviderError::RateLimited { retry_after_secs } => {
                let requested = Duration::from_secs(*retry_after_secs);
                if requested > ceiling {
                    return None;
                }
                Some(exponential.max(requested).min(ceiling))
            }
            _ => Some(exponential.min(ceiling)),
        }
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0;

        loop {
            let result = match tokio::time::timeout(self.timeout, self.inner.complete(request.clone())).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    self.inner.name(),
                    self.timeout.as_secs()
                ))),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let Some(delay) = self.delay_for(attempt, &e) else {
                        warn!(
                            provider = %self.inner.name(),
                            error = %e,
                            "Rate limited beyond backoff ceiling, not retrying"
                        );
                        return Err(e);
                    };
                    attempt += 1;
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    if attempt > 0 {
                        info!(provider = %self.inner.name(), attempt, "Succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
