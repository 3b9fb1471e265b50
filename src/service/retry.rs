//! Bounded retry over the text generator
//!
//! Retries transient model failures only, with exponential backoff. Every
//! attempt re-acquires a rate-limiter slot so retries count against the same
//! quota as first tries.

use tokio::time::Duration;

use crate::service::llm::{LlmError, TextGenerator};
use crate::service::rate_limit::RateLimiter;

/// Retry tuning, derived from the analysis configuration
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Attempt ceiling, first try included
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(20),
        }
    }
}

/// Send a prompt with rate limiting and bounded retries.
///
/// Permanent errors fail immediately; transient errors are retried until the
/// attempt ceiling, then the last error is returned.
pub async fn send_with_retry(
    generator: &dyn TextGenerator,
    limiter: &RateLimiter,
    settings: &RetrySettings,
    prompt: &str,
) -> Result<String, LlmError> {
    let max_attempts = settings.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        limiter.await_slot().await;

        match generator.generate(prompt).await {
            Ok(text) => {
                if attempt > 1 {
                    tracing::info!(attempt = attempt, "Model call succeeded after retry");
                }
                return Ok(text);
            }
            Err(e) if e.is_transient() => {
                if attempt < max_attempts {
                    let delay = backoff_delay(settings, attempt);
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient model error, retrying"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        error = %e,
                        "Transient model error, attempt ceiling reached"
                    );
                    last_error = Some(e);
                }
            }
            Err(e) => {
                tracing::warn!(attempt = attempt, error = %e, "Permanent model error, not retrying");
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or(LlmError::Empty))
}

/// Delay before the attempt after `attempt`: doubles from the initial value,
/// capped at the configured maximum
fn backoff_delay(settings: &RetrySettings, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(16);
    settings
        .initial_backoff
        .saturating_mul(1u32 << shift)
        .min(settings.max_backoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator that fails transiently a fixed number of times, then succeeds
    struct FlakyGenerator {
        failures_before_success: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(LlmError::Upstream(503))
            } else {
                Ok("ok".to_string())
            }
        }
    }

    /// Generator that always fails with a permanent error
    struct RejectingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for RejectingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::InvalidRequest {
                status: 400,
                message: "bad request".to_string(),
            })
        }
    }

    fn fast_settings(max_attempts: u32) -> RetrySettings {
        RetrySettings {
            max_attempts,
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(20),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retry_until_ceiling() {
        let generator = FlakyGenerator {
            failures_before_success: 100,
            calls: AtomicUsize::new(0),
        };
        let limiter = RateLimiter::new(100, Duration::from_secs(60));

        let result = send_with_retry(&generator, &limiter, &fast_settings(5), "p").await;

        assert!(matches!(result, Err(LlmError::Upstream(503))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let generator = FlakyGenerator {
            failures_before_success: 2,
            calls: AtomicUsize::new(0),
        };
        let limiter = RateLimiter::new(100, Duration::from_secs(60));

        let result = send_with_retry(&generator, &limiter, &fast_settings(5), "p").await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_errors_fail_on_first_attempt() {
        let generator = RejectingGenerator {
            calls: AtomicUsize::new(0),
        };
        let limiter = RateLimiter::new(100, Duration::from_secs(60));

        let result = send_with_retry(&generator, &limiter, &fast_settings(5), "p").await;

        assert!(matches!(result, Err(LlmError::InvalidRequest { .. })));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_consumes_a_rate_limit_slot() {
        let generator = FlakyGenerator {
            failures_before_success: 100,
            calls: AtomicUsize::new(0),
        };
        // Two slots per window: the third attempt must wait for a reset
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        let before = tokio::time::Instant::now();
        let result = send_with_retry(&generator, &limiter, &fast_settings(3), "p").await;

        assert!(result.is_err());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        assert!(before.elapsed() >= Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let settings = fast_settings(5);
        assert_eq!(backoff_delay(&settings, 1), Duration::from_secs(4));
        assert_eq!(backoff_delay(&settings, 2), Duration::from_secs(8));
        assert_eq!(backoff_delay(&settings, 3), Duration::from_secs(16));
        assert_eq!(backoff_delay(&settings, 4), Duration::from_secs(20));
        assert_eq!(backoff_delay(&settings, 10), Duration::from_secs(20));
    }
}
