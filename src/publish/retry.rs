// SPDX-License-Identifier: MPL-2.0
//! Exponential backoff for storage operations.
//!
//! Only errors whose category is [`ErrorCategory::System`](crate::error::ErrorCategory)
//! are retried. Every failed attempt, and a success after at least one
//! failure, is reported as a [`DiagnosticEventKind::RetryAttempt`].

use std::future::Future;
use std::time::Duration;

use crate::config::{RetryConfig, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_INITIAL_DELAY_MS};
use crate::diagnostics::{DiagnosticEventKind, DiagnosticsHandle};
use crate::error::Result;

/// Attempt count and first delay; later delays double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy with at least one attempt.
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts(), config.initial_delay())
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Delay slept after the failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1 << doublings)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable
    /// error, or the attempts are used up.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn run<T, F, Fut>(
        &self,
        name: &str,
        diagnostics: Option<&DiagnosticsHandle>,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        log_attempt(diagnostics, name, attempt, None);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    log_attempt(diagnostics, name, attempt, Some(err.to_string()));
                    if !err.is_retryable() || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay_after(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn log_attempt(
    diagnostics: Option<&DiagnosticsHandle>,
    operation: &str,
    attempt: u32,
    error: Option<String>,
) {
    if let Some(diagnostics) = diagnostics {
        diagnostics.log(DiagnosticEventKind::RetryAttempt {
            operation: operation.to_string(),
            attempt,
            success: error.is_none(),
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{BufferCapacity, DiagnosticsCollector};
    use crate::error::{Error, SessionError, StorageError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn network_error() -> Error {
        StorageError::Network("connection reset".into()).into()
    }

    #[test]
    fn defaults_are_three_attempts_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.initial_delay(), Duration::from_secs(1));
    }

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
    }

    #[test]
    fn zero_attempts_becomes_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn from_config_reads_section() {
        let config = RetryConfig {
            max_attempts: Some(5),
            initial_delay_ms: Some(250),
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.initial_delay(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run("upload", None, || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call < 3 {
                        Err(network_error())
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.ok(), Some(3));
        // 1 s after the first failure, 2 s after the second.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = RetryPolicy::default()
            .run("upload", None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(network_error()) }
            })
            .await;

        assert!(matches!(result, Err(Error::Storage(StorageError::Network(_)))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn user_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<()> = RetryPolicy::default()
            .run("upload", None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SessionError::EmptySelection.into()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_logged() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();
        let calls = AtomicU32::new(0);

        let result = RetryPolicy::default()
            .run("delete", Some(&handle), || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        Err(network_error())
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(result.is_ok());

        collector.process_pending();
        let kinds: Vec<_> = collector.kinds().cloned().collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticEventKind::RetryAttempt {
                    operation: "delete".into(),
                    attempt: 1,
                    success: false,
                    error: Some("Storage Error: Network error: connection reset".into()),
                },
                DiagnosticEventKind::RetryAttempt {
                    operation: "delete".into(),
                    attempt: 2,
                    success: true,
                    error: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn first_try_success_logs_nothing() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();

        let value = RetryPolicy::default()
            .run("upload", Some(&handle), || async { Ok(7) })
            .await;
        assert_eq!(value.ok(), Some(7));

        collector.process_pending();
        assert!(collector.is_empty());
    }
}
