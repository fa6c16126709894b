//! Retry handler for chain calls that may fail temporarily

use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::utils::logging;

/// Retries an operation with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryHandler {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl RetryHandler {
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }

    pub fn with_config(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or the attempts are exhausted.
    /// The last error is returned unchanged.
    pub async fn execute_with_retry_and_logging<F, Fut, T, E>(
        &self,
        operation: F,
        operation_name: &str,
        scope: &str,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        logging::log_info(&format!(
                            "[{}] {} succeeded after {} attempts",
                            scope, operation_name, attempt
                        ));
                    }
                    return Ok(result);
                }
                Err(e) if attempt >= self.max_attempts => {
                    logging::log_error(&format!(
                        "[{}] {} failed after {} attempts: {}",
                        scope, operation_name, attempt, e
                    ));
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.calculate_delay(attempt);
                    logging::log_warning(&format!(
                        "[{}] {} failed (attempt {}/{}): {}. Retrying in {}ms",
                        scope, operation_name, attempt, self.max_attempts, e, delay
                    ));
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Calculate exponential backoff delay, saturating at `u64::MAX`
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let factor = 2_u64
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        self.base_delay_ms.saturating_mul(factor)
    }
}

impl Default for RetryHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let handler = RetryHandler::with_config(5, 100);
        assert_eq!(handler.calculate_delay(1), 100);
        assert_eq!(handler.calculate_delay(2), 200);
        assert_eq!(handler.calculate_delay(4), 800);
    }

    #[test]
    fn test_backoff_saturates_for_large_attempts() {
        let handler = RetryHandler::with_config(200, 1_000);
        assert_eq!(handler.calculate_delay(64), u64::MAX);
        assert_eq!(handler.calculate_delay(100), u64::MAX);
        assert_eq!(handler.calculate_delay(u32::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let handler = RetryHandler::with_config(3, 1);
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = handler
            .execute_with_retry_and_logging(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(format!("attempt {}", n))
                    } else {
                        Ok(n)
                    }
                },
                "flaky",
                "test",
            )
            .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let handler = RetryHandler::with_config(2, 1);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = handler
            .execute_with_retry_and_logging(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                "always_down",
                "test",
            )
            .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
