//! Retry-until-timeout polling
//!
//! Every remote call made by a resource goes through [`retry`]. Transient
//! failures are retried with exponential backoff until the operation's
//! deadline; anything else stops the loop immediately.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3 * 60);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Backoff configuration between retry attempts
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Overall deadlines for read and write operations
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: DEFAULT_READ_TIMEOUT,
            write: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Per-operation context handed to every resource call
#[derive(Debug, Clone, Default)]
pub struct Context {
    timeouts: Timeouts,
    retry: RetryConfig,
    cancel: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        self.timeouts.read
    }

    pub fn write_timeout(&self) -> Duration {
        self.timeouts.write
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Outcome of a single failed attempt
#[derive(Debug)]
pub enum RetryError {
    Retryable(CloudError),
    NonRetryable(CloudError),
}

impl RetryError {
    pub fn into_inner(self) -> CloudError {
        match self {
            RetryError::Retryable(e) | RetryError::NonRetryable(e) => e,
        }
    }
}

/// Classify an error: only transient errors are retried
impl From<CloudError> for RetryError {
    fn from(err: CloudError) -> Self {
        retryable(err)
    }
}

pub fn retryable(err: CloudError) -> RetryError {
    if err.is_transient() {
        RetryError::Retryable(err)
    } else {
        RetryError::NonRetryable(err)
    }
}

/// Run `op` until it succeeds, fails non-retryably, or `timeout` elapses
///
/// The cancellation token is checked before each attempt and while sleeping
/// between attempts; an in-flight attempt is never interrupted.
pub async fn retry<T, F, Fut>(
    ctx: &Context,
    operation: &str,
    timeout: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RetryError>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        if ctx.is_cancelled() {
            return Err(CloudError::Cancelled(operation.to_string()));
        }

        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(e)) => return Err(e),
            Err(RetryError::Retryable(e)) => e,
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(CloudError::Timeout {
                operation: operation.to_string(),
                last_error: err.to_string(),
            });
        }

        let delay = ctx.retry.delay_for_attempt(attempt).min(deadline - now);
        tracing::warn!(
            "{} failed (attempt {}), retrying in {:?}: {}",
            operation,
            attempt + 1,
            delay,
            err
        );

        tokio::select! {
            _ = ctx.cancel.cancelled() => {
                return Err(CloudError::Cancelled(operation.to_string()));
            }
            _ = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10000),
            backoff_multiplier: 2.0,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(8000));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(10000)); // capped at max
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_until_success() {
        let ctx = Context::new();
        let calls = AtomicU32::new(0);

        let value = retry(&ctx, "create thing", Duration::from_secs(60), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CloudError::Transient("RequestLimitExceeded".into()).into())
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_immediately() {
        let ctx = Context::new();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry(&ctx, "create thing", Duration::from_secs(60), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CloudError::ApiError("InvalidParameter".into()).into())
        })
        .await;

        assert!(matches!(result, Err(CloudError::ApiError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_last_cause() {
        let ctx = Context::new();

        let result: Result<()> = retry(&ctx, "delete thing", Duration::from_secs(10), || async {
            Err(RetryError::Retryable(CloudError::Transient(
                "ResourceInUse".into(),
            )))
        })
        .await;

        match result {
            Err(CloudError::Timeout {
                operation,
                last_error,
            }) => {
                assert_eq!(operation, "delete thing");
                assert!(last_error.contains("ResourceInUse"));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_attempt() {
        let ctx = Context::new();
        ctx.cancellation_token().cancel();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry(&ctx, "read thing", Duration::from_secs(10), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(CloudError::Cancelled(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_between_attempts() {
        let ctx = Context::new();
        let token = ctx.cancellation_token();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry(&ctx, "read thing", Duration::from_secs(60), || {
            calls.fetch_add(1, Ordering::SeqCst);
            token.cancel();
            async { Err(CloudError::Transient("InternalError".into()).into()) }
        })
        .await;

        assert!(matches!(result, Err(CloudError::Cancelled(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
