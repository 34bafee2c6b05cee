use log::{error, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff schedule for a retried request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total tries, the first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, given the delay used before it.
    fn next_delay(&self, delay: Duration) -> Duration {
        let next = Duration::from_millis((delay.as_millis() as f64 * self.exponential_base) as u64);
        next.min(self.max_delay)
    }
}

/// Retry settings for feed requests. Kept well under the default poll
/// interval so a retried fetch finishes before the next tick.
pub fn feed_retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(4),
        exponential_base: 2.0,
    }
}

/// Run `operation` until it succeeds, the attempts are used up, or it fails
/// with an error `is_transient` rejects. Delays grow by `exponential_base`.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    is_transient: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    warn!("'{}' succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        if !is_transient(&error) {
            error!("'{}' failed permanently: {}", operation_name, error);
            return Err(error);
        }
        if attempt >= config.max_attempts {
            error!(
                "'{}' gave up after {} attempts, last error: {}",
                operation_name, attempt, error
            );
            return Err(error);
        }

        warn!(
            "'{}' attempt {}/{} failed: {}. Next try in {:?}",
            operation_name, attempt, config.max_attempts, error, delay
        );
        sleep(delay).await;
        delay = config.next_delay(delay);
    }
}
