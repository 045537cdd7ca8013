//! Retry policy for live geocoding calls.

use std::future::Future;
use std::time::Duration;

/// How many times to try a retryable operation and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Multiplier applied to the delay after each failed attempt; 1.0 = fixed delay.
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            backoff: 1.0,
        }
    }
}

impl RetryPolicy {
    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
            backoff: 1.0,
        }
    }

    /// Delay to sleep after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let factor = self.backoff.max(1.0).powi(exponent).min(1e6);
        self.delay.mul_f64(factor)
    }

    /// Runs `op` until it succeeds, returns a non-retryable error, or attempts run out.
    pub async fn run<T, E, F, Fut>(&self, is_retryable: impl Fn(&E) -> bool, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < attempts && is_retryable(&e) => {
                    let wait = self.delay_after(attempt);
                    tracing::warn!(
                        target: "zodiac::location",
                        attempt,
                        max_attempts = attempts,
                        ?wait,
                        error = %e,
                        "retrying geocoding call"
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_grows_delay() {
        let policy = RetryPolicy {
            max_attempts: 4,
            delay: Duration::from_millis(100),
            backoff: 2.0,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(RetryPolicy::default().delay_after(3), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = RetryPolicy::no_delay(3)
            .run(|_| true, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom".to_string()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = RetryPolicy::no_delay(5)
            .run(|e: &String| e != "fatal", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal".to_string()) }
            })
            .await;
        assert_eq!(result, Err("fatal".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_on_a_later_attempt() {
        let result: Result<u32, String> = RetryPolicy::no_delay(3)
            .run(|_| true, |attempt| async move {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(3));
    }
}
