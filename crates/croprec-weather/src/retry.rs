//! Retry with backoff for provider calls.
//!
//! Two delay schedules:
//! - Rate limited (429): `rate_limit_delay + attempt_index` seconds
//! - Anything else: `base_delay`, multiplied by `multiplier` after each use
//!
//! Both are capped at `max_delay`. Every failure is retried until
//! `max_attempts` is reached. No delay is taken after the final attempt.

use std::future::Future;
use std::time::Duration;

use crate::clock::Clock;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 800;
pub const DEFAULT_MULTIPLIER: f64 = 1.6;
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 2000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// How a failed attempt should be delayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryKind {
    /// Provider asked us to slow down
    RateLimited,
    /// Transport or HTTP failure, exponential backoff
    Backoff,
}

pub trait RetryClassify {
    fn retry_kind(&self) -> RetryKind;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// First backoff delay
    pub base_delay: Duration,
    /// Growth factor applied to the backoff delay after each use
    pub multiplier: f64,
    /// Base delay for rate-limited attempts (attempt index is added in seconds)
    pub rate_limit_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay after a rate-limited attempt with the given zero-based index.
    pub fn rate_limit_delay_for(&self, attempt: u32) -> Duration {
        self.rate_limit_delay
            .saturating_add(Duration::from_secs(u64::from(attempt)))
            .min(self.max_delay)
    }

    /// Backoff delay for the n-th (zero-based) non-rate-limited failure.
    pub fn backoff_delay_for(&self, failure: u32) -> Duration {
        let exponent = i32::try_from(failure).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(0.0).powi(exponent);
        // Overflow and NaN both fall back to the cap
        Duration::try_from_secs_f64(self.base_delay.as_secs_f64() * factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// `operation` receives the zero-based attempt index. On exhaustion the
/// error of the last attempt is returned.
pub async fn with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClassify + std::fmt::Display,
{
    let attempts = policy.attempts();
    let mut backoff_failures = 0;
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Provider call succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt + 1 >= attempts {
                    tracing::error!("All {} attempts exhausted: {}", attempts, e);
                    return Err(e);
                }

                let delay = match e.retry_kind() {
                    RetryKind::RateLimited => policy.rate_limit_delay_for(attempt),
                    RetryKind::Backoff => {
                        let d = policy.backoff_delay_for(backoff_failures);
                        backoff_failures += 1;
                        d
                    }
                };

                tracing::warn!(
                    "Attempt {} of {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    attempts,
                    e,
                    delay
                );
                clock.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    #[derive(Debug)]
    enum TestError {
        Limited,
        Broken,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl RetryClassify for TestError {
        fn retry_kind(&self) -> RetryKind {
            match self {
                Self::Limited => RetryKind::RateLimited,
                Self::Broken => RetryKind::Backoff,
            }
        }
    }

    fn assert_close(actual: Duration, expected_ms: u64) {
        let diff = actual.as_secs_f64() * 1000.0 - expected_ms as f64;
        assert!(diff.abs() < 1.0, "expected ~{}ms, got {:?}", expected_ms, actual);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(800));
        assert_eq!(policy.rate_limit_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_close(policy.backoff_delay_for(0), 800);
        assert_close(policy.backoff_delay_for(1), 1280);
        assert_close(policy.backoff_delay_for(2), 2048);
    }

    #[test]
    fn test_huge_multiplier_is_capped() {
        let policy = RetryPolicy {
            multiplier: 1e300,
            ..RetryPolicy::default()
        };
        assert_close(policy.backoff_delay_for(0), 800);
        assert_eq!(policy.backoff_delay_for(1), policy.max_delay);
        assert_eq!(policy.backoff_delay_for(u32::MAX), policy.max_delay);
    }

    #[test]
    fn test_long_schedules_stay_under_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay_for(100), Duration::from_secs(30));
        assert_eq!(policy.rate_limit_delay_for(100), Duration::from_secs(30));
        assert_eq!(policy.rate_limit_delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_huge_multiplier_exhausts_without_panicking() {
        let clock = ManualClock::new();
        let policy = RetryPolicy {
            max_attempts: 5,
            multiplier: 1e300,
            ..RetryPolicy::default()
        };
        let result: Result<(), TestError> =
            with_backoff(&policy, &clock, |_| async { Err(TestError::Broken) }).await;

        assert!(matches!(result, Err(TestError::Broken)));
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps[1..].iter().all(|d| *d == policy.max_delay));
    }

    #[test]
    fn test_rate_limit_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.rate_limit_delay_for(1), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_success_first_try_never_sleeps() {
        let clock = ManualClock::new();
        let result: Result<u32, TestError> =
            with_backoff(&RetryPolicy::default(), &clock, |_| async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_backoff_then_success() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let result = with_backoff(&RetryPolicy::default(), &clock, |attempt| {
            calls.set(calls.get() + 1);
            async move {
                if attempt < 2 {
                    Err(TestError::Broken)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.get(), 3);
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 2);
        assert_close(sleeps[0], 800);
        assert_close(sleeps[1], 1280);
    }

    #[tokio::test]
    async fn test_rate_limited_does_not_advance_backoff() {
        let clock = ManualClock::new();
        let result = with_backoff(&RetryPolicy::default(), &clock, |attempt| async move {
            match attempt {
                0 => Err(TestError::Limited),
                1 => Err(TestError::Broken),
                _ => Ok(()),
            }
        })
        .await;

        assert!(result.is_ok());
        let sleeps = clock.sleeps();
        assert_eq!(sleeps[0], Duration::from_secs(2));
        assert_close(sleeps[1], 800);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error_without_final_sleep() {
        let clock = ManualClock::new();
        let result: Result<(), TestError> =
            with_backoff(&RetryPolicy::default(), &clock, |attempt| async move {
                if attempt == 2 {
                    Err(TestError::Limited)
                } else {
                    Err(TestError::Broken)
                }
            })
            .await;

        assert!(matches!(result, Err(TestError::Limited)));
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let clock = ManualClock::new();
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        let calls = Cell::new(0);
        let result: Result<(), TestError> = with_backoff(&policy, &clock, |_| {
            calls.set(calls.get() + 1);
            async { Err(TestError::Broken) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
