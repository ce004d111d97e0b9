//! Retry with exponential backoff for page fetches

use std::time::Duration;

use crate::clock::Clock;
use crate::error::{FetchError, FetchOutcome};
use crate::rate_limit::RateLimiter;

/// Exponential backoff: 2^attempt seconds for zero-based attempt (1s, 2s, 4s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Attempt ceiling for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Run `attempt_fn` until it succeeds, fails terminally, or the ceiling is hit.
///
/// Every attempt goes through `limiter` first. Between attempts the limiter's
/// clock sleeps for [`backoff_duration`]; there is no sleep after the last
/// attempt. Exhaustion is reported as `Terminal(FetchError::Exhausted)`.
pub fn fetch_with_retry<T, C: Clock>(
    label: &str,
    policy: RetryPolicy,
    limiter: &mut RateLimiter<C>,
    mut attempt_fn: impl FnMut() -> FetchOutcome<T>,
) -> FetchOutcome<T> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        limiter.acquire();
        match attempt_fn() {
            FetchOutcome::Success(v) => return FetchOutcome::Success(v),
            FetchOutcome::Terminal(e) => {
                log::error!("{label}: {e}");
                return FetchOutcome::Terminal(e);
            }
            FetchOutcome::Retryable(e) => {
                attempt += 1;
                log::warn!("{label}: attempt {attempt}/{max_attempts} failed: {e}");
                if attempt >= max_attempts {
                    let exhausted = FetchError::Exhausted {
                        url: e.url().to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    };
                    log::error!("{label}: {exhausted}");
                    return FetchOutcome::Terminal(exhausted);
                }
                limiter.clock().sleep(backoff_duration(attempt - 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn server_error() -> FetchError {
        FetchError::Status {
            url: "https://api.test/works?cursor=*".to_string(),
            status: 500,
        }
    }

    #[test]
    fn backoff_exponential() {
        assert_eq!(backoff_duration(0), Duration::from_secs(1));
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
    }

    #[test]
    fn two_failures_then_success() {
        let clock = ManualClock::new();
        let mut limiter = RateLimiter::unlimited(clock.clone());
        let mut calls = 0;

        let out = fetch_with_retry("page", RetryPolicy::default(), &mut limiter, || {
            calls += 1;
            if calls < 3 {
                FetchOutcome::Retryable(server_error())
            } else {
                FetchOutcome::Success("third")
            }
        });

        assert_eq!(out.ok(), Some("third"));
        assert_eq!(calls, 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(limiter.requests(), 3);
    }

    #[test]
    fn exhaustion_is_terminal() {
        let clock = ManualClock::new();
        let mut limiter = RateLimiter::unlimited(clock.clone());
        let mut calls = 0;

        let out: FetchOutcome<()> =
            fetch_with_retry("page", RetryPolicy::default(), &mut limiter, || {
                calls += 1;
                FetchOutcome::Retryable(server_error())
            });

        assert_eq!(calls, 3);
        match out {
            FetchOutcome::Terminal(FetchError::Exhausted { attempts, url, .. }) => {
                assert_eq!(attempts, 3);
                assert_eq!(url, "https://api.test/works?cursor=*");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn terminal_stops_immediately() {
        let clock = ManualClock::new();
        let mut limiter = RateLimiter::unlimited(clock.clone());
        let mut calls = 0;

        let out: FetchOutcome<()> =
            fetch_with_retry("page", RetryPolicy::default(), &mut limiter, || {
                calls += 1;
                FetchOutcome::Terminal(server_error())
            });

        assert!(matches!(out, FetchOutcome::Terminal(_)));
        assert_eq!(calls, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn zero_ceiling_still_tries_once() {
        let mut limiter = RateLimiter::unlimited(ManualClock::new());
        let mut calls = 0;
        let _: FetchOutcome<()> = fetch_with_retry(
            "page",
            RetryPolicy { max_attempts: 0 },
            &mut limiter,
            || {
                calls += 1;
                FetchOutcome::Retryable(server_error())
            },
        );
        assert_eq!(calls, 1);
    }
}
