//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the policy delay then tries again.
/// Blocks the current thread; call from `spawn_blocking` in async code.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, error = %e, "retrying after {:?}", d);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn retries_5xx_until_success() {
        let policy = RetryPolicy::with_retries(2, Duration::ZERO);
        let mut calls = 0;
        let res = run_with_retry(&policy, || {
            calls += 1;
            if calls < 3 {
                Err(FetchError::Http(502))
            } else {
                Ok("page")
            }
        });
        assert_eq!(res.unwrap(), "page");
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::with_retries(1, Duration::ZERO);
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&policy, || {
            calls += 1;
            Err(FetchError::Http(500))
        });
        assert!(matches!(res, Err(FetchError::Http(500))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn does_not_retry_404() {
        let policy = RetryPolicy::with_retries(5, Duration::ZERO);
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&policy, || {
            calls += 1;
            Err(FetchError::Http(404))
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }
}
