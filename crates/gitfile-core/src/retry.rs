//! Deadline-bounded retry envelope
//!
//! An attempt classifies each failure where it happens: `.permanent()`
//! aborts the envelope, `.retryable()` waits with exponential backoff and
//! tries again until the deadline. On exhaustion the last error is returned.

use std::cell::Cell;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::diagnostics::Operation;
use crate::{Error, Result};

/// Outcome of a single attempt.
pub type Attempt<T> = std::result::Result<T, backoff::Error<Error>>;

/// Backoff shape; the deadline is supplied per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(30),
            multiplier: 1.5,
            randomization_factor: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Constant short interval, for tests and local remotes.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            randomization_factor: 0.0,
        }
    }
}

/// Mark a step's failure as permanent or retryable.
pub trait Classify<T> {
    fn permanent(self) -> Attempt<T>;
    fn retryable(self) -> Attempt<T>;
}

impl<T, E: Into<Error>> Classify<T> for std::result::Result<T, E> {
    fn permanent(self) -> Attempt<T> {
        self.map_err(|e| backoff::Error::permanent(e.into()))
    }

    fn retryable(self) -> Attempt<T> {
        self.map_err(|e| backoff::Error::transient(e.into()))
    }
}

/// Run `attempt` until it succeeds, fails permanently, or `deadline` elapses.
pub fn retry_until<T>(
    policy: &RetryPolicy,
    deadline: Duration,
    operation: Operation,
    mut attempt: impl FnMut() -> Attempt<T>,
) -> Result<T> {
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_interval)
        .with_max_interval(policy.max_interval)
        .with_multiplier(policy.multiplier)
        .with_randomization_factor(policy.randomization_factor)
        .with_max_elapsed_time(Some(deadline))
        .build();

    let attempts = Cell::new(0u32);
    let result = backoff::retry_notify(
        backoff,
        || {
            attempts.set(attempts.get() + 1);
            attempt()
        },
        |err: Error, wait: Duration| {
            tracing::warn!(
                operation = %operation,
                attempt = attempts.get(),
                retry_in = ?wait,
                error = %err,
                "Transient failure, retrying"
            );
        },
    );

    result.map_err(|e| match e {
        backoff::Error::Permanent(err) => err,
        backoff::Error::Transient { err, .. } => {
            tracing::warn!(
                operation = %operation,
                attempts = attempts.get(),
                error = %err,
                "Deadline reached, giving up"
            );
            err
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_error(n: u32) -> gitfile_git::Error {
        gitfile_git::Error::PushFailed {
            message: format!("attempt {n} failed"),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(1))
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let value = retry_until(&policy(), Duration::from_secs(5), Operation::Create, || {
            calls += 1;
            if calls <= 3 {
                Err(push_error(calls)).retryable()
            } else {
                Ok("pushed")
            }
        })
        .unwrap();

        assert_eq!(value, "pushed");
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let mut calls = 0;
        let err = retry_until(&policy(), Duration::from_secs(5), Operation::Update, || {
            calls += 1;
            Err::<(), _>(Error::FileNotFound { path: "a".into() }).permanent()
        })
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_deadline_surfaces_last_error() {
        let mut calls = 0;
        let err = retry_until(&policy(), Duration::from_millis(50), Operation::Delete, || {
            calls += 1;
            Err::<(), _>(push_error(calls)).retryable()
        })
        .unwrap_err();

        assert!(calls > 1);
        assert_eq!(err.to_string(), format!("Push failed: attempt {calls} failed"));
    }
}
