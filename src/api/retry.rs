//! Retry logic with linear backoff for transient API failures.
//!
//! This module provides [`RetryPolicy`], [`RetryDecision`] and [`with_retry`].
//!
//! # Overview
//!
//! Each top-level call owns a fresh [`RetryState`] and moves through:
//!
//! ```text
//! Attempting(n) ── ok ──────────────────────────────▶ Success
//!      │
//!      └─ err ─┬─ retryable, n < max ── sleep(base * n) ─▶ Attempting(n + 1)
//!              ├─ retryable, n = max ───────────────────▶ Failed(last error)
//!              └─ not retryable ────────────────────────▶ Failed(error)
//! ```
//!
//! Retryability is decided by [`ApiError::is_retryable`]: authentication and
//! validation errors fail on first occurrence, as does a rejection from the
//! local rate limiter. Backoff is linear, not exponential: the delay before
//! attempt `n + 1` is `base_delay * n`.
//!
//! # Example
//!
//! ```
//! use voe_core::api::{RetryDecision, RetryPolicy, classify_status};
//!
//! let policy = RetryPolicy::default();
//! let error = classify_status(500, None);
//!
//! match policy.should_retry(&error, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::Fail { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use super::error::ApiError;

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Surface the error to the caller.
    Fail {
        /// Human-readable reason why no retry is attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with linear backoff.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `base_delay`: 1 second
///
/// With defaults, a persistently failing call waits 1s, then 2s, then gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay unit; the wait after attempt `n` is `base_delay * n`.
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy.
    ///
    /// `max_attempts` includes the initial attempt and is raised to 1 if zero.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Creates a policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff base delay.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Decides what follows the failure of attempt `attempt` (1-indexed).
    #[instrument(skip(self, error), fields(kind = %error.kind(), max_attempts = self.max_attempts))]
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::Fail {
                reason: format!("{} errors are not retried", error.kind()),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, "max attempts reached");
            return RetryDecision::Fail {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay_after(attempt),
            attempt: attempt + 1,
        }
    }

    /// Linear backoff: `base_delay * attempt`.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Per-call retry bookkeeping.
///
/// Created fresh for each top-level call and dropped when it resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    delays: Vec<Duration>,
}

impl RetryState {
    /// Creates a state positioned before the first attempt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current attempt number (1-indexed, 0 before the first attempt).
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the backoff delays waited so far, in order.
    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    fn record_delay(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}

/// Runs `operation` under `policy`, retrying retryable failures.
///
/// Only the final outcome is returned; intermediate failures are logged.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last error once
/// `max_attempts` attempts have failed.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    with_retry_state(policy, &mut RetryState::new(), operation).await
}

/// Like [`with_retry`], recording progress into a caller-supplied [`RetryState`].
///
/// # Errors
///
/// Same as [`with_retry`].
pub async fn with_retry_state<T, F, Fut>(
    policy: &RetryPolicy,
    state: &mut RetryState,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    loop {
        let attempt = state.begin_attempt();

        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        match policy.should_retry(&error, attempt) {
            RetryDecision::Retry { delay, attempt: next } => {
                warn!(
                    attempt,
                    next_attempt = next,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "attempt failed - retrying"
                );
                state.record_delay(delay);
                tokio::time::sleep(delay).await;
            }
            RetryDecision::Fail { reason } => {
                debug!(attempt, reason = %reason, error = %error, "giving up");
                return Err(error);
            }
        }
    }
}
