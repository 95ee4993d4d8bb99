//! Sliding-window rate limiting for API requests.
//!
//! This module provides the [`RateLimiter`] struct which bounds the number of
//! requests a client issues within a trailing time window.
//!
//! # Overview
//!
//! The limiter keeps the timestamps of recently admitted requests. Before
//! every request it drops the timestamps that fell out of the window, then:
//!
//! - rejects the request with a local [`ErrorKind::RateLimit`] error when the
//!   window already holds `max_requests` entries (hard cap), or
//! - records the request, and when that fills the window, sleeps until the
//!   oldest entry expires so the *next* caller finds room.
//!
//! One limiter is owned by each client and shared by every operation it
//! issues; independently configured clients never share a window.
//!
//! # Example
//!
//! ```
//! use voe_core::api::{RateLimitConfig, RateLimiter};
//!
//! # async fn example() -> Result<(), voe_core::api::ApiError> {
//! let limiter = RateLimiter::new(RateLimitConfig::default());
//!
//! // First three requests in a window proceed immediately
//! limiter.acquire().await?;
//! limiter.acquire().await?;
//! limiter.acquire().await?;
//!
//! // The fourth fills the window and waits for the oldest entry to expire
//! limiter.acquire().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ErrorKind::RateLimit`]: super::ErrorKind::RateLimit

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::constants::{
    RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_REQUESTS_PER_SECOND, RATE_LIMIT_TIME_WINDOW,
};
use super::error::ApiError;

/// Rate limit parameters for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Steady request rate the window sizing aims for.
    pub requests_per_second: u32,
    /// Hard cap on requests admitted within one window.
    pub max_requests: usize,
    /// Length of the trailing window.
    pub time_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: RATE_LIMIT_REQUESTS_PER_SECOND,
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            time_window: RATE_LIMIT_TIME_WINDOW,
        }
    }
}

/// Sliding-window request limiter.
///
/// Designed to be wrapped in `Arc` and shared by every operation of one
/// client. The purge-check-record sequence runs under a mutex so the window
/// invariant holds for concurrently issued operations; the lock is never
/// held across the throttling sleep.
///
/// # Invariant
///
/// At any instant, the number of recorded timestamps within the trailing
/// `time_window` is at most `max_requests`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,

    /// Whether rate limiting is disabled.
    disabled: bool,

    /// Admission timestamps, oldest first.
    window: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimiter {
    /// Creates an empty limiter with the given parameters.
    ///
    /// A `max_requests` of zero is raised to one so the limiter can admit
    /// anything at all.
    #[must_use]
    #[instrument(skip_all, fields(
        max_requests = config.max_requests,
        window_ms = config.time_window.as_millis()
    ))]
    pub fn new(config: RateLimitConfig) -> Self {
        debug!("creating rate limiter");
        let config = RateLimitConfig {
            max_requests: config.max_requests.max(1),
            ..config
        };
        Self {
            config,
            disabled: false,
            window: Mutex::new(VecDeque::with_capacity(config.max_requests)),
        }
    }

    /// Creates a disabled limiter that admits everything without delay.
    #[must_use]
    #[instrument]
    pub fn disabled() -> Self {
        debug!("creating disabled rate limiter");
        Self {
            config: RateLimitConfig::default(),
            disabled: true,
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns whether rate limiting is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the limiter parameters.
    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Returns how many recorded requests fall within the trailing window.
    #[must_use]
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        let window = self.lock_window();
        window
            .iter()
            .filter(|&&stamp| now.duration_since(stamp) < self.config.time_window)
            .count()
    }

    /// Forgets every recorded request.
    pub fn clear(&self) {
        self.lock_window().clear();
    }

    /// Acquires a slot for one request.
    ///
    /// Returns immediately when the window has room to spare. When this
    /// request fills the window, sleeps until the oldest recorded request
    /// leaves it before returning.
    ///
    /// # Errors
    ///
    /// Returns a local [`ErrorKind::RateLimit`](super::ErrorKind::RateLimit)
    /// error, without recording anything, when the window is already full.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<(), ApiError> {
        if self.disabled {
            return Ok(());
        }

        let wait = self.admit(Instant::now())?;

        if let Some(wait) = wait {
            debug!(wait_ms = wait.as_millis(), "window full - throttling");
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }

    /// Runs the purge-check-record step at `now`.
    ///
    /// Returns the throttling delay owed when this admission filled the window.
    fn admit(&self, now: Instant) -> Result<Option<Duration>, ApiError> {
        let time_window = self.config.time_window;
        let max_requests = self.config.max_requests;
        let mut window = self.lock_window();

        // The window is half-open: a stamp exactly `time_window` old has expired.
        while window
            .front()
            .is_some_and(|&oldest| now.duration_since(oldest) >= time_window)
        {
            window.pop_front();
        }

        if window.len() >= max_requests {
            warn!(
                in_window = window.len(),
                max_requests, "rate limit hard cap reached - rejecting request"
            );
            return Err(ApiError::rate_limit_local());
        }

        window.push_back(now);

        if window.len() < max_requests {
            return Ok(None);
        }

        let oldest = window.front().copied().unwrap_or(now);
        let wait = time_window.saturating_sub(now.duration_since(oldest));
        Ok((!wait.is_zero()).then_some(wait))
    }

    fn lock_window(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        // The guarded section never panics midway, so a poisoned window is still consistent.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::task::JoinSet;

    use super::*;
    use crate::api::{ErrorKind, ErrorOrigin};

    const WINDOW: Duration = Duration::from_millis(1000);

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig::default())
    }

    fn recorded(limiter: &RateLimiter) -> Vec<Instant> {
        limiter.lock_window().iter().copied().collect()
    }

    // ==================== Construction ====================

    #[test]
    fn test_rate_limiter_default_config() {
        let limiter = RateLimiter::default();
        let config = limiter.config();
        assert_eq!(config.requests_per_second, 3);
        assert_eq!(config.max_requests, 4);
        assert_eq!(config.time_window, WINDOW);
        assert!(!limiter.is_disabled());
    }

    #[test]
    fn test_rate_limiter_zero_max_requests_raised_to_one() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 0,
            ..RateLimitConfig::default()
        });
        assert_eq!(limiter.config().max_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_disabled_never_delays_or_rejects() {
        let limiter = RateLimiter::disabled();
        let start = Instant::now();

        for _ in 0..20 {
            limiter.acquire().await.unwrap();
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window(), 0);
    }

    // ==================== Admission ====================

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_requests_below_cap_are_immediate() {
        let limiter = limiter();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_filling_window_delays_until_oldest_expires() {
        let limiter = limiter();
        let first = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }
        tokio::time::advance(Duration::from_millis(200)).await;

        // Window holds max - 1; this admission succeeds and owes window - (now - oldest)
        let start = Instant::now();
        limiter.acquire().await.unwrap();
        let waited = start.elapsed();

        assert!(waited >= Duration::from_millis(800), "waited {waited:?}");
        assert!(waited < Duration::from_millis(810), "waited {waited:?}");
        assert!(first.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_full_window_rejects_without_mutation() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..4 {
            limiter.admit(now).unwrap();
        }
        let before = recorded(&limiter);

        let start = Instant::now();
        let error = limiter.acquire().await.unwrap_err();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(error.kind(), ErrorKind::RateLimit);
        assert_eq!(error.origin(), ErrorOrigin::Local);
        assert_eq!(recorded(&limiter), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_expired_entries_are_purged() {
        let limiter = limiter();
        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }

        tokio::time::advance(WINDOW).await;

        // Entries exactly one window old have expired
        let start = Instant::now();
        limiter.acquire().await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(recorded(&limiter).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_sequential_callers_are_throttled_not_rejected() {
        let limiter = limiter();
        let start = Instant::now();

        for _ in 0..12 {
            limiter.acquire().await.unwrap();
        }

        // Every fourth admission waits out the window
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_clear_empties_window() {
        let limiter = limiter();
        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();

        limiter.clear();

        assert_eq!(limiter.in_window(), 0);
    }

    // ==================== Invariant ====================

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_window_invariant_holds_under_simulated_clock() {
        let limiter = limiter();
        let steps = [0, 50, 0, 120, 300, 0, 0, 10, 700, 999, 1, 0, 250, 0, 0, 0, 1500, 30];

        for step in steps {
            tokio::time::advance(Duration::from_millis(step)).await;
            let _ = limiter.acquire().await;
            assert!(limiter.in_window() <= 4, "window overflow after step {step}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_concurrent_burst_respects_hard_cap() {
        let limiter = Arc::new(limiter());
        let mut tasks = JoinSet::new();

        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                let result = limiter.acquire().await;
                assert!(limiter.in_window() <= 4);
                result
            });
        }

        let mut admitted = 0;
        let mut rejected = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(()) => admitted += 1,
                Err(error) => {
                    assert_eq!(error.kind(), ErrorKind::RateLimit);
                    rejected += 1;
                }
            }
        }

        assert_eq!(admitted, 4);
        assert_eq!(rejected, 6);
    }
}
