//! Validated client configuration.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, instrument};

use super::constants::{
    DEFAULT_BASE_URL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};
use super::error::ApiError;
use super::rate_limiter::RateLimitConfig;
use super::retry::RetryPolicy;
use super::validation::{CONFIG, validate};

/// Immutable client configuration, produced once by [`ClientConfigBuilder::build`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use voe_core::api::ClientConfig;
///
/// let config = ClientConfig::builder("my-api-key")
///     .timeout(Duration::from_secs(10))
///     .retry_attempts(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url(), "https://voe.sx/api");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    rate_limit: RateLimitConfig,
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl ClientConfig {
    /// Starts a configuration for the given API key, with documented defaults.
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request transport timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of attempts per operation.
    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// Returns the retry backoff base delay.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the rate limiter parameters.
    #[must_use]
    pub fn rate_limit(&self) -> RateLimitConfig {
        self.rate_limit
    }

    /// Returns the retry policy described by this configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Clone)]
#[must_use]
pub struct ClientConfigBuilder {
    api_key: String,
    base_url: Option<String>,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    rate_limit: RateLimitConfig,
}

impl ClientConfigBuilder {
    /// Overrides the base URL (default `https://voe.sx/api`).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-request transport timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of attempts per operation (default 3).
    pub fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Sets the retry backoff base delay (default 1s).
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Overrides the rate limiter parameters.
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error when the
    /// API key is empty, the base URL is malformed, or any of the timeout,
    /// attempt count or delay is zero.
    #[instrument(skip(self))]
    pub fn build(self) -> Result<ClientConfig, ApiError> {
        validate(
            &CONFIG,
            &json!({
                "api_key": self.api_key,
                "base_url": self.base_url,
                "timeout": duration_millis(self.timeout),
                "retry_attempts": self.retry_attempts,
                "retry_delay": duration_millis(self.retry_delay),
            }),
        )?;

        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        debug!(base_url = %base_url, "client configuration validated");

        Ok(ClientConfig {
            api_key: self.api_key,
            base_url,
            timeout: self.timeout,
            retry_attempts: self.retry_attempts,
            retry_delay: self.retry_delay,
            rate_limit: self.rate_limit,
        })
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::builder("key").build().unwrap();
        assert_eq!(config.api_key(), "key");
        assert_eq!(config.base_url(), "https://voe.sx/api");
        assert_eq!(config.timeout(), Duration::from_millis(30_000));
        assert_eq!(config.retry_attempts(), 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.rate_limit(), RateLimitConfig::default());
    }

    #[test]
    fn test_config_empty_api_key_rejected() {
        let error = ClientConfig::builder("").build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.violations()[0].field, "api_key");
    }

    #[test]
    fn test_config_malformed_base_url_rejected() {
        let error = ClientConfig::builder("key")
            .base_url("voe.sx/api")
            .build()
            .unwrap_err();
        assert_eq!(error.violations()[0].field, "base_url");
    }

    #[test]
    fn test_config_zero_values_rejected() {
        let error = ClientConfig::builder("key")
            .timeout(Duration::ZERO)
            .retry_attempts(0)
            .retry_delay(Duration::ZERO)
            .build()
            .unwrap_err();
        let fields: Vec<_> = error.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["timeout", "retry_attempts", "retry_delay"]);
    }

    #[test]
    fn test_config_trailing_slash_trimmed() {
        let config = ClientConfig::builder("key")
            .base_url("http://localhost:8080/api/")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = ClientConfig::builder("super-secret").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_retry_policy() {
        let config = ClientConfig::builder("key")
            .retry_attempts(5)
            .retry_delay(Duration::from_millis(250))
            .build()
            .unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.base_delay(), Duration::from_millis(250));
    }
}
