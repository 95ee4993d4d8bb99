//! Request pipeline: validate, then retry { rate limit, send, classify }.
//!
//! The pipeline is stateless between invocations apart from the shared
//! [`RateLimiter`]. Every operation goes through the same steps:
//!
//! 1. Validate parameters against the operation's schema. A failure here is
//!    returned immediately; no slot is taken and nothing is retried.
//! 2. Enter the retry loop. Each attempt acquires a rate limit slot (which
//!    may throttle or reject), sends the request, and classifies a failure
//!    into an [`ApiError`] for the retry policy to judge.
//! 3. Decode the success payload.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::ApiError;
use super::rate_limiter::RateLimiter;
use super::retry::{RetryPolicy, with_retry};
use super::transport::{Operation, Request, Transport};
use super::types::ApiResponse;
use super::validation::{Params, validate};

/// Composes validation, rate limiting, transport and retry.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl RequestPipeline {
    /// Creates a pipeline over `transport`, sharing `limiter` with every clone.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            limiter,
            retry,
        }
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Validates `operation` into a transport request.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error when the
    /// parameters do not match the operation's schema.
    pub fn prepare(operation: Operation) -> Result<Request, ApiError> {
        let query = match operation.schema() {
            Some(schema) => validate(schema, operation.params())?,
            None => Params::from_object(operation.params()),
        };
        Ok(Request {
            method: operation.method(),
            endpoint: operation.endpoint().to_string(),
            query,
            upload: operation.upload().cloned(),
        })
    }

    /// Runs `operation` and returns the raw JSON body.
    ///
    /// # Errors
    ///
    /// Returns the validation error, the first non-retryable error, or the
    /// last error after the retry policy gave up.
    #[instrument(
        skip(self, operation),
        fields(method = %operation.method(), endpoint = %operation.endpoint())
    )]
    pub async fn send(&self, operation: Operation) -> Result<Value, ApiError> {
        let request = Self::prepare(operation)?;
        with_retry(&self.retry, || self.attempt(&request)).await
    }

    /// Runs `operation` and decodes the whole body as `T`.
    ///
    /// Used for responses that are not wrapped in the standard envelope.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus a
    /// [`Response`](super::ErrorKind::Response) error when the body does not
    /// decode as `T`.
    pub async fn execute_raw<T: DeserializeOwned>(
        &self,
        operation: Operation,
    ) -> Result<T, ApiError> {
        let body = self.send(operation).await?;
        serde_json::from_value(body).map_err(ApiError::invalid_response)
    }

    /// Runs `operation` and extracts the envelope's `result`.
    ///
    /// # Errors
    ///
    /// Same as [`execute_raw`](Self::execute_raw).
    pub async fn execute_optional<T: DeserializeOwned>(
        &self,
        operation: Operation,
    ) -> Result<Option<T>, ApiError> {
        let envelope: ApiResponse<T> = self.execute_raw(operation).await?;
        if !envelope.success {
            warn!(
                status = envelope.status,
                msg = %envelope.msg,
                "envelope reports failure on a 2xx response"
            );
        }
        Ok(envelope.result)
    }

    /// Runs `operation` and extracts the envelope's `result`, treating a
    /// missing result as the empty value of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`execute_raw`](Self::execute_raw).
    pub async fn execute<T: DeserializeOwned + Default>(
        &self,
        operation: Operation,
    ) -> Result<T, ApiError> {
        let result = self.execute_optional(operation).await?;
        if result.is_none() {
            debug!("envelope has no result - using empty value");
        }
        Ok(result.unwrap_or_default())
    }

    async fn attempt(&self, request: &Request) -> Result<Value, ApiError> {
        self.limiter.acquire().await?;
        self.transport.send(request).await.map_err(ApiError::from)
    }
}
