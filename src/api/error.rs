//! Error types for the API module.
//!
//! Every failure surfaced by the client is an [`ApiError`]: a single struct
//! tagged with an [`ErrorKind`], carrying a human-readable message, the HTTP
//! status when one was received, and the raw response payload when the
//! server sent one.
//!
//! Transport failures are reported as [`TransportError`] and turned into an
//! [`ApiError`] by [`classify_transport`], which is the only place HTTP
//! outcomes are mapped onto the taxonomy.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use super::constants::{
    MSG_INVALID_RESPONSE, MSG_NETWORK_ERROR, MSG_NOT_FOUND, MSG_RATE_LIMIT_EXCEEDED,
    MSG_SERVER_ERROR, MSG_UNAUTHORIZED, MSG_VALIDATION_FAILED,
};

/// Classification of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing, malformed or rejected API key (HTTP 401).
    Authentication,
    /// Request rate exceeded, either by the local limiter or the server (HTTP 429).
    RateLimit,
    /// No response was received (connection failure, timeout).
    Network,
    /// Unexpected non-2xx status or an undecodable payload.
    Response,
    /// The requested file or folder does not exist.
    NotFound,
    /// Caller input failed validation before any request was sent.
    Validation,
    /// The server failed to process the request (HTTP 500).
    Server,
}

impl ErrorKind {
    /// Returns the stable code for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::RateLimit => "RATE_LIMIT_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Response => "RESPONSE_ERROR",
            Self::NotFound => "NOT_FOUND_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Server => "SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an error was raised.
///
/// A local rate limit rejection and a server-reported 429 share
/// [`ErrorKind::RateLimit`] but differ in retry eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Raised by the client before or instead of a network call.
    Local,
    /// Derived from a transport outcome.
    Remote,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Name of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl Violation {
    /// Creates a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A classified API failure.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    data: Option<Value>,
    origin: ErrorOrigin,
    violations: Vec<Violation>,
}

impl ApiError {
    fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            data: None,
            origin,
            violations: Vec::new(),
        }
    }

    fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Creates a server-reported authentication error.
    pub fn authentication(message: impl Into<String>, status: Option<u16>) -> Self {
        let mut error = Self::new(ErrorKind::Authentication, ErrorOrigin::Remote, message);
        error.status = status;
        error
    }

    /// Creates the error returned when the local limiter's hard cap is hit.
    #[must_use]
    pub fn rate_limit_local() -> Self {
        Self::new(
            ErrorKind::RateLimit,
            ErrorOrigin::Local,
            MSG_RATE_LIMIT_EXCEEDED,
        )
    }

    /// Creates a server-reported rate limit error.
    #[must_use]
    pub fn rate_limit_remote(status: u16) -> Self {
        Self::new(
            ErrorKind::RateLimit,
            ErrorOrigin::Remote,
            MSG_RATE_LIMIT_EXCEEDED,
        )
        .with_status(status)
    }

    /// Creates a network error (no response received).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, ErrorOrigin::Remote, message)
    }

    /// Creates an unexpected-response error carrying status and raw body.
    pub fn response(message: impl Into<String>, status: Option<u16>, data: Option<Value>) -> Self {
        let mut error =
            Self::new(ErrorKind::Response, ErrorOrigin::Remote, message).with_data(data);
        error.status = status;
        error
    }

    /// Creates an error for a payload that could not be decoded.
    pub fn invalid_response(detail: impl fmt::Display) -> Self {
        Self::response(format!("{MSG_INVALID_RESPONSE}: {detail}"), None, None)
    }

    /// Creates a not-found error for the named resource.
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::NotFound,
            ErrorOrigin::Remote,
            format!("{MSG_NOT_FOUND}: {resource}"),
        )
    }

    /// Creates a server error.
    #[must_use]
    pub fn server(status: u16) -> Self {
        Self::new(ErrorKind::Server, ErrorOrigin::Remote, MSG_SERVER_ERROR).with_status(status)
    }

    /// Creates a validation error listing every field-level violation.
    ///
    /// The violations are also serialized into [`data`](Self::data) so
    /// callers that only look at the payload still see them.
    #[must_use]
    pub fn validation(violations: Vec<Violation>) -> Self {
        let data = serde_json::to_value(&violations).ok();
        let detail = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let mut error = Self::new(
            ErrorKind::Validation,
            ErrorOrigin::Local,
            format!("{MSG_VALIDATION_FAILED}: {detail}"),
        )
        .with_status(400)
        .with_data(data);
        error.violations = violations;
        error
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if one is associated with this error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the raw response payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Returns where the error was raised.
    #[must_use]
    pub fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    /// Returns field-level violations (empty unless this is a validation error).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns whether retrying the same request could change the outcome.
    ///
    /// Authentication and validation failures are never retried. A rate limit
    /// rejection from the local limiter is not retried either: the window it
    /// was checked against is still full.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::Authentication | ErrorKind::Validation => false,
            ErrorKind::RateLimit => self.origin == ErrorOrigin::Remote,
            ErrorKind::Network | ErrorKind::Response | ErrorKind::NotFound | ErrorKind::Server => {
                true
            }
        }
    }
}

/// Failure reported by a [`Transport`](super::Transport).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("no response received: {message}")]
    NoResponse {
        /// Description of the underlying failure.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, as JSON when it parsed, otherwise as a string.
        body: Option<Value>,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("undecodable response body (HTTP {status}): {message}")]
    Decode {
        /// The HTTP status code.
        status: u16,
        /// The decoder error.
        message: String,
    },
}

impl TransportError {
    /// Creates a no-response error.
    pub fn no_response(message: impl Into<String>) -> Self {
        Self::NoResponse {
            message: message.into(),
        }
    }
}

/// Maps an HTTP error status and its body onto the error taxonomy.
///
/// | Status | Kind |
/// |--------|------|
/// | 401 | Authentication |
/// | 429 | RateLimit |
/// | 500 | Server |
/// | other | Response (status and body preserved) |
#[must_use]
#[instrument(skip(body))]
pub fn classify_status(status: u16, body: Option<Value>) -> ApiError {
    match status {
        401 => ApiError::authentication(MSG_UNAUTHORIZED, Some(status)),
        429 => ApiError::rate_limit_remote(status),
        500 => ApiError::server(status),
        _ => ApiError::response(
            format!("request failed with status code {status}"),
            Some(status),
            body,
        ),
    }
}

/// Maps any transport outcome onto the error taxonomy.
#[must_use]
pub fn classify_transport(error: TransportError) -> ApiError {
    match error {
        TransportError::NoResponse { message } => {
            ApiError::network(format!("{MSG_NETWORK_ERROR}: {message}"))
        }
        TransportError::Status { status, body } => classify_status(status, body),
        TransportError::Decode { status, message } => ApiError::response(
            format!("{MSG_INVALID_RESPONSE}: {message}"),
            Some(status),
            None,
        ),
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        classify_transport(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_401_is_authentication() {
        let error = classify_status(401, None);
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.status(), Some(401));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_classify_429_is_remote_rate_limit() {
        let error = classify_status(429, None);
        assert_eq!(error.kind(), ErrorKind::RateLimit);
        assert_eq!(error.origin(), ErrorOrigin::Remote);
        assert_eq!(error.status(), Some(429));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_classify_500_is_server() {
        let error = classify_status(500, None);
        assert_eq!(error.kind(), ErrorKind::Server);
        assert_eq!(error.status(), Some(500));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_classify_other_status_is_response_with_body() {
        let body = json!({"msg": "I'm a teapot"});
        let error = classify_status(418, Some(body.clone()));
        assert_eq!(error.kind(), ErrorKind::Response);
        assert_eq!(error.status(), Some(418));
        assert_eq!(error.data(), Some(&body));
        assert!(error.message().contains("418"));
    }

    #[test]
    fn test_classify_404_stays_response() {
        assert_eq!(classify_status(404, None).kind(), ErrorKind::Response);
    }

    #[test]
    fn test_classify_502_is_response_not_server() {
        assert_eq!(classify_status(502, None).kind(), ErrorKind::Response);
    }

    #[test]
    fn test_classify_no_response_is_network() {
        let error = classify_transport(TransportError::no_response("connection refused"));
        assert_eq!(error.kind(), ErrorKind::Network);
        assert_eq!(error.status(), None);
        assert!(error.message().contains("connection refused"));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_classify_decode_is_response() {
        let error = ApiError::from(TransportError::Decode {
            status: 200,
            message: "expected value".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::Response);
        assert_eq!(error.status(), Some(200));
    }

    #[test]
    fn test_local_rate_limit_is_not_retryable() {
        let error = ApiError::rate_limit_local();
        assert_eq!(error.kind(), ErrorKind::RateLimit);
        assert_eq!(error.origin(), ErrorOrigin::Local);
        assert_eq!(error.status(), None);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_validation_error_carries_violations() {
        let error = ApiError::validation(vec![
            Violation::new("api_key", "API key is required"),
            Violation::new("timeout", "must be a positive number"),
        ]);
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.violations().len(), 2);
        assert!(!error.is_retryable());

        let data = error.data().unwrap();
        assert_eq!(data[0]["field"], "api_key");
        assert_eq!(data[1]["field"], "timeout");
        assert!(error.to_string().contains("VALIDATION_ERROR"));
        assert!(error.to_string().contains("timeout: must be a positive number"));
    }

    #[test]
    fn test_not_found_is_retryable_and_names_resource() {
        let error = ApiError::not_found("file abc123");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.message().contains("abc123"));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::Authentication.to_string(), "AUTHENTICATION_ERROR");
        assert_eq!(ErrorKind::RateLimit.as_str(), "RATE_LIMIT_ERROR");
        assert_eq!(ErrorKind::Server.as_str(), "SERVER_ERROR");
    }
}
