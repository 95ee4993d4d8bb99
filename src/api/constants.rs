//! Constants for the API module (endpoint defaults, rate limiting, messages).

use std::time::Duration;

/// Default base URL of the VOE API.
pub const DEFAULT_BASE_URL: &str = "https://voe.sx/api";

/// Default per-request transport timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default number of attempts per operation, including the first one.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default base delay for linear retry backoff (1 second).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Target steady request rate for one client.
pub const RATE_LIMIT_REQUESTS_PER_SECOND: u32 = 3;

/// Hard cap on requests admitted within one window.
pub const RATE_LIMIT_MAX_REQUESTS: usize = 4;

/// Length of the trailing rate limit window.
pub const RATE_LIMIT_TIME_WINDOW: Duration = Duration::from_millis(1000);

/// Query parameter carrying the API key on every request.
pub const API_KEY_PARAM: &str = "key";

pub(crate) const MSG_MISSING_API_KEY: &str = "API key is required";
pub(crate) const MSG_RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";
pub(crate) const MSG_NETWORK_ERROR: &str = "Network error occurred";
pub(crate) const MSG_INVALID_RESPONSE: &str = "Invalid response from server";
pub(crate) const MSG_NOT_FOUND: &str = "Resource not found";
pub(crate) const MSG_UNAUTHORIZED: &str = "Unauthorized request";
pub(crate) const MSG_SERVER_ERROR: &str = "Server error occurred";
pub(crate) const MSG_VALIDATION_FAILED: &str = "Validation failed";
