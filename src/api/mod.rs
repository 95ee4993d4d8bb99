//! VOE file-hosting API client.
//!
//! Every call made through [`VoeClient`] runs through the same
//! [`RequestPipeline`]:
//!
//! 1. parameters are checked by [`validation`] before anything is sent;
//! 2. each attempt takes a slot from the client's sliding-window
//!    [`RateLimiter`];
//! 3. the request goes out through a [`Transport`] ([`HttpTransport`] by
//!    default);
//! 4. failures are mapped onto [`ErrorKind`] by [`classify_transport`] and
//!    judged by the linear-backoff [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use voe_core::api::{ClientConfig, VoeClient};
//!
//! # async fn example() -> Result<(), voe_core::api::ApiError> {
//! let client = VoeClient::new(ClientConfig::builder("my-api-key").build()?)?;
//! let files = client.file_info(&["abc123", "def456"]).await?;
//! for file in files {
//!     println!("{} {}", file.file_code, file.title);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod constants;
mod endpoints;
mod error;
mod pipeline;
mod rate_limiter;
mod retry;
mod transport;
pub mod types;
pub mod validation;

pub use client::VoeClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use constants::{
    API_KEY_PARAM, DEFAULT_BASE_URL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
    RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_REQUESTS_PER_SECOND, RATE_LIMIT_TIME_WINDOW,
};
pub use endpoints::Endpoint;
pub use error::{
    ApiError, ErrorKind, ErrorOrigin, TransportError, Violation, classify_status,
    classify_transport,
};
pub use pipeline::RequestPipeline;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use retry::{RetryDecision, RetryPolicy, RetryState, with_retry, with_retry_state};
pub use transport::{HttpTransport, Method, Operation, Request, Transport, Upload};
