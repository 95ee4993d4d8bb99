//! VOE Client Library
//!
//! This library wraps the VOE file-hosting HTTP API: account details,
//! direct and remote uploads, file and folder management, deletion and DMCA
//! history, and premium key generation.
//!
//! # Architecture
//!
//! All functionality lives in [`api`]:
//! - [`api::VoeClient`] - one async method per API operation
//! - [`api::RequestPipeline`] - validate, then retry { rate limit, send, classify }
//! - [`api::RateLimiter`] - per-client sliding-window gate
//! - [`api::RetryPolicy`] - linear backoff over classified errors
//! - [`api::Transport`] - the HTTP boundary, reqwest-backed by default
//!
//! The `voe` binary built from this crate exposes every operation as a
//! subcommand.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;

// Re-export commonly used types
pub use api::{
    ApiError, ClientConfig, ErrorKind, HttpTransport, RateLimitConfig, RateLimiter,
    RequestPipeline, RetryPolicy, Transport, VoeClient,
};
