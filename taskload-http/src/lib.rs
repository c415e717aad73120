//! HTTP client functionality for taskload
//!
//! This crate provides the timed request/response types the workload driver
//! asserts on, a `reqwest`-backed client, and (behind the `mock` feature) a
//! scripted client for tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export main types for convenience
pub use client::{HttpClient, ReqwestClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError, HttpRequest, TimedResponse};

#[cfg(feature = "mock")]
pub use mock::{MockHttpClient, MockReply};
