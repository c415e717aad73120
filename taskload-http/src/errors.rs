//! HTTP error types

use crate::types::HttpMethodError;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HttpError::Timeout(error)
        } else if error.is_connect() {
            HttpError::ConnectionFailed(error.to_string())
        } else if error.is_builder() {
            HttpError::InvalidUrl(error.to_string())
        } else {
            HttpError::NetworkError(error)
        }
    }
}

impl HttpError {
    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::NetworkError(_) | HttpError::Timeout(_) | HttpError::ConnectionFailed(_)
        )
    }
}
