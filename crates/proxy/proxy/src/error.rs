//! Proxy error types.

use gateway_harness_core::HarnessError;
use thiserror::Error;

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Error type for outbound provider calls.
///
/// None of these reach the browser as an HTTP failure from the API proxy;
/// they are folded into the exception sentinel response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The verb is not a valid HTTP method.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// `domain + path` is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network-level failure (DNS, TLS, connection refused).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The upstream call did not finish in time.
    #[error("Request timeout")]
    Timeout,

    /// The upstream declared JSON but sent something else.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Missing or invalid configuration.
    #[error(transparent)]
    Configuration(#[from] HarnessError),
}

impl ProxyError {
    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidMethod(_) | Self::InvalidUrl(_) | Self::InvalidRequest(_) => 400,
            Self::Timeout => 504,
            Self::Transport(_) | Self::InvalidBody(_) => 502,
            Self::Configuration(_) => 503,
            Self::Client(_) => 500,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout
        } else if err.is_decode() {
            ProxyError::InvalidBody(err.to_string())
        } else if err.is_builder() {
            ProxyError::InvalidRequest(err.to_string())
        } else {
            ProxyError::Transport(err.to_string())
        }
    }
}
