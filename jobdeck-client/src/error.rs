//! Error types for the CI engine client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the CI engine
///
/// The three outcomes callers branch on are kept apart: a request that
/// never got a response ([`RequestFailed`](Self::RequestFailed)), a
/// non-2xx status ([`ApiError`](Self::ApiError)), and a well-formed body
/// reporting `success: false` ([`Application`](Self::Application)).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, timeout or other network failure
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// 2xx response whose body reports `success: false`
    #[error("{0}")]
    Application(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this error is an application-level `success: false`
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    /// Whether retrying the same request could succeed
    ///
    /// Network failures and 5xx statuses may be transient. Application
    /// failures are authoritative and never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::ApiError { .. } => self.is_server_error(),
            Self::Application(_) | Self::ParseError(_) | Self::InvalidRequest(_) => false,
        }
    }
}
