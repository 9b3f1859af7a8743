//! Engine error types

use jobdeck_client::ClientError;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by engine operations
///
/// Every failure is scoped to the one operation that produced it.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, non-2xx status or malformed body
    #[error("Could not reach the CI engine: {0}")]
    Transport(ClientError),

    /// The engine answered `success: false`; the message is passed through
    #[error("{0}")]
    Application(String),

    /// Rejected locally before any request was sent
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No such job or execution in the current snapshot
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Application(message) => Error::Application(message),
            other => Error::Transport(other),
        }
    }
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether running the same operation again could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_retryable())
    }
}
