//! Error types for request logging.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RequestLogError>;

/// A string that does not have the request-identifier shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed request identifier: {0:?}")]
pub struct MalformedIdentifier(pub String);

#[derive(Debug, Error)]
pub enum RequestLogError {
    #[error(transparent)]
    Malformed(#[from] MalformedIdentifier),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking append task panicked or was cancelled.
    #[error("log writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
