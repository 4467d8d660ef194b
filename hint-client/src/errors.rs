use std::time::Duration;

use thiserror::Error;

/// Result alias for the client crate.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No editor is focused, so there is nothing to ask about.
    #[error("no active editor")]
    NoActiveContext,

    /// The file name does not carry a homework number.
    #[error("Could not find hw number in file name...did you rename your file?")]
    UnresolvableUnit { file_name: String },

    #[error("Timed out after {} seconds", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("history store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
