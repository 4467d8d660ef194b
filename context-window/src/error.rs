//! Typed error for the context-window crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    /// Prompt file for the requested label does not exist.
    #[error("prompt `{label}` not found at {}", path.display())]
    PromptMissing { label: String, path: PathBuf },

    /// No course questions are known for this homework.
    #[error("no questions known for homework `{0}`")]
    UnknownHomework(String),

    /// Tokenizer could not be initialized.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Course data files are not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
