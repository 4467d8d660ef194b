//! System prompts and per-question instructor notes on disk.
//!
//! Layout:
//! - `{prompt_dir}/{label}.txt`: system prompt, may contain `%NOTE%`
//! - `{notes_dir}/HW{hw}_Q{question}.txt`: optional note spliced into `%NOTE%`
//!
//! Labels are sanitized to `[A-Za-z0-9_]` before touching the filesystem.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ContextError;

/// Placeholder in prompt files replaced by the question note.
pub const NOTE_PLACEHOLDER: &str = "%NOTE%";

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Reads prompts and notes from their configured directories.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    prompt_dir: PathBuf,
    notes_dir: PathBuf,
}

impl PromptLibrary {
    pub fn new(prompt_dir: impl Into<PathBuf>, notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt_dir: prompt_dir.into(),
            notes_dir: notes_dir.into(),
        }
    }

    /// Raw prompt text for `label`.
    ///
    /// # Errors
    /// [`ContextError::PromptMissing`] if no such prompt file exists.
    pub async fn prompt(&self, label: &str) -> Result<String, ContextError> {
        let path = self
            .prompt_dir
            .join(format!("{}.txt", sanitize_label(label)));
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ContextError::PromptMissing {
                label: label.to_string(),
                path,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Instructor note for a question; `None` when there is none on disk.
    pub async fn note(&self, hw: u32, question: u32) -> Result<Option<String>, ContextError> {
        let label = sanitize_label(&format!("HW{hw}_Q{question}"));
        let path = self.notes_dir.join(format!("{label}.txt"));
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no note for question");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Prompt for `label` with the question note (or nothing) in place of
    /// the first `%NOTE%`. A missing question number reads the `Q0` note.
    pub async fn system_prompt(
        &self,
        label: &str,
        hw: u32,
        question: Option<u32>,
    ) -> Result<String, ContextError> {
        let prompt = self.prompt(label).await?;
        let note = self
            .note(hw, question.unwrap_or(0))
            .await?
            .unwrap_or_default();
        Ok(prompt.replacen(NOTE_PLACEHOLDER, &note, 1))
    }
}
