//! Token counting for the outbound conversation.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::error::ContextError;

/// Counts model tokens in one message body.
pub trait TokenCount: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Token counter backed by tiktoken's `cl100k_base` encoding.
#[derive(Clone)]
pub struct TiktokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    pub fn cl100k() -> Result<Self, ContextError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| ContextError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenCount for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TiktokenCounter(cl100k_base)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_small_for_short_text() {
        let counter = TiktokenCounter::cl100k().unwrap();
        assert_eq!(counter.count(""), 0);
        let n = counter.count("hello world");
        assert!(n > 0 && n < 10, "got {n}");
    }
}
