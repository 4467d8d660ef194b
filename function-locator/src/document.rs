//! In-memory text document addressed by `(line, character)`.

use crate::types::{Position, Range};

/// Immutable snapshot of an editor buffer.
///
/// Lines are split on `\n`; a trailing `\r` belongs to the line ending, not
/// to the line text. An empty document still has one (empty) line.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line text without its line ending; `""` past the end.
    pub fn line(&self, line: usize) -> &str {
        if line >= self.line_count() {
            return "";
        }
        let start = self.line_starts[line];
        &self.text[start..self.content_end(line)]
    }

    /// Text between two positions, clamped to the document.
    pub fn text_in(&self, range: Range) -> &str {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end).max(start);
        &self.text[start..end]
    }

    /// Byte offset of a position. Lines past the end map to the document
    /// end and characters past the line map to the end of the line text.
    pub fn offset_of(&self, pos: Position) -> usize {
        if pos.line >= self.line_count() {
            return self.text.len();
        }
        let start = self.line_starts[pos.line];
        let end = self.content_end(pos.line);
        let line = &self.text[start..end];
        let within = line
            .char_indices()
            .nth(pos.character)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        start + within
    }

    /// Byte offset where the line's text stops (before `\r\n` / `\n`).
    fn content_end(&self, line: usize) -> usize {
        let mut end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        if end > self.line_starts[line] && self.text.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        end
    }
}
