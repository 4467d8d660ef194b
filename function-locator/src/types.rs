use serde::{Deserialize, Serialize};

/// Zero-based `(line, character)` position, as editors report cursors.
///
/// `character` counts Unicode scalar values within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Range between two positions. Containment is inclusive on both ends,
/// matching how editors test a cursor against a symbol range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// The definition the cursor is in: declared name plus verbatim source.
///
/// `name` is empty when only a text span could be recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionMatch {
    pub name: String,
    pub text: String,
}
