//! Locates the definition unit enclosing an editor cursor.
//!
//! Two paths:
//! - **Outline**: walk the editor's document-symbol tree for the first
//!   function-like node containing the cursor and return its exact range.
//! - **Fallback**: scan lines backward/forward from the cursor for
//!   definition-opening patterns (Python `def`, Scheme `define`, SQL
//!   `CREATE TABLE`) when no outline exists or it has no enclosing function.
//!
//! The fallback always yields a span, so a located unit is only ever absent
//! when there is no active editor at all.

pub mod document;
pub mod editor;
pub mod errors;
pub mod fallback;
pub mod symbols;
pub mod types;

use tracing::{debug, warn};

pub use document::Document;
pub use editor::{ActiveEditor, EditorContext, SnapshotEditor};
pub use errors::{Error, Result};
pub use fallback::{DefinitionPattern, FallbackScanner, PatternFamily};
pub use symbols::{SymbolKind, SymbolNode, find_enclosing_function};
pub use types::{DefinitionMatch, Position, Range};

/// Outline walk with line-scanning fallback.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    fallback: FallbackScanner,
}

impl Locator {
    pub fn new(fallback: FallbackScanner) -> Self {
        Self { fallback }
    }

    /// Locate the unit at `cursor`, preferring the outline when given.
    pub fn locate(
        &self,
        doc: &Document,
        symbols: Option<&[SymbolNode]>,
        cursor: Position,
    ) -> DefinitionMatch {
        if let Some(node) = symbols.and_then(|tree| find_enclosing_function(tree, cursor)) {
            debug!(name = %node.name, "enclosing function found in outline");
            return DefinitionMatch {
                name: node.name.clone(),
                text: doc.text_in(node.range).to_string(),
            };
        }
        debug!(line = cursor.line, "no outline match, scanning lines");
        self.fallback.scan(doc, cursor)
    }

    /// Locate the unit in the focused editor.
    ///
    /// Returns `None` only when no editor is open. A failing symbol
    /// provider is logged and treated like a missing outline.
    pub async fn locate_active(
        &self,
        editor: &dyn EditorContext,
    ) -> Option<(ActiveEditor, DefinitionMatch)> {
        let active = editor.active_editor()?;
        let symbols = match editor.document_symbols(&active).await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!(error = %e, file = %active.file_name, "document symbols unavailable");
                None
            }
        };
        let found = self.locate(&active.document, symbols.as_deref(), active.cursor);
        Some((active, found))
    }
}

/// Locate with the built-in fallback patterns and no outline.
pub fn locate(doc: &Document, cursor: Position) -> DefinitionMatch {
    Locator::default().locate(doc, None, cursor)
}
