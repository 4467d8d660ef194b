//! Editor-side collaborators the locator depends on.

use async_trait::async_trait;

use crate::document::Document;
use crate::errors::Result;
use crate::symbols::SymbolNode;
use crate::types::Position;

/// Snapshot of the focused editor: file, buffer contents and cursor.
#[derive(Debug, Clone)]
pub struct ActiveEditor {
    pub file_name: String,
    pub document: Document,
    pub cursor: Position,
}

/// Access to the host editor.
#[async_trait]
pub trait EditorContext: Send + Sync {
    /// The focused editor, or `None` when no document is open.
    fn active_editor(&self) -> Option<ActiveEditor>;

    /// Hierarchical outline for the active document.
    ///
    /// `Ok(None)` means no symbol provider is registered for the language.
    async fn document_symbols(&self, editor: &ActiveEditor) -> Result<Option<Vec<SymbolNode>>>;
}

/// Fixed editor state: one document, one cursor, optional outline.
///
/// Used by the command-line client (files on disk have no symbol
/// service) and by tests.
#[derive(Debug, Clone, Default)]
pub struct SnapshotEditor {
    active: Option<ActiveEditor>,
    symbols: Option<Vec<SymbolNode>>,
}

impl SnapshotEditor {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>, cursor: Position) -> Self {
        Self {
            active: Some(ActiveEditor {
                file_name: file_name.into(),
                document: Document::new(text),
                cursor,
            }),
            symbols: None,
        }
    }

    /// Editor with nothing open.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn with_symbols(mut self, symbols: Vec<SymbolNode>) -> Self {
        self.symbols = Some(symbols);
        self
    }
}

#[async_trait]
impl EditorContext for SnapshotEditor {
    fn active_editor(&self) -> Option<ActiveEditor> {
        self.active.clone()
    }

    async fn document_symbols(&self, _editor: &ActiveEditor) -> Result<Option<Vec<SymbolNode>>> {
        Ok(self.symbols.clone())
    }
}
