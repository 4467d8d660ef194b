//! Structured outline (document symbol tree) and the enclosing-function walk.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Position, Range};

/// Symbol kind taxonomy aligned with LSP `SymbolKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    Struct,
    Other,
}

impl SymbolKind {
    /// Kinds that count as a "definition unit" for help requests.
    ///
    /// Only free functions qualify; methods fall through to the next
    /// enclosing function or to the line-scanning fallback.
    pub fn is_function_like(self) -> bool {
        matches!(self, SymbolKind::Function)
    }
}

/// One node of the outline tree reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNode {
    pub name: String,
    pub kind: SymbolKind,
    /// Full range of the symbol, body included.
    pub range: Range,
    #[serde(default)]
    pub children: Vec<SymbolNode>,
}

impl SymbolNode {
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SymbolNode>) -> Self {
        self.children = children;
        self
    }
}

/// First function-like node whose range contains `pos`, in depth-first
/// pre-order (a node is tested before its children, children before the
/// node's next sibling). Ranges may overlap; the first hit wins.
pub fn find_enclosing_function(nodes: &[SymbolNode], pos: Position) -> Option<&SymbolNode> {
    for node in nodes {
        trace!(name = %node.name, kind = ?node.kind, "visiting symbol");
        if node.kind.is_function_like() && node.range.contains(pos) {
            return Some(node);
        }
        if let Some(found) = find_enclosing_function(&node.children, pos) {
            return Some(found);
        }
    }
    None
}

/* ------------------------------------------------------------------------- */
/* LSP interop                                                               */
/* ------------------------------------------------------------------------- */

impl From<lsp_types::SymbolKind> for SymbolKind {
    fn from(kind: lsp_types::SymbolKind) -> Self {
        use lsp_types::SymbolKind as K;
        match kind {
            K::FILE => SymbolKind::File,
            K::MODULE => SymbolKind::Module,
            K::NAMESPACE => SymbolKind::Namespace,
            K::PACKAGE => SymbolKind::Package,
            K::CLASS => SymbolKind::Class,
            K::METHOD => SymbolKind::Method,
            K::PROPERTY => SymbolKind::Property,
            K::FIELD => SymbolKind::Field,
            K::CONSTRUCTOR => SymbolKind::Constructor,
            K::ENUM => SymbolKind::Enum,
            K::INTERFACE => SymbolKind::Interface,
            K::FUNCTION => SymbolKind::Function,
            K::VARIABLE => SymbolKind::Variable,
            K::CONSTANT => SymbolKind::Constant,
            K::STRUCT => SymbolKind::Struct,
            _ => SymbolKind::Other,
        }
    }
}

impl From<lsp_types::Position> for Position {
    fn from(p: lsp_types::Position) -> Self {
        Position::new(p.line as usize, p.character as usize)
    }
}

impl From<lsp_types::Range> for Range {
    fn from(r: lsp_types::Range) -> Self {
        Range::new(r.start.into(), r.end.into())
    }
}

impl From<lsp_types::DocumentSymbol> for SymbolNode {
    fn from(sym: lsp_types::DocumentSymbol) -> Self {
        let children = sym
            .children
            .unwrap_or_default()
            .into_iter()
            .map(SymbolNode::from)
            .collect();
        SymbolNode {
            name: sym.name,
            kind: sym.kind.into(),
            range: sym.range.into(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(sl: usize, el: usize) -> Range {
        Range::new(Position::new(sl, 0), Position::new(el, 0))
    }

    #[test]
    fn finds_function_inside_class() {
        let tree = vec![
            SymbolNode::new("helper", SymbolKind::Function, r(0, 3)),
            SymbolNode::new("Shape", SymbolKind::Class, r(4, 20)).with_children(vec![
                SymbolNode::new("area", SymbolKind::Method, r(5, 8)),
                SymbolNode::new("nested", SymbolKind::Function, r(9, 12)),
            ]),
        ];
        let hit = find_enclosing_function(&tree, Position::new(10, 2)).unwrap();
        assert_eq!(hit.name, "nested");
        assert!(find_enclosing_function(&tree, Position::new(6, 0)).is_none());
    }

    #[test]
    fn outer_function_wins_over_inner() {
        let tree = vec![
            SymbolNode::new("outer", SymbolKind::Function, r(0, 10))
                .with_children(vec![SymbolNode::new("inner", SymbolKind::Function, r(2, 4))]),
        ];
        let hit = find_enclosing_function(&tree, Position::new(3, 0)).unwrap();
        assert_eq!(hit.name, "outer");
    }

    #[test]
    fn overlapping_siblings_resolve_in_order() {
        let tree = vec![
            SymbolNode::new("first", SymbolKind::Function, r(0, 6)),
            SymbolNode::new("second", SymbolKind::Function, r(4, 9)),
        ];
        assert_eq!(
            find_enclosing_function(&tree, Position::new(5, 0)).unwrap().name,
            "first"
        );
        assert_eq!(
            find_enclosing_function(&tree, Position::new(7, 0)).unwrap().name,
            "second"
        );
    }

    #[test]
    #[allow(deprecated)]
    fn converts_lsp_document_symbols() {
        let pos = |line, character| lsp_types::Position { line, character };
        let range = |a, b| lsp_types::Range {
            start: pos(a, 0),
            end: pos(b, 0),
        };
        let sym = lsp_types::DocumentSymbol {
            name: "Outer".into(),
            detail: None,
            kind: lsp_types::SymbolKind::CLASS,
            tags: None,
            deprecated: None,
            range: range(0, 9),
            selection_range: range(0, 0),
            children: Some(vec![lsp_types::DocumentSymbol {
                name: "go".into(),
                detail: None,
                kind: lsp_types::SymbolKind::FUNCTION,
                tags: None,
                deprecated: None,
                range: range(2, 5),
                selection_range: range(2, 2),
                children: None,
            }]),
        };
        let node = SymbolNode::from(sym);
        assert_eq!(node.kind, SymbolKind::Class);
        assert_eq!(node.children[0].kind, SymbolKind::Function);
        assert_eq!(node.children[0].range, r(2, 5));
    }
}
