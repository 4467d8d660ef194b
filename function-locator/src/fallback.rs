//! Line-scanning fallback used when no outline is available.
//!
//! Definitions are recognized by an ordered list of [`DefinitionPattern`]s,
//! each pairing a line regex with the capture group holding the name. New
//! syntaxes are added by extending the list; the scan loop never changes.

use regex::Regex;
use tracing::debug;

use crate::document::Document;
use crate::errors::Result;
use crate::types::{DefinitionMatch, Position, Range};

/// Source syntax a pattern recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    /// `def name(` / `def name (`
    PythonDef,
    /// `(define name ...`, `(define (name args) ...`, `(define-macro ...`
    SchemeDefine,
    /// `CREATE TABLE name ...`
    SqlCreateTable,
    /// Caller-supplied pattern.
    Custom,
}

/// A definition-opening line pattern and the capture group of its name.
#[derive(Debug, Clone)]
pub struct DefinitionPattern {
    pub family: PatternFamily,
    pub regex: Regex,
    pub name_group: usize,
}

impl DefinitionPattern {
    pub fn new(family: PatternFamily, pattern: &str, name_group: usize) -> Result<Self> {
        Ok(Self {
            family,
            regex: Regex::new(pattern)?,
            name_group,
        })
    }

    /// Name captured on `line`, or `None` if the line does not open a definition.
    pub fn match_line(&self, line: &str) -> Option<String> {
        let caps = self.regex.captures(line)?;
        Some(
            caps.get(self.name_group)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        )
    }
}

/// Built-in patterns, anchored at column zero so only top-level
/// definitions delimit units.
pub fn builtin_patterns() -> Vec<DefinitionPattern> {
    let specs: [(PatternFamily, &str); 3] = [
        (PatternFamily::PythonDef, r"^def\s+(\w+)\s*\("),
        (
            PatternFamily::SchemeDefine,
            r"^\(define(?:-macro)?\s+\(?\s*([-?\w]+)[\s)]",
        ),
        (PatternFamily::SqlCreateTable, r"^CREATE\s+TABLE\s+(\w+)\s+"),
    ];
    specs
        .into_iter()
        .filter_map(|(family, pattern)| DefinitionPattern::new(family, pattern, 1).ok())
        .collect()
}

/// Backward/forward line scanner over a [`Document`].
#[derive(Debug, Clone)]
pub struct FallbackScanner {
    patterns: Vec<DefinitionPattern>,
}

impl Default for FallbackScanner {
    fn default() -> Self {
        Self::new(builtin_patterns())
    }
}

impl FallbackScanner {
    pub fn new(patterns: Vec<DefinitionPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[DefinitionPattern] {
        &self.patterns
    }

    /// First pattern (in list order) that matches `line`.
    fn match_line(&self, line: &str) -> Option<(PatternFamily, String)> {
        self.patterns
            .iter()
            .find_map(|p| p.match_line(line).map(|name| (p.family, name)))
    }

    /// Span of the unit around `cursor`.
    ///
    /// Start: nearest line at or above the cursor opening a definition
    /// (or line 0 with an empty name). End: the next line below the cursor
    /// opening any definition (or the document end). The end scan does not
    /// compare names, so it can stop at an unrelated unit.
    pub fn scan(&self, doc: &Document, cursor: Position) -> DefinitionMatch {
        let cursor_line = cursor.line.min(doc.line_count().saturating_sub(1));

        let mut start_line = 0;
        let mut name = String::new();
        for line in (0..=cursor_line).rev() {
            if let Some((family, found)) = self.match_line(doc.line(line)) {
                debug!(line, ?family, name = %found, "fallback found definition start");
                start_line = line;
                name = found;
                break;
            }
        }

        // Starts below the cursor: a cursor on a definition line keeps that
        // definition's body instead of yielding an empty span.
        let end_line = (cursor_line + 1..doc.line_count())
            .find(|&line| self.match_line(doc.line(line)).is_some())
            .unwrap_or(doc.line_count());

        let range = Range::new(Position::new(start_line, 0), Position::new(end_line, 0));
        DefinitionMatch {
            name,
            text: doc.text_in(range).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PY: &str = "import math\n\ndef first(x):\n    return x\n\ndef second (y):\n    y += 1\n    return y\n";

    #[test]
    fn python_span_runs_to_next_definition() {
        let doc = Document::new(PY);
        let m = FallbackScanner::default().scan(&doc, Position::new(3, 4));
        assert_eq!(m.name, "first");
        assert_eq!(m.text, "def first(x):\n    return x\n\n");
    }

    #[test]
    fn last_definition_runs_to_document_end() {
        let doc = Document::new(PY);
        let m = FallbackScanner::default().scan(&doc, Position::new(6, 0));
        assert_eq!(m.name, "second");
        assert_eq!(m.text, "def second (y):\n    y += 1\n    return y\n");
    }

    #[test]
    fn cursor_on_definition_line_includes_body() {
        let doc = Document::new(PY);
        let m = FallbackScanner::default().scan(&doc, Position::new(2, 0));
        assert_eq!(m.name, "first");
        assert_eq!(m.text, "def first(x):\n    return x\n\n");
    }

    #[test]
    fn no_preceding_definition_starts_at_document_start() {
        let doc = Document::new(PY);
        let m = FallbackScanner::default().scan(&doc, Position::new(0, 3));
        assert_eq!(m.name, "");
        assert_eq!(m.text, "import math\n\n");
    }

    #[test]
    fn scheme_forms_are_recognized() {
        let src = "(define (square x)\n  (* x x))\n(define-macro (twice e)\n  `(begin ,e ,e))\n(define pi 3.14)\n";
        let doc = Document::new(src);
        let scanner = FallbackScanner::default();
        assert_eq!(scanner.scan(&doc, Position::new(1, 0)).name, "square");
        let m = scanner.scan(&doc, Position::new(3, 0));
        assert_eq!(m.name, "twice");
        assert_eq!(m.text, "(define-macro (twice e)\n  `(begin ,e ,e))\n");
        assert_eq!(scanner.scan(&doc, Position::new(4, 0)).name, "pi");
    }

    #[test]
    fn sql_tables_are_recognized() {
        let src = "CREATE TABLE dogs AS\n  SELECT 1;\nCREATE TABLE cats AS\n  SELECT 2;\n";
        let doc = Document::new(src);
        let m = FallbackScanner::default().scan(&doc, Position::new(1, 2));
        assert_eq!(m.name, "dogs");
        assert_eq!(m.text, "CREATE TABLE dogs AS\n  SELECT 1;\n");
    }

    #[test]
    fn indented_definitions_do_not_delimit() {
        let src = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let doc = Document::new(src);
        let m = FallbackScanner::default().scan(&doc, Position::new(2, 0));
        assert_eq!(m.name, "outer");
        assert_eq!(m.text, src);
    }

    #[test]
    fn cursor_past_end_is_clamped() {
        let doc = Document::new(PY);
        let m = FallbackScanner::default().scan(&doc, Position::new(500, 0));
        assert_eq!(m.name, "second");
    }

    #[test]
    fn custom_patterns_extend_the_scan() {
        let mut patterns = builtin_patterns();
        patterns.push(DefinitionPattern::new(PatternFamily::Custom, r"^fn\s+(\w+)", 1).unwrap());
        let scanner = FallbackScanner::new(patterns);
        let doc = Document::new("fn main() {\n    run();\n}\n");
        assert_eq!(scanner.scan(&doc, Position::new(1, 0)).name, "main");
    }

    #[test]
    fn empty_document_yields_empty_match() {
        let m = FallbackScanner::default().scan(&Document::new(""), Position::new(0, 0));
        assert_eq!(m, DefinitionMatch::default());
    }
}
