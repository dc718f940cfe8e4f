//! Compiler export data model.
//!
//! These types mirror the JSON object printed by `<compiler> --export-json`:
//!
//! ```json
//! {
//!   "symbols": [{ "name": "x", "reachable_scopes": [0, 1], "type": "i32", "range": { ... } }],
//!   "ast": [{ "name": "x", "scope": 0, "range": { ... }, "literalType": "i32" }],
//!   "diagnostics": [{ "range": { ... }, "severity": 1, "source": "sunny", "message": "..." }]
//! }
//! ```

use lsp_types::{Diagnostic, Range};
use serde::{Deserialize, Deserializer, Serialize};

/// One syntactic element as emitted by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AstNode {
    /// Identifier or literal text of the node.
    pub name: String,
    /// Id of the scope the node lives in.
    pub scope: u32,
    /// Source range of the node.
    pub range: Range,
    /// Type of a literal node, if the compiler knows it.
    #[serde(
        rename = "literalType",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub literal_type: Option<String>,
}

/// One symbol-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SymbolNode {
    /// Declared name.
    pub name: String,
    /// Scope ids from which the symbol is visible. May contain duplicates.
    #[serde(default)]
    pub reachable_scopes: Vec<u32>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: String,
    /// Range of the declaration.
    pub range: Range,
}

impl SymbolNode {
    /// Whether the symbol is visible from `scope`.
    pub fn is_visible_from(&self, scope: u32) -> bool {
        self.reachable_scopes.contains(&scope)
    }
}

/// Everything one compilation produced.
///
/// A context is built fresh for every compilation and never merged with a
/// previous one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CompilerContext {
    /// Symbol table, in compiler order.
    #[serde(rename = "symbols", default)]
    pub symbols: Vec<SymbolNode>,
    /// AST nodes, in emission order (not sorted by nesting or size).
    #[serde(default)]
    pub ast: Vec<AstNode>,
    /// Diagnostics reported by the compiler.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilerContext {
    /// Decode a context from the compiler's standard output.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Symbols declared under `name`, in symbol-table order.
    pub fn symbols_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SymbolNode> {
        self.symbols.iter().filter(move |s| s.name == name)
    }
}

/// The compiler writes `""` for nodes without a literal type.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{DiagnosticSeverity, Position};

    const EXPORT: &str = r#"{
        "symbols": [
            {
                "name": "x",
                "reachable_scopes": [0, 1],
                "type": "i32",
                "range": { "start": { "line": 0, "character": 4 }, "end": { "line": 0, "character": 5 } }
            }
        ],
        "ast": [
            {
                "name": "x",
                "scope": 0,
                "range": { "start": { "line": 0, "character": 4 }, "end": { "line": 0, "character": 5 } }
            },
            {
                "name": "5",
                "scope": 0,
                "range": { "start": { "line": 0, "character": 9 }, "end": { "line": 0, "character": 10 } },
                "literalType": "i32"
            },
            {
                "name": "y",
                "scope": 1,
                "range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 1 } },
                "literalType": ""
            }
        ],
        "diagnostics": [
            {
                "range": { "start": { "line": 2, "character": 0 }, "end": { "line": 2, "character": 3 } },
                "severity": 1,
                "source": "sunny",
                "message": "undeclared identifier"
            }
        ]
    }"#;

    #[test]
    fn test_decode_export() {
        let ctx = CompilerContext::from_json(EXPORT.as_bytes()).unwrap();

        assert_eq!(ctx.symbols.len(), 1);
        assert_eq!(ctx.symbols[0].ty, "i32");
        assert_eq!(ctx.symbols[0].reachable_scopes, vec![0, 1]);

        assert_eq!(ctx.ast.len(), 3);
        assert_eq!(ctx.ast[0].literal_type, None);
        assert_eq!(ctx.ast[1].literal_type.as_deref(), Some("i32"));
        assert_eq!(ctx.ast[2].literal_type, None);
        assert_eq!(ctx.ast[1].range.start, Position::new(0, 9));

        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(ctx.diagnostics[0].message, "undeclared identifier");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let ctx = CompilerContext::from_json(br#"{"ast": []}"#).unwrap();
        assert!(ctx.symbols.is_empty());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(CompilerContext::from_json(b"not json").is_err());
        assert!(CompilerContext::from_json(br#"{"ast": 3}"#).is_err());
    }

    #[test]
    fn test_symbols_named() {
        let ctx = CompilerContext::from_json(EXPORT.as_bytes()).unwrap();
        assert_eq!(ctx.symbols_named("x").count(), 1);
        assert_eq!(ctx.symbols_named("y").count(), 0);
    }

    #[test]
    fn test_visibility() {
        let ctx = CompilerContext::from_json(EXPORT.as_bytes()).unwrap();
        let x = &ctx.symbols[0];
        assert!(x.is_visible_from(1));
        assert!(!x.is_visible_from(2));
    }
}
