//! Hover handler.
//!
//! Diagnostics under the cursor take precedence; otherwise the hover shows
//! the name and type of whatever the cursor resolves to:
//!
//! ```text
//! **x** : *i32*
//! Visible in 2 scopes
//! ```

use crate::workspace::AnalysisError;
use lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind, Position};
use sunny_analysis::{CompilerContext, position_in_range, resolve};

/// Shown when nothing in the AST covers the cursor.
pub const NO_INFORMATION: &str = "No information found at position";

/// Handle a hover request.
pub fn handle_hover(
    params: &HoverParams,
    compiled: &Result<CompilerContext, AnalysisError>,
) -> Hover {
    let position = params.text_document_position_params.position;

    let value = match compiled {
        Ok(ctx) => hover_text(ctx, position),
        Err(err) => format!("Error: {err}"),
    };

    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: None,
    }
}

/// Build the hover text for `position`.
pub fn hover_text(ctx: &CompilerContext, position: Position) -> String {
    if let Some(diag) = ctx
        .diagnostics
        .iter()
        .find(|d| position_in_range(position, d.range))
    {
        return diag.message.clone();
    }

    let Some(resolution) = resolve(ctx, position) else {
        return NO_INFORMATION.to_string();
    };

    tracing::debug!("Hover for node: {:?}", resolution.node.name);

    let mut text = format!("**{}**", resolution.node.name);

    let ty = resolution
        .symbol
        .map(|s| s.ty.as_str())
        .or(resolution.node.literal_type.as_deref());
    if let Some(ty) = ty {
        text.push_str(&format!(" : *{ty}*"));
    }

    if let Some(symbol) = resolution.symbol {
        if !symbol.reachable_scopes.is_empty() {
            text.push_str(&format!(
                "\nVisible in {} scopes",
                symbol.reachable_scopes.len()
            ));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{Diagnostic, Range};
    use sunny_analysis::{AstNode, CompileError, SymbolNode};

    fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    /// `i32 x := 5;\nprint(x);\n`
    fn context() -> CompilerContext {
        CompilerContext {
            symbols: vec![SymbolNode {
                name: "x".to_string(),
                reachable_scopes: vec![0, 0],
                ty: "i32".to_string(),
                range: range(0, 4, 0, 5),
            }],
            ast: vec![
                AstNode {
                    name: "x".to_string(),
                    scope: 0,
                    range: range(0, 4, 0, 5),
                    literal_type: None,
                },
                AstNode {
                    name: "5".to_string(),
                    scope: 0,
                    range: range(0, 9, 0, 10),
                    literal_type: Some("i32".to_string()),
                },
                AstNode {
                    name: "print".to_string(),
                    scope: 0,
                    range: range(1, 0, 1, 5),
                    literal_type: None,
                },
                AstNode {
                    name: "x".to_string(),
                    scope: 0,
                    range: range(1, 6, 1, 7),
                    literal_type: None,
                },
            ],
            diagnostics: vec![],
        }
    }

    #[test]
    fn test_hover_on_usage() {
        let text = hover_text(&context(), Position::new(1, 6));
        assert_eq!(text.lines().next(), Some("**x** : *i32*"));
        assert_eq!(text, "**x** : *i32*\nVisible in 2 scopes");
    }

    #[test]
    fn test_hover_on_literal_uses_literal_type() {
        assert_eq!(hover_text(&context(), Position::new(0, 9)), "**5** : *i32*");
    }

    #[test]
    fn test_hover_on_unresolved_name() {
        assert_eq!(hover_text(&context(), Position::new(1, 3)), "**print**");
    }

    #[test]
    fn test_hover_outside_ast() {
        assert_eq!(hover_text(&context(), Position::new(5, 0)), NO_INFORMATION);
    }

    #[test]
    fn test_diagnostic_takes_precedence() {
        let mut ctx = context();
        ctx.diagnostics = vec![
            Diagnostic {
                range: range(1, 0, 1, 8),
                message: "first".to_string(),
                ..Default::default()
            },
            Diagnostic {
                range: range(1, 6, 1, 7),
                message: "second".to_string(),
                ..Default::default()
            },
        ];

        assert_eq!(hover_text(&ctx, Position::new(1, 6)), "first");
        // Outside every diagnostic, resolution runs as usual.
        assert_eq!(
            hover_text(&ctx, Position::new(0, 4)),
            "**x** : *i32*\nVisible in 2 scopes"
        );
    }

    #[test]
    fn test_hover_reports_compiler_failure() {
        let params: HoverParams = serde_json::from_value(serde_json::json!({
            "textDocument": { "uri": "file:///main.sunny" },
            "position": { "line": 0, "character": 0 }
        }))
        .unwrap();
        let err = AnalysisError::Compile(CompileError::Output(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        ));

        let hover = handle_hover(&params, &Err(err));
        match hover.contents {
            HoverContents::Markup(markup) => {
                assert!(markup.value.starts_with("Error: invalid compiler output"));
            }
            other => panic!("expected markup, got {other:?}"),
        }
    }
}
