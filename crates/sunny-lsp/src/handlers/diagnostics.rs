//! Diagnostics for failed compilations.

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use std::fmt::Display;

/// Source tag for diagnostics produced by the server itself.
pub const COMPILER_SOURCE: &str = "sunny-lsp:compiler";

/// Report a failed compilation as one error at the start of the document.
pub fn compile_error_to_diagnostic(error: &impl Display) -> Diagnostic {
    Diagnostic {
        range: Range::new(Position::new(0, 0), Position::new(0, 0)),
        severity: Some(DiagnosticSeverity::ERROR),
        code: None,
        code_description: None,
        source: Some(COMPILER_SOURCE.to_string()),
        message: error.to_string(),
        related_information: None,
        tags: None,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_diagnostic() {
        let diag = compile_error_to_diagnostic(&"compilation failed (exit status: 1): boom");

        assert_eq!(diag.range.start, Position::new(0, 0));
        assert_eq!(diag.range.end, Position::new(0, 0));
        assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diag.source.as_deref(), Some(COMPILER_SOURCE));
        assert_eq!(diag.message, "compilation failed (exit status: 1): boom");
    }
}
