//! Document state: stored text plus on-demand compilation.

use crate::handlers::diagnostics::compile_error_to_diagnostic;
use crate::vfs::Vfs;
use lsp_types::{Diagnostic, Uri};
use sunny_analysis::{CompileError, Compiler, CompilerContext};
use thiserror::Error;

/// Errors that can occur while analysing a document.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The client never opened the document.
    #[error("document not found: {}", .0.as_str())]
    UnknownDocument(Uri),

    /// The compiler could not produce a context.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Open documents and the compiler used to analyse them.
///
/// Every open or update recompiles the whole document; nothing the compiler
/// returns is kept.
pub struct Workspace {
    vfs: Vfs,
    compiler: Box<dyn Compiler>,
}

impl Workspace {
    /// Create an empty workspace compiling with `compiler`.
    pub fn new(compiler: Box<dyn Compiler>) -> Self {
        Self {
            vfs: Vfs::new(),
            compiler,
        }
    }

    /// The document store.
    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// Store a newly opened document and compile it.
    pub fn open(&mut self, uri: Uri, text: String, version: i32) -> Vec<Diagnostic> {
        tracing::info!("Document opened: {} (version {})", uri.as_str(), version);
        self.vfs.set(uri.clone(), text, version);
        self.diagnostics(&uri)
    }

    /// Replace a document's text in full and recompile it.
    pub fn update(&mut self, uri: Uri, text: String, version: i32) -> Vec<Diagnostic> {
        match self.vfs.set(uri.clone(), text, version) {
            Some(previous) => tracing::debug!(
                "Document changed: {} (version {} -> {})",
                uri.as_str(),
                previous.version(),
                version
            ),
            None => tracing::debug!(
                "Change for unopened document stored: {} (version {})",
                uri.as_str(),
                version
            ),
        }
        self.diagnostics(&uri)
    }

    /// Compile the current text of `uri`.
    pub fn compile(&self, uri: &Uri) -> Result<CompilerContext, AnalysisError> {
        let text = self
            .vfs
            .get_content(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?;
        Ok(self.compiler.compile(text)?)
    }

    /// Compile `uri` and return its diagnostics.
    ///
    /// A failed compilation is reported as a single diagnostic carrying the
    /// failure message.
    pub fn diagnostics(&self, uri: &Uri) -> Vec<Diagnostic> {
        match self.compile(uri) {
            Ok(ctx) => ctx.diagnostics,
            Err(err) => {
                tracing::warn!("Compilation of {} failed: {}", uri.as_str(), err);
                vec![compile_error_to_diagnostic(&err)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{DiagnosticSeverity, Position, Range};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every source it is asked to compile.
    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Compiler for Recorder {
        fn compile(&self, source: &str) -> Result<CompilerContext, CompileError> {
            self.seen.borrow_mut().push(source.to_string());
            if self.fail {
                return Err(CompileError::Output(
                    serde_json::from_str::<serde_json::Value>("oops").unwrap_err(),
                ));
            }
            Ok(CompilerContext {
                diagnostics: vec![Diagnostic {
                    range: Range::new(Position::new(0, 0), Position::new(0, 3)),
                    severity: Some(DiagnosticSeverity::WARNING),
                    message: format!("{} bytes", source.len()),
                    ..Default::default()
                }],
                ..Default::default()
            })
        }
    }

    fn workspace(fail: bool) -> (Workspace, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let compiler = Recorder {
            seen: Rc::clone(&seen),
            fail,
        };
        (Workspace::new(Box::new(compiler)), seen)
    }

    fn uri() -> Uri {
        "file:///main.sunny".parse().unwrap()
    }

    #[test]
    fn test_open_then_update_compiles_twice() {
        let (mut ws, seen) = workspace(false);

        ws.open(uri(), "T1".to_string(), 1);
        let diagnostics = ws.update(uri(), "T2 longer".to_string(), 2);

        assert_eq!(*seen.borrow(), vec!["T1".to_string(), "T2 longer".to_string()]);
        assert_eq!(ws.vfs().get_content(&uri()), Some("T2 longer"));
        assert_eq!(diagnostics[0].message, "9 bytes");
    }

    #[test]
    fn test_update_unknown_document_stores_it() {
        let (mut ws, seen) = workspace(false);
        ws.update(uri(), "fresh".to_string(), 3);
        assert_eq!(ws.vfs().get_content(&uri()), Some("fresh"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_failure_becomes_single_diagnostic() {
        let (mut ws, _) = workspace(true);
        let diagnostics = ws.open(uri(), "x".to_string(), 1);

        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.range, Range::default());
        assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
        assert!(diag.message.contains("invalid compiler output"));
    }

    #[test]
    fn test_compile_unknown_document() {
        let (ws, seen) = workspace(false);
        let err = ws.compile(&uri()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownDocument(_)));
        assert_eq!(err.to_string(), "document not found: file:///main.sunny");
        assert!(seen.borrow().is_empty());
    }
}
