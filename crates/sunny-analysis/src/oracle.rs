//! The compiler oracle.
//!
//! Structural facts about a document come from the sunny compiler, run as
//! `<compiler> --export-json <file>`. [`Compiler`] keeps the rest of the
//! system independent of how that happens; [`ProcessCompiler`] is the
//! subprocess implementation used by the server.

use crate::context::CompilerContext;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Flag asking the compiler to print its analysis as JSON.
pub const EXPORT_FLAG: &str = "--export-json";

/// Errors that can occur while compiling a document.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source could not be written to a temporary file.
    #[error("failed to stage source for compilation: {0}")]
    Stage(#[source] std::io::Error),

    /// The compiler process could not be started.
    #[error("failed to run compiler {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited unsuccessfully.
    #[error("compilation failed ({status}): {stderr}")]
    Failed {
        /// Exit status of the compiler.
        status: ExitStatus,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The compiler's output was not a valid export.
    #[error("invalid compiler output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Something that can turn source text into a [`CompilerContext`].
pub trait Compiler {
    /// Compile `source` and return everything the compiler reported.
    fn compile(&self, source: &str) -> Result<CompilerContext, CompileError>;
}

/// Runs the compiler binary once per compilation.
///
/// The source is written to a fresh temporary file (removed again when the
/// call returns, whatever the outcome) and the compiler is invoked as
/// `<program> <args...> --export-json <path>`. Standard output must hold
/// the JSON export; standard error only shows up in failure messages.
///
/// There is no timeout: a hung compiler blocks the caller.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessCompiler {
    /// Create an oracle running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed before the export flag (e.g. a script for an interpreter).
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The compiler program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn stage(source: &str) -> Result<NamedTempFile, CompileError> {
        let mut file = tempfile::Builder::new()
            .prefix("lsp-")
            .suffix(".code")
            .tempfile()
            .map_err(CompileError::Stage)?;
        file.write_all(source.as_bytes())
            .and_then(|()| file.flush())
            .map_err(CompileError::Stage)?;
        Ok(file)
    }

    fn run(&self, path: &Path) -> Result<Vec<u8>, CompileError> {
        tracing::debug!("Running {} on {}", self.program.display(), path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(EXPORT_FLAG)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl Compiler for ProcessCompiler {
    fn compile(&self, source: &str) -> Result<CompilerContext, CompileError> {
        // Dropping the handle deletes the file on every path out of here.
        let staged = Self::stage(source)?;
        let stdout = self.run(staged.path())?;
        let ctx = CompilerContext::from_json(&stdout)?;

        tracing::debug!(
            "Compiler reported {} AST nodes, {} symbols, {} diagnostics",
            ctx.ast.len(),
            ctx.symbols.len(),
            ctx.diagnostics.len()
        );

        Ok(ctx)
    }
}
