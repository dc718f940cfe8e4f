//! Structural analysis for sunny source files.
//!
//! The sunny compiler does the real work: it is run as an external process
//! and asked to export what it knows about a document as JSON. This crate
//! provides:
//!
//! - [`CompilerContext`] - The decoded compiler export (AST nodes, symbol
//!   table, diagnostics)
//! - [`Compiler`] - The oracle interface producing a context from source text
//! - [`ProcessCompiler`] - The subprocess-backed oracle
//! - [`resolve`] - Position-to-symbol resolution against a context
//!
//! # Example
//!
//! ```ignore
//! use sunny_analysis::{Compiler, ProcessCompiler, resolve};
//! use lsp_types::Position;
//!
//! let compiler = ProcessCompiler::new("sunnyc");
//! let ctx = compiler.compile("i32 x := 5;\nprint(x);\n")?;
//! if let Some(resolution) = resolve(&ctx, Position::new(1, 6)) {
//!     println!("{} : {:?}", resolution.node.name, resolution.symbol.map(|s| &s.ty));
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
pub mod oracle;
pub mod resolve;

pub use context::{AstNode, CompilerContext, SymbolNode};
pub use oracle::{CompileError, Compiler, ProcessCompiler};
pub use resolve::{Resolution, ScopeIndex, find_containing_node, position_in_range, resolve};
