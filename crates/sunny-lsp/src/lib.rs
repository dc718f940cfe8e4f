//! Language Server Protocol implementation for the sunny language.
//!
//! The server does no analysis of its own. Every question is answered by
//! running the sunny compiler over the current document text and reading the
//! JSON it exports:
//! - Diagnostics on open and on every change
//! - Hover with the resolved symbol's type and visibility
//! - Go-to-definition for identifiers
//! - Keyword and type completion
//! - Snippet code actions
//!
//! # Architecture
//!
//! - **Transport**: Content-Length framed JSON-RPC over a byte stream
//! - **Main loop**: Reads one message at a time and dispatches it
//! - **Workspace**: Open documents plus the compiler oracle
//! - **Handlers**: Turn compiler output into LSP responses

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod main_loop;
pub mod transport;
pub mod workspace;

mod server;
mod vfs;

pub use config::{CompilerConfig, ProtocolPolicy, ServerConfig};
pub use main_loop::{MainLoopState, drive, run_main_loop};
pub use server::start_stdio;
pub use vfs::{Document, Vfs};
pub use workspace::{AnalysisError, Workspace};

/// LSP server version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
