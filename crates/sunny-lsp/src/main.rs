//! Sunny Language Server.
//!
//! Usage:
//!   sunny-lsp                          # Start LSP server (stdio), compiler `sunnyc`
//!   sunny-lsp --compiler ./sunnyc      # Use a specific compiler binary
//!   sunny-lsp --log-file /tmp/lsp.log  # Log to a file instead of stderr

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use sunny_lsp::{CompilerConfig, ProtocolPolicy, ServerConfig};
use tracing_subscriber::EnvFilter;

/// Language server for the sunny language, backed by the sunny compiler.
///
/// The server communicates via stdio using the Language Server Protocol.
/// Set `RUST_LOG` to adjust logging (e.g., `RUST_LOG=sunny_lsp=debug`).
#[derive(Parser, Debug)]
#[command(name = "sunny-lsp", author, version, about, long_about = None)]
struct Args {
    /// Compiler executable invoked as `<compiler> [ARGS] --export-json <file>`
    #[arg(long, env = "SUNNY_COMPILER", default_value = sunny_lsp::config::DEFAULT_COMPILER)]
    compiler: PathBuf,

    /// Extra argument passed to the compiler before `--export-json` (repeatable)
    #[arg(long = "compiler-arg", value_name = "ARG", allow_hyphen_values = true)]
    compiler_args: Vec<OsString>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "SUNNY_LSP_LOG", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Handling of unknown methods and malformed params: lenient or strict
    #[arg(long, env = "SUNNY_LSP_PROTOCOL", default_value_t = ProtocolPolicy::Lenient)]
    protocol: ProtocolPolicy,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            compiler: CompilerConfig {
                program: self.compiler.clone(),
                args: self.compiler_args.clone(),
            },
            protocol: self.protocol,
        }
    }
}

/// Initialize tracing. Logs never go to stdout, which carries LSP traffic.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        "sunny_lsp=info"
            .parse()
            .context("invalid default log directive")?,
    );

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_deref()) {
        eprintln!("sunny-lsp: {e:#}");
        return ExitCode::FAILURE;
    }

    // Run the server
    match sunny_lsp::start_stdio(&args.server_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
