//! Stdio entry point for the LSP server.

use crate::config::ServerConfig;
use crate::main_loop::run_main_loop;
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::thread;

/// Start the LSP server using stdio transport.
///
/// Requests are read and handled on the calling thread; responses and
/// notifications are written to stdout by a dedicated writer thread.
pub fn start_stdio(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Starting Sunny Language Server v{}", crate::VERSION);
    tracing::info!(
        "Compiler: {} (protocol: {})",
        config.compiler.program.display(),
        config.protocol
    );

    let (sender, receiver) = crossbeam_channel::unbounded();

    let writer = thread::Builder::new()
        .name("lsp-writer".to_string())
        .spawn(move || write_all(&receiver, &mut io::stdout().lock()))?;

    let stdin = io::stdin();
    run_main_loop(&mut stdin.lock(), sender, config);

    // The loop dropped its sender, so the writer drains and stops.
    match writer.join() {
        Ok(result) => result?,
        Err(_) => return Err("writer thread panicked".into()),
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Write every queued message until all senders are gone.
fn write_all(receiver: &Receiver<lsp_server::Message>, out: &mut impl Write) -> io::Result<()> {
    for msg in receiver {
        if let Err(e) = msg.write(out) {
            tracing::error!("Failed to write message: {}", e);
            return Err(e);
        }
    }
    Ok(())
}
