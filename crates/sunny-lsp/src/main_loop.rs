//! Main event loop for the LSP server.
//!
//! Messages are handled strictly one at a time: a frame is read, dispatched
//! and fully handled (including the compiler run it triggers) before the next
//! frame is read. Outgoing messages go through a channel so the caller
//! decides where they are written.

use crate::config::{ProtocolPolicy, ServerConfig};
use crate::handlers::code_actions::handle_code_actions;
use crate::handlers::completion::handle_completion;
use crate::handlers::definition::handle_goto_definition;
use crate::handlers::hover::handle_hover;
use crate::transport::read_message;
use crate::workspace::Workspace;
use crossbeam_channel::Sender;
use lsp_server::ErrorCode;
use lsp_types::notification::{
    DidChangeTextDocument, DidOpenTextDocument, Exit, Initialized, Notification,
    PublishDiagnostics,
};
use lsp_types::request::{
    CodeActionRequest, Completion, GotoDefinition, HoverRequest, Initialize, Request, Shutdown,
};
use lsp_types::{
    CodeActionOptions, CodeActionProviderCapability, CompletionOptions, Diagnostic,
    DidChangeTextDocumentParams, DidOpenTextDocumentParams, HoverProviderCapability,
    InitializeParams, InitializeResult, OneOf, PublishDiagnosticsParams, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, Uri,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::BufRead;
use sunny_analysis::Compiler;

/// Why a request produced no result.
enum RequestError {
    /// The method is not one the server implements.
    UnknownMethod,
    /// The params did not decode.
    InvalidParams(String),
    /// The result did not encode.
    Internal(String),
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next message.
    Continue,
    /// Stop reading (the client sent `exit`).
    Exit,
}

/// State managed by the main loop.
pub struct MainLoopState {
    /// Open documents and the compiler.
    workspace: Workspace,
    /// Sender for outgoing LSP messages.
    sender: Sender<lsp_server::Message>,
    /// What to do with messages that cannot be handled.
    protocol: ProtocolPolicy,
    /// Whether shutdown was requested.
    shutdown_requested: bool,
}

impl MainLoopState {
    /// Create a new main loop state.
    pub fn new(
        compiler: Box<dyn Compiler>,
        protocol: ProtocolPolicy,
        sender: Sender<lsp_server::Message>,
    ) -> Self {
        Self {
            workspace: Workspace::new(compiler),
            sender,
            protocol,
            shutdown_requested: false,
        }
    }

    /// The documents held by the server.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Handle one decoded message.
    pub fn handle_message(&mut self, msg: lsp_server::Message) -> Flow {
        match msg {
            lsp_server::Message::Request(req) => {
                self.handle_request(req);
                Flow::Continue
            }
            lsp_server::Message::Notification(notif) => self.handle_notification(notif),
            lsp_server::Message::Response(_resp) => {
                // We don't send requests to the client
                Flow::Continue
            }
        }
    }

    /// Handle an LSP request (expects response).
    fn handle_request(&mut self, req: lsp_server::Request) {
        let id = req.id.clone();
        let method = req.method.clone();
        tracing::debug!("Request {}: {}", id, method);

        let result = match req.method.as_str() {
            Initialize::METHOD => self.handle_initialize(req),
            Shutdown::METHOD => {
                self.shutdown_requested = true;
                Ok(serde_json::Value::Null)
            }
            HoverRequest::METHOD => self.handle_hover_request(req),
            GotoDefinition::METHOD => self.handle_goto_definition_request(req),
            CodeActionRequest::METHOD => self.handle_code_action_request(req),
            Completion::METHOD => self.handle_completion_request(req),
            _ => Err(RequestError::UnknownMethod),
        };

        let response = match (result, self.protocol) {
            (Ok(value), _) => lsp_server::Response::new_ok(id, value),
            (Err(RequestError::UnknownMethod), ProtocolPolicy::Lenient) => {
                tracing::debug!("Unhandled request: {}", method);
                return;
            }
            (Err(RequestError::InvalidParams(msg)), ProtocolPolicy::Lenient) => {
                tracing::warn!("Dropping request {}: {}", id, msg);
                return;
            }
            (Err(RequestError::UnknownMethod), ProtocolPolicy::Strict) => {
                lsp_server::Response::new_err(
                    id,
                    ErrorCode::MethodNotFound as i32,
                    "Unhandled request".to_string(),
                )
            }
            (Err(RequestError::InvalidParams(msg)), ProtocolPolicy::Strict) => {
                lsp_server::Response::new_err(id, ErrorCode::InvalidParams as i32, msg)
            }
            (Err(RequestError::Internal(msg)), _) => {
                tracing::error!("Request {} failed: {}", id, msg);
                lsp_server::Response::new_err(id, ErrorCode::InternalError as i32, msg)
            }
        };

        self.send(lsp_server::Message::Response(response));
    }

    /// Handle the initialize request.
    fn handle_initialize(
        &mut self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, RequestError> {
        // Lenient clients still get capabilities when their params are off.
        match decode_params::<InitializeParams>(req.params) {
            Ok(params) => {
                if let Some(client) = &params.client_info {
                    tracing::info!(
                        "Connected to: {} {}",
                        client.name,
                        client.version.as_deref().unwrap_or("")
                    );
                }
            }
            Err(RequestError::InvalidParams(msg)) if self.protocol == ProtocolPolicy::Lenient => {
                tracing::warn!("initialize: {}", msg);
            }
            Err(e) => return Err(e),
        }

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            code_action_provider: Some(CodeActionProviderCapability::Options(
                CodeActionOptions::default(),
            )),
            completion_provider: Some(CompletionOptions::default()),
            ..Default::default()
        };

        encode_result(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "sunny-lsp".to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
        })
    }

    /// Handle the textDocument/hover request.
    fn handle_hover_request(
        &self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, RequestError> {
        let params: lsp_types::HoverParams = decode_params(req.params)?;

        let uri = &params.text_document_position_params.text_document.uri;
        let compiled = self.workspace.compile(uri);

        encode_result(handle_hover(&params, &compiled))
    }

    /// Handle the textDocument/definition request.
    fn handle_goto_definition_request(
        &self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, RequestError> {
        let params: lsp_types::GotoDefinitionParams = decode_params(req.params)?;

        let uri = &params.text_document_position_params.text_document.uri;
        let compiled = self.workspace.compile(uri);

        encode_result(handle_goto_definition(&params, &compiled))
    }

    /// Handle the textDocument/codeAction request.
    fn handle_code_action_request(
        &self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, RequestError> {
        let params: lsp_types::CodeActionParams = decode_params(req.params)?;
        encode_result(handle_code_actions(&params))
    }

    /// Handle the textDocument/completion request.
    fn handle_completion_request(
        &self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, RequestError> {
        let params: lsp_types::CompletionParams = decode_params(req.params)?;
        encode_result(handle_completion(&params))
    }

    /// Handle an LSP notification (no response expected).
    fn handle_notification(&mut self, notif: lsp_server::Notification) -> Flow {
        match notif.method.as_str() {
            DidOpenTextDocument::METHOD => {
                match serde_json::from_value::<DidOpenTextDocumentParams>(notif.params) {
                    Ok(params) => self.on_did_open(params),
                    Err(e) => tracing::warn!("textDocument/didOpen: {}", e),
                }
            }
            DidChangeTextDocument::METHOD => {
                match serde_json::from_value::<DidChangeTextDocumentParams>(notif.params) {
                    Ok(params) => self.on_did_change(params),
                    Err(e) => tracing::warn!("textDocument/didChange: {}", e),
                }
            }
            Initialized::METHOD => {
                tracing::info!("Client initialized");
            }
            Exit::METHOD => {
                if self.shutdown_requested {
                    tracing::info!("Exit notification received");
                } else {
                    tracing::warn!("Exit notification received without shutdown");
                }
                return Flow::Exit;
            }
            _ => {
                tracing::debug!("Unhandled notification: {}", notif.method);
            }
        }
        Flow::Continue
    }

    /// Handle textDocument/didOpen notification.
    fn on_did_open(&mut self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let diagnostics = self.workspace.open(doc.uri.clone(), doc.text, doc.version);
        self.send_diagnostics(&doc.uri, diagnostics);
    }

    /// Handle textDocument/didChange notification.
    ///
    /// Each content change carries the full text; every one of them is
    /// applied and published in order.
    fn on_did_change(&mut self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        for change in params.content_changes {
            let diagnostics = self.workspace.update(uri.clone(), change.text, version);
            self.send_diagnostics(&uri, diagnostics);
        }
    }

    /// Send diagnostics to the client.
    fn send_diagnostics(&self, uri: &Uri, diagnostics: Vec<Diagnostic>) {
        tracing::debug!(
            "Publishing {} diagnostics for {}",
            diagnostics.len(),
            uri.as_str()
        );

        let params = PublishDiagnosticsParams {
            uri: uri.clone(),
            diagnostics,
            version: None,
        };

        let notif = lsp_server::Notification::new(PublishDiagnostics::METHOD.to_string(), params);

        self.send(lsp_server::Message::Notification(notif));
    }

    /// Send a message to the client.
    fn send(&self, msg: lsp_server::Message) {
        if let Err(e) = self.sender.send(msg) {
            tracing::error!("Failed to send message: {}", e);
        }
    }
}

fn decode_params<P: DeserializeOwned>(params: serde_json::Value) -> Result<P, RequestError> {
    serde_json::from_value(params).map_err(|e| RequestError::InvalidParams(e.to_string()))
}

fn encode_result(result: impl Serialize) -> Result<serde_json::Value, RequestError> {
    serde_json::to_value(result).map_err(|e| RequestError::Internal(e.to_string()))
}

/// Run the main event loop until end of input or `exit`.
///
/// Frames that fail to decode are logged and skipped; only an I/O failure on
/// `reader` stops the loop early.
pub fn run_main_loop(
    reader: &mut impl BufRead,
    sender: Sender<lsp_server::Message>,
    config: &ServerConfig,
) {
    let compiler = Box::new(config.compiler.build());
    let mut state = MainLoopState::new(compiler, config.protocol, sender);
    drive(&mut state, reader);
}

/// Feed every message from `reader` to `state`.
pub fn drive(state: &mut MainLoopState, reader: &mut impl BufRead) {
    tracing::info!("Main loop started");

    loop {
        match read_message(reader) {
            Ok(Some(msg)) => {
                if state.handle_message(msg) == Flow::Exit {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Dropping frame: {}", e);
            }
            Err(e) => {
                tracing::error!("Input stream failed: {}", e);
                break;
            }
        }
    }

    tracing::info!("Main loop ended");
}
