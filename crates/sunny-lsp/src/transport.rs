//! Message framing for the base protocol.
//!
//! Every message is a header block followed by a JSON body:
//!
//! ```text
//! Content-Length: 52\r\n
//! \r\n
//! {"jsonrpc":"2.0","id":1,"method":"initialize",...}
//! ```
//!
//! Only `Content-Length` is interpreted; other headers are skipped. Writing
//! is left to [`Message::write`].

use lsp_server::Message;
use std::io::{self, BufRead, Read};
use thiserror::Error;

const CONTENT_LENGTH: &str = "content-length";

/// Errors produced while reading a frame.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The header block had no `Content-Length`.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// The `Content-Length` value was not a number.
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    /// A header line was not `Name: value`.
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    /// The body was not a JSON-RPC message.
    #[error("invalid message body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The stream failed or ended in the middle of a frame.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether reading can carry on with the next frame.
    ///
    /// Header and body problems only spoil one frame; I/O failures leave the
    /// stream in an unknown position.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Read the next frame body from `reader`.
///
/// Returns `Ok(None)` at end of input. On a header error the whole header
/// block has been consumed, so the caller may simply read again.
pub fn read_frame(reader: &mut impl BufRead) -> Result<Option<Vec<u8>>, TransportError> {
    let mut content_length = None;
    let mut problem = None;
    let mut line = String::new();
    let mut saw_header = false;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            if saw_header {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "end of input inside header block",
                )
                .into());
            }
            return Ok(None);
        }

        let header = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if header.is_empty() {
            // Tolerate stray blank lines between frames.
            if saw_header {
                break;
            }
            continue;
        }
        saw_header = true;

        let Some((name, value)) = header.split_once(':') else {
            problem.get_or_insert(TransportError::MalformedHeader(header.to_string()));
            continue;
        };

        if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
            let value = value.trim();
            match value.parse::<usize>() {
                Ok(len) => content_length = Some(len),
                Err(_) => {
                    problem.get_or_insert(TransportError::InvalidContentLength(value.to_string()));
                }
            }
        }
    }

    if let Some(err) = problem {
        return Err(err);
    }
    let len = content_length.ok_or(TransportError::MissingContentLength)?;

    // The declared length bounds the read but never sizes an allocation.
    let mut body = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut body)?;
    if body.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("frame body ended after {} of {} bytes", body.len(), len),
        )
        .into());
    }
    Ok(Some(body))
}

/// Decode a frame body into a request, notification or response.
pub fn decode_message(body: &[u8]) -> Result<Message, TransportError> {
    Ok(serde_json::from_slice(body)?)
}

/// Read and decode the next message.
pub fn read_message(reader: &mut impl BufRead) -> Result<Option<Message>, TransportError> {
    match read_frame(reader)? {
        Some(body) => decode_message(&body).map(Some),
        None => Ok(None),
    }
}
