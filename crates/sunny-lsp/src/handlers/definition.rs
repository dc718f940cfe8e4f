//! Go-to-definition handler.
//!
//! Jumps to the declaring range of the symbol under the cursor. When nothing
//! resolves, the response points at the cursor itself so the editor stays
//! put instead of reporting an error.

use crate::workspace::AnalysisError;
use lsp_types::{GotoDefinitionParams, GotoDefinitionResponse, Location, Range};
use sunny_analysis::{CompilerContext, resolve};

/// Handle a go-to-definition request.
pub fn handle_goto_definition(
    params: &GotoDefinitionParams,
    compiled: &Result<CompilerContext, AnalysisError>,
) -> GotoDefinitionResponse {
    let position = params.text_document_position_params.position;
    let uri = params.text_document_position_params.text_document.uri.clone();

    let declared = compiled
        .as_ref()
        .ok()
        .and_then(|ctx| resolve(ctx, position))
        .and_then(|resolution| resolution.symbol)
        .map(|symbol| symbol.range);

    if declared.is_none() {
        tracing::debug!("No definition at {:?}, keeping cursor", position);
    }

    GotoDefinitionResponse::Scalar(Location {
        uri,
        range: declared.unwrap_or(Range::new(position, position)),
    })
}
