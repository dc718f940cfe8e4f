//! Completion handler.
//!
//! Completions come from a fixed catalog of language keywords and built-in
//! types; the cursor position is not consulted.

use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionParams, CompletionResponse, Documentation,
};

/// Language keywords: (label, detail, documentation).
const KEYWORDS: &[(&str, &str, &str)] = &[
    ("func", "Function declaration", "Define a new function"),
    ("mut", "Mutable declaration", "Declare a mutable variable"),
    ("if", "If statement", "Conditional execution"),
    ("else", "Else clause", "Alternative branch for if statements"),
    ("for", "For loop", "Iteration construct"),
    ("while", "While loop", "Conditional loop"),
    ("print", "Print function", "Output to console"),
    ("return", "Return statement", "Exit function with value"),
    ("returns", "Return type declaration", "Specify function return type"),
    ("break", "Break statement", "Exit loop"),
    ("continue", "Continue statement", "Skip to next iteration"),
    ("true", "Boolean true", "Literal true value"),
    ("false", "Boolean false", "Literal false value"),
    ("null", "Null value", "Representation of no value"),
    ("and", "Logical AND", "Boolean AND operation"),
    ("or", "Logical OR", "Boolean OR operation"),
];

/// Built-in types: (label, detail, documentation).
const TYPES: &[(&str, &str, &str)] = &[
    ("u8", "8-bit unsigned integer", "Unsigned 8-bit integer type"),
    ("u16", "16-bit unsigned integer", "Unsigned 16-bit integer type"),
    ("u32", "32-bit unsigned integer", "Unsigned 32-bit integer type"),
    ("u64", "64-bit unsigned integer", "Unsigned 64-bit integer type"),
    ("i8", "8-bit signed integer", "Signed 8-bit integer type"),
    ("i16", "16-bit signed integer", "Signed 16-bit integer type"),
    ("i32", "32-bit signed integer", "Signed 32-bit integer type"),
    ("i64", "64-bit signed integer", "Signed 64-bit integer type"),
    ("f64", "64-bit float", "64-bit floating point number"),
    ("bool", "Boolean type", "True/false values"),
    ("String", "String type", "UTF-8 string type"),
    ("u0", "Void type", "Absence of type"),
];

/// Handle a completion request.
pub fn handle_completion(params: &CompletionParams) -> CompletionResponse {
    tracing::debug!(
        "Completion at {:?}",
        params.text_document_position.position
    );

    let keywords = KEYWORDS
        .iter()
        .map(|entry| item(entry, CompletionItemKind::KEYWORD));
    let types = TYPES
        .iter()
        .map(|entry| item(entry, CompletionItemKind::TYPE_PARAMETER));

    CompletionResponse::Array(keywords.chain(types).collect())
}

fn item(
    &(label, detail, documentation): &(&str, &str, &str),
    kind: CompletionItemKind,
) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        detail: Some(detail.to_string()),
        documentation: Some(Documentation::String(documentation.to_string())),
        ..Default::default()
    }
}
