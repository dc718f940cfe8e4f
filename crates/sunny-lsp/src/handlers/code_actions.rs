//! Code actions handler.
//!
//! Offers snippet templates that replace the selected range.

use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, CodeActionParams, CodeActionResponse,
    TextEdit, WorkspaceEdit,
};
use std::collections::HashMap;

/// Snippet templates: (title, replacement text).
const TEMPLATES: &[(&str, &str)] = &[
    ("Create function template", "func FOO() {\n}"),
    (
        "Create for loop",
        "i32 n := 10;\nfor (mut i32 i := 0; i < n; i := i + 1) {\n}",
    ),
    ("Create if-else block", "if (true) {\n} else {\n}"),
];

/// Handle a code action request.
pub fn handle_code_actions(params: &CodeActionParams) -> CodeActionResponse {
    let uri = &params.text_document.uri;
    let range = params.range;

    TEMPLATES
        .iter()
        .map(|&(title, snippet)| {
            let edit = TextEdit {
                range,
                new_text: snippet.to_string(),
            };
            CodeActionOrCommand::CodeAction(CodeAction {
                title: title.to_string(),
                kind: Some(CodeActionKind::REFACTOR_REWRITE),
                edit: Some(WorkspaceEdit {
                    changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
                    ..Default::default()
                }),
                ..Default::default()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{Position, Range};

    #[test]
    fn test_templates_target_selection() {
        let params: CodeActionParams = serde_json::from_value(serde_json::json!({
            "textDocument": { "uri": "file:///main.sunny" },
            "range": {
                "start": { "line": 2, "character": 0 },
                "end": { "line": 2, "character": 4 }
            },
            "context": { "diagnostics": [] }
        }))
        .unwrap();

        let actions = handle_code_actions(&params);
        assert_eq!(actions.len(), 3);

        let titles: Vec<_> = actions
            .iter()
            .map(|a| match a {
                CodeActionOrCommand::CodeAction(action) => action.title.as_str(),
                CodeActionOrCommand::Command(cmd) => cmd.title.as_str(),
            })
            .collect();
        assert_eq!(
            titles,
            vec![
                "Create function template",
                "Create for loop",
                "Create if-else block"
            ]
        );

        let CodeActionOrCommand::CodeAction(first) = &actions[0] else {
            panic!("expected a code action");
        };
        let changes = first.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = &changes[&params.text_document.uri];
        assert_eq!(
            edits[0].range,
            Range::new(Position::new(2, 0), Position::new(2, 4))
        );
        assert_eq!(edits[0].new_text, "func FOO() {\n}");
    }
}
