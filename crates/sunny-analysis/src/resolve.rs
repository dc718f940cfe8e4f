//! Position-to-symbol resolution.
//!
//! Resolution runs against one [`CompilerContext`] and keeps no state
//! between calls:
//!
//! 1. The containing node is the first AST node, in emission order, whose
//!    range contains the position. Emission order wins over node size or
//!    nesting depth.
//! 2. Candidates are the symbols sharing that node's name.
//! 3. A candidate is viable if the node's scope is one of its reachable
//!    scopes.
//! 4. Each viable candidate's declaration scope is the scope of the AST node
//!    whose range equals the candidate's declaring range. Candidates without
//!    such a node are dropped.
//! 5. The candidate with the greatest declaration scope wins; on ties the
//!    first in symbol-table order is kept.
//!
//! Step 5 treats a larger scope id as a more deeply nested scope, which is
//! how the sunny compiler numbers scopes.

use crate::context::{AstNode, CompilerContext, SymbolNode};
use lsp_types::{Position, Range};
use std::collections::HashMap;

/// Outcome of resolving a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The AST node under the cursor.
    pub node: &'a AstNode,
    /// The innermost visible symbol the node refers to, if any.
    pub symbol: Option<&'a SymbolNode>,
}

/// Whether `pos` lies within `range`.
///
/// Both line bounds and both character bounds are inclusive.
pub fn position_in_range(pos: Position, range: Range) -> bool {
    if pos.line < range.start.line || pos.line > range.end.line {
        return false;
    }
    if pos.line == range.start.line && pos.character < range.start.character {
        return false;
    }
    if pos.line == range.end.line && pos.character > range.end.character {
        return false;
    }
    true
}

/// Find the first node, in emission order, containing `pos`.
pub fn find_containing_node(nodes: &[AstNode], pos: Position) -> Option<&AstNode> {
    nodes.iter().find(|node| position_in_range(pos, node.range))
}

/// Maps a source range to the scope of the first AST node spanning exactly it.
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    scopes: HashMap<Range, u32>,
}

impl ScopeIndex {
    /// Build the index for a list of AST nodes.
    pub fn new(nodes: &[AstNode]) -> Self {
        let mut scopes = HashMap::with_capacity(nodes.len());
        for node in nodes {
            scopes.entry(node.range).or_insert(node.scope);
        }
        Self { scopes }
    }

    /// Scope of the node declared at exactly `range`.
    pub fn declaration_scope(&self, range: Range) -> Option<u32> {
        self.scopes.get(&range).copied()
    }
}

/// Resolve `pos` to its containing node and the symbol it refers to.
///
/// Returns `None` only when no AST node contains the position. A node with
/// no resolvable symbol yields a [`Resolution`] whose `symbol` is `None`.
pub fn resolve(ctx: &CompilerContext, pos: Position) -> Option<Resolution<'_>> {
    let node = find_containing_node(&ctx.ast, pos)?;
    let index = ScopeIndex::new(&ctx.ast);
    let symbol = innermost_symbol(ctx, &index, &node.name, node.scope);

    tracing::debug!(
        "Resolved {:?} to node {:?} (scope {}), symbol {:?}",
        pos,
        node.name,
        node.scope,
        symbol.map(|s| &s.range)
    );

    Some(Resolution { node, symbol })
}

/// Pick the visible symbol named `name` with the greatest declaration scope.
fn innermost_symbol<'a>(
    ctx: &'a CompilerContext,
    index: &ScopeIndex,
    name: &'a str,
    current_scope: u32,
) -> Option<&'a SymbolNode> {
    let mut best: Option<(u32, &SymbolNode)> = None;

    let declared = ctx
        .symbols_named(name)
        .filter(|symbol| symbol.is_visible_from(current_scope))
        .filter_map(|symbol| Some((index.declaration_scope(symbol.range)?, symbol)));

    for (scope, symbol) in declared {
        // Strictly greater: the earliest symbol keeps a tie.
        if best.map_or(true, |(best_scope, _)| scope > best_scope) {
            best = Some((scope, symbol));
        }
    }

    best.map(|(_, symbol)| symbol)
}
