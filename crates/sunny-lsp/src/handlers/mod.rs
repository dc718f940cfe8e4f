//! LSP request and notification handlers.
//!
//! Handlers are pure functions of the request parameters and the outcome of
//! compiling the document; the main loop owns all state.

pub mod code_actions;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod hover;
