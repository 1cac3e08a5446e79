//! Core error types.

use phasegraph_expr::{CompileError, EvalError};
use thiserror::Error;

/// Errors from the graph model, the loader, and the stepping runtime.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("duplicate phase id: {id}")]
    DuplicatePhase { id: String },

    #[error("edge references unknown node: {id}")]
    UnknownNode { id: String },

    #[error("phase edge references unknown phase: {id}")]
    UnknownPhase { id: String },

    #[error("no current state")]
    NoCurrentState,

    #[error("no current phase")]
    NoCurrentPhase,

    #[error("condition compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("condition evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("load error: {0}")]
    Document(#[from] serde_json::Error),
}
