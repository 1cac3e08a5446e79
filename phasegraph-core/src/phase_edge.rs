//! Phase edges: guarded transitions between phases.

use crate::node::Node;
use phasegraph_expr::{compile, CompileError, EvalError, Expr};

/// A directed transition between two phases.
///
/// The condition is evaluated against the current node of the source phase,
/// so it sees that node's vars and properties — including writes performed
/// by the node-level transition of the same tick.
#[derive(Debug, Clone)]
pub struct PhaseEdge {
    pub from: String,
    pub to: String,
    condition: String,
    compiled: Expr,
}

impl PhaseEdge {
    /// Build a phase edge, compiling its condition.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        condition: &str,
    ) -> Result<Self, CompileError> {
        Ok(Self {
            from: from.into(),
            to: to.into(),
            condition: condition.to_string(),
            compiled: compile(condition)?,
        })
    }

    /// The condition source string.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Evaluate the condition against the current node of the source phase.
    pub fn evaluate(&self, current_node: &Node) -> Result<bool, EvalError> {
        self.compiled.eval(current_node)
    }
}
