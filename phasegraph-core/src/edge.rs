//! Edges: guarded node transitions carrying variable assignments.

use crate::node::Node;
use phasegraph_expr::{compile, CompileError, EvalError, Expr, Value};
use std::collections::BTreeMap;

/// A directed transition between two nodes of the same phase.
///
/// The condition is compiled once at construction; the edge owns its tree
/// exclusively (cloning the edge deep-copies the tree). Actions are applied
/// to the destination node's vars when the edge fires.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    condition: String,
    compiled: Expr,
    pub actions: BTreeMap<String, Value>,
}

impl Edge {
    /// Build an edge, compiling its condition.
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
            actions: BTreeMap::new(),
        })
    }

    /// Builder-style action entry: assign `key` on the destination node
    /// when the edge fires.
    pub fn with_action(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.actions.insert(key.into(), value.into());
        self
    }

    /// The condition source string.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Evaluate the condition against the given node (the source node of a
    /// potential transition). Pure.
    pub fn evaluate(&self, node: &Node) -> Result<bool, EvalError> {
        self.compiled.eval(node)
    }
}
