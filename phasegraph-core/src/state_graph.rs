//! Single-phase finite state machine.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::Node;
use phasegraph_expr::Value;
use std::collections::HashMap;

/// A single-phase FSM: nodes, edges, indexed adjacency, and a current node.
///
/// Nodes and edges are appended at load time and never removed, so the
/// numeric indices held internally stay valid for the life of the graph.
/// Adjacency preserves declaration order; `step` fires the first outgoing
/// edge whose condition is true.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    current: Option<usize>,
}

/// Undo record for one applied node transition, used to restore the graph
/// when a later phase-edge evaluation fails mid-tick.
#[derive(Debug)]
pub(crate) struct TakenTransition {
    prev_current: usize,
    dest: usize,
    overwritten: Vec<(String, Option<Value>)>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all nodes, edges, and the current pointer.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_index.clear();
        self.adjacency.clear();
        self.current = None;
    }

    /// Append a node. Fails if the id is already present in this graph.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(node.id()) {
            return Err(GraphError::DuplicateNode {
                id: node.id().to_string(),
            });
        }
        self.node_index.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        Ok(())
    }

    /// Append an edge. Fails if either endpoint is not a known node id.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let from = *self
            .node_index
            .get(&edge.from)
            .ok_or_else(|| GraphError::UnknownNode {
                id: edge.from.clone(),
            })?;
        if !self.node_index.contains_key(&edge.to) {
            return Err(GraphError::UnknownNode {
                id: edge.to.clone(),
            });
        }
        let idx = self.edges.len();
        self.edges.push(edge);
        self.adjacency[from].push(idx);
        Ok(())
    }

    /// Point the current state at the given node id. Returns false when the
    /// id is unknown, leaving the current pointer untouched.
    pub fn set_initial_state(&mut self, id: &str) -> bool {
        match self.node_index.get(id) {
            Some(&idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn has_current_state(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_state_id(&self) -> Result<&str, GraphError> {
        self.current
            .map(|idx| self.nodes[idx].id())
            .ok_or(GraphError::NoCurrentState)
    }

    pub fn current_node(&self) -> Result<&Node, GraphError> {
        self.current
            .map(|idx| &self.nodes[idx])
            .ok_or(GraphError::NoCurrentState)
    }

    /// Mutable view of the current node, for drivers that inject stimulus
    /// by writing vars between ticks.
    pub fn current_node_mut(&mut self) -> Result<&mut Node, GraphError> {
        match self.current {
            Some(idx) => Ok(&mut self.nodes[idx]),
            None => Err(GraphError::NoCurrentState),
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Mutable lookup by id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.node_index.get(id) {
            Some(&idx) => Some(&mut self.nodes[idx]),
            None => None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// One node-level advancement.
    ///
    /// Outgoing edges of the current node are evaluated against it in
    /// declaration order; the first whose condition is true fires. The
    /// current pointer moves to the edge's target and the edge's actions
    /// are written to the target's vars. Self-loops fire like any other
    /// edge. Returns the new current id, or `None` when the graph has no
    /// current state or no edge fires.
    ///
    /// Conditions are evaluated before anything mutates, so an evaluation
    /// error leaves the graph untouched.
    pub fn step(&mut self) -> Result<Option<String>, GraphError> {
        let taken = self.step_recorded()?;
        Ok(taken.map(|t| self.nodes[t.dest].id().to_string()))
    }

    /// Step and keep enough information to undo the applied transition.
    pub(crate) fn step_recorded(&mut self) -> Result<Option<TakenTransition>, GraphError> {
        let Some(from) = self.current else {
            return Ok(None);
        };

        let mut chosen = None;
        let source = &self.nodes[from];
        for &edge_idx in &self.adjacency[from] {
            if self.edges[edge_idx].evaluate(source)? {
                chosen = Some(edge_idx);
                break;
            }
        }
        let Some(edge_idx) = chosen else {
            return Ok(None);
        };

        let dest = *self
            .node_index
            .get(&self.edges[edge_idx].to)
            .ok_or_else(|| GraphError::UnknownNode {
                id: self.edges[edge_idx].to.clone(),
            })?;

        self.current = Some(dest);
        let actions = &self.edges[edge_idx].actions;
        let node = &mut self.nodes[dest];
        let mut overwritten = Vec::with_capacity(actions.len());
        for (key, value) in actions {
            overwritten.push((key.clone(), node.var(key).cloned()));
            node.set_var(key.clone(), value.clone());
        }

        Ok(Some(TakenTransition {
            prev_current: from,
            dest,
            overwritten,
        }))
    }

    /// Reverse a recorded transition: restore the current pointer and the
    /// destination node's overwritten vars.
    pub(crate) fn undo(&mut self, taken: TakenTransition) {
        let node = &mut self.nodes[taken.dest];
        for (key, prev) in taken.overwritten {
            match prev {
                Some(value) => node.set_var(key, value),
                None => node.unset_var(&key),
            }
        }
        self.current = Some(taken.prev_current);
    }
}
