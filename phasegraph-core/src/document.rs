//! Configuration documents and loading.
//!
//! The document is JSON-shaped:
//!
//! ```json
//! {
//!   "phases": [
//!     {
//!       "id": "main",
//!       "initial_state": "idle",
//!       "nodes": [{"id": "idle", "vars": {"count": 0}}],
//!       "edges": [{"from": "idle", "to": "idle", "condition": "true", "actions": {}}]
//!     }
//!   ],
//!   "phase_edges": [{"from": "main", "to": "recovery", "condition": "count >= 2"}]
//! }
//! ```
//!
//! Unknown keys anywhere in the document are ignored, so editors can attach
//! auxiliary data (layout positions and the like) without breaking loads.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::multi_phase::{MultiPhaseGraph, Phase};
use crate::node::Node;
use crate::phase_edge::PhaseEdge;
use crate::state_graph::StateGraph;
use phasegraph_expr::{CompileError, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Root of a multi-phase configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDoc {
    pub phases: Vec<PhaseDoc>,
    #[serde(default)]
    pub phase_edges: Vec<PhaseEdgeDoc>,
}

/// One phase: id, optional initial state, nodes and edges in declaration
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDoc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
    #[serde(default)]
    pub edges: Vec<EdgeDoc>,
}

/// One node and its three bags of scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// One guarded node transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDoc {
    pub from: String,
    pub to: String,
    pub condition: String,
    #[serde(default)]
    pub actions: BTreeMap<String, Value>,
}

/// One guarded phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEdgeDoc {
    pub from: String,
    pub to: String,
    pub condition: String,
}

/// Root of a single-phase document (`StateGraph` loading).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateGraphDoc {
    pub nodes: Vec<NodeDoc>,
    pub edges: Vec<EdgeDoc>,
}

impl From<NodeDoc> for Node {
    fn from(doc: NodeDoc) -> Self {
        let mut node = Node::new(doc.id);
        for (key, value) in doc.params {
            node = node.with_param(key, value);
        }
        for (key, value) in doc.vars {
            node = node.with_var(key, value);
        }
        for (key, value) in doc.properties {
            node = node.with_property(key, value);
        }
        node
    }
}

impl TryFrom<EdgeDoc> for Edge {
    type Error = CompileError;

    fn try_from(doc: EdgeDoc) -> Result<Self, Self::Error> {
        let mut edge = Edge::new(doc.from, doc.to, &doc.condition)?;
        for (key, value) in doc.actions {
            edge = edge.with_action(key, value);
        }
        Ok(edge)
    }
}

impl TryFrom<PhaseEdgeDoc> for PhaseEdge {
    type Error = CompileError;

    fn try_from(doc: PhaseEdgeDoc) -> Result<Self, Self::Error> {
        PhaseEdge::new(doc.from, doc.to, &doc.condition)
    }
}

impl StateGraph {
    /// Load a `{nodes, edges}` document. The graph is cleared first; after
    /// a successful load the first declared node is current. Any failure
    /// leaves the graph cleared.
    pub fn load_document(&mut self, doc: StateGraphDoc) -> Result<(), GraphError> {
        self.clear();
        match self.load_document_inner(doc) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    fn load_document_inner(&mut self, doc: StateGraphDoc) -> Result<(), GraphError> {
        let first_id = doc.nodes.first().map(|node| node.id.clone());
        for node_doc in doc.nodes {
            self.add_node(Node::from(node_doc))?;
        }
        for edge_doc in doc.edges {
            self.add_edge(Edge::try_from(edge_doc)?)?;
        }
        if let Some(id) = first_id {
            self.set_initial_state(&id);
        }
        Ok(())
    }

    /// Load from an already-parsed JSON value.
    pub fn load_from_value(&mut self, value: &serde_json::Value) -> Result<(), GraphError> {
        match serde_json::from_value::<StateGraphDoc>(value.clone()) {
            Ok(doc) => self.load_document(doc),
            Err(err) => {
                self.clear();
                Err(err.into())
            }
        }
    }

    /// Load from a file. Returns `Ok(false)` without touching the graph
    /// when the file cannot be opened; parse and semantic failures error
    /// and leave the graph cleared.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<bool, GraphError> {
        let file = match File::open(path.as_ref()) {
            Ok(file) => file,
            Err(_) => return Ok(false),
        };
        match serde_json::from_reader::<_, StateGraphDoc>(BufReader::new(file)) {
            Ok(doc) => self.load_document(doc).map(|()| true),
            Err(err) => {
                self.clear();
                Err(err.into())
            }
        }
    }
}

impl MultiPhaseGraph {
    /// Load a multi-phase document. The graph is cleared first; phases,
    /// their nodes and edges, and then phase edges are created in
    /// declaration order. If any phases exist the first becomes current,
    /// with its declared initial state applied if it has no current node.
    /// Any failure leaves the graph cleared.
    pub fn load_document(&mut self, doc: GraphDoc) -> Result<(), GraphError> {
        self.clear();
        match self.load_document_inner(doc) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    fn load_document_inner(&mut self, doc: GraphDoc) -> Result<(), GraphError> {
        for phase_doc in doc.phases {
            let mut graph = StateGraph::new();
            for node_doc in phase_doc.nodes {
                graph.add_node(Node::from(node_doc))?;
            }
            for edge_doc in phase_doc.edges {
                graph.add_edge(Edge::try_from(edge_doc)?)?;
            }
            let mut phase = Phase::new(phase_doc.id, graph);
            if let Some(initial) = phase_doc.initial_state {
                phase = phase.with_initial_state(initial);
            }
            self.add_phase(phase)?;
        }

        for edge_doc in doc.phase_edges {
            self.add_phase_edge(PhaseEdge::try_from(edge_doc)?)?;
        }

        if self.phase_count() > 0 {
            self.set_current_phase_index(Some(0));
            let phase = &mut self.phases_mut()[0];
            if !phase.graph().has_current_state() {
                if let Some(initial) = phase.initial_state().map(str::to_string) {
                    phase.graph_mut().set_initial_state(&initial);
                }
            }
        }

        tracing::info!(
            phases = self.phase_count(),
            phase_edges = self.phase_edge_count(),
            "configuration loaded"
        );
        Ok(())
    }

    /// Load from an already-parsed JSON value.
    pub fn load_from_value(&mut self, value: &serde_json::Value) -> Result<(), GraphError> {
        match serde_json::from_value::<GraphDoc>(value.clone()) {
            Ok(doc) => self.load_document(doc),
            Err(err) => {
                self.clear();
                Err(err.into())
            }
        }
    }

    /// Load from a file. Returns `Ok(false)` without touching the graph
    /// when the file cannot be opened; parse and semantic failures error
    /// and leave the graph cleared.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<bool, GraphError> {
        let file = match File::open(path.as_ref()) {
            Ok(file) => file,
            Err(_) => return Ok(false),
        };
        match serde_json::from_reader::<_, GraphDoc>(BufReader::new(file)) {
            Ok(doc) => self.load_document(doc).map(|()| true),
            Err(err) => {
                self.clear();
                Err(err.into())
            }
        }
    }
}
