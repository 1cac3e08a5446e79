//! # phasegraph-core
//!
//! Hierarchical state-machine runtime.
//!
//! A configuration, loaded once from a declarative JSON document, defines a
//! set of phases; each phase is a finite state machine whose nodes carry
//! three value bags (params, vars, properties) and whose edges are guarded
//! by compiled conditions and may assign variables. Phase edges sit above
//! the phases and switch the active phase based on conditions evaluated
//! against the current node.
//!
//! One [`MultiPhaseGraph::step`] performs at most one node transition
//! followed by at most one phase transition; phase-edge conditions see the
//! variable writes of the same tick's node transition. Phases are
//! resumable: re-entering a phase restores the node it was left at.
//!
//! This crate provides:
//! - The graph model: [`Node`], [`Edge`], [`StateGraph`], [`PhaseEdge`],
//!   [`Phase`], [`MultiPhaseGraph`]
//! - Hierarchical stepping with [`StepOutcome`] reporting
//! - The configuration loader ([`GraphDoc`] and friends)

pub mod document;
pub mod edge;
pub mod error;
pub mod multi_phase;
pub mod node;
pub mod phase_edge;
pub mod state_graph;

pub use document::{EdgeDoc, GraphDoc, NodeDoc, PhaseDoc, PhaseEdgeDoc, StateGraphDoc};
pub use edge::Edge;
pub use error::GraphError;
pub use multi_phase::{MultiPhaseGraph, Phase, StepOutcome};
pub use node::Node;
pub use phase_edge::PhaseEdge;
pub use state_graph::StateGraph;

pub use phasegraph_expr::{CompileError, EvalError, Value};
