//! Multi-phase graph: phases, phase edges, and hierarchical stepping.

use crate::error::GraphError;
use crate::node::Node;
use crate::phase_edge::PhaseEdge;
use crate::state_graph::StateGraph;
use std::collections::HashMap;

/// A named finite state machine inside the multi-phase graph.
#[derive(Debug, Clone)]
pub struct Phase {
    id: String,
    graph: StateGraph,
    initial_state: Option<String>,
}

impl Phase {
    pub fn new(id: impl Into<String>, graph: StateGraph) -> Self {
        Self {
            id: id.into(),
            graph,
            initial_state: None,
        }
    }

    /// Declare the node this phase starts in when (re-)entered without a
    /// current node.
    pub fn with_initial_state(mut self, id: impl Into<String>) -> Self {
        self.initial_state = Some(id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut StateGraph {
        &mut self.graph
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state.as_deref()
    }
}

/// Result of one hierarchical step.
///
/// Both flags may be false (quiescent tick) and both may be true (a node
/// transition whose writes made a phase edge fire in the same tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub phase_changed: bool,
    pub state_changed: bool,
    /// Phase id after the tick.
    pub phase_id: String,
    /// State id after the tick.
    pub state_id: String,
}

/// The hierarchical runtime: an ordered list of phases, phase edges with
/// per-source adjacency, and a current phase.
///
/// All elements are created at load time and never removed; only node vars
/// and the two current pointers mutate afterwards. Not safe to step
/// concurrently — give each machine its own instance.
#[derive(Debug, Clone, Default)]
pub struct MultiPhaseGraph {
    phases: Vec<Phase>,
    phase_index: HashMap<String, usize>,
    phase_edges: Vec<PhaseEdge>,
    phase_adjacency: Vec<Vec<usize>>,
    current_phase: Option<usize>,
}

impl MultiPhaseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all phases, phase edges, and the current pointer.
    pub fn clear(&mut self) {
        self.phases.clear();
        self.phase_index.clear();
        self.phase_edges.clear();
        self.phase_adjacency.clear();
        self.current_phase = None;
    }

    /// Append a phase. Fails if the id is already present. A declared
    /// initial state is applied to the phase's graph immediately; an
    /// unknown initial state is tolerated (the phase starts with no
    /// current node) but logged.
    pub fn add_phase(&mut self, mut phase: Phase) -> Result<(), GraphError> {
        if self.phase_index.contains_key(phase.id()) {
            return Err(GraphError::DuplicatePhase {
                id: phase.id().to_string(),
            });
        }
        if let Some(initial) = phase.initial_state.clone() {
            if !phase.graph.set_initial_state(&initial) {
                tracing::warn!(
                    phase = %phase.id,
                    state = %initial,
                    "declared initial state not found in phase"
                );
            }
        }
        self.phase_index.insert(phase.id().to_string(), self.phases.len());
        self.phases.push(phase);
        self.phase_adjacency.push(Vec::new());
        Ok(())
    }

    /// Append a phase edge. Fails if either endpoint is not a known phase,
    /// which makes an unknown target unreachable at run time.
    pub fn add_phase_edge(&mut self, edge: PhaseEdge) -> Result<(), GraphError> {
        let from = *self
            .phase_index
            .get(&edge.from)
            .ok_or_else(|| GraphError::UnknownPhase {
                id: edge.from.clone(),
            })?;
        if !self.phase_index.contains_key(&edge.to) {
            return Err(GraphError::UnknownPhase {
                id: edge.to.clone(),
            });
        }
        let idx = self.phase_edges.len();
        self.phase_edges.push(edge);
        self.phase_adjacency[from].push(idx);
        Ok(())
    }

    /// Point the current phase at the given id. On success, a declared
    /// initial state is forced onto that phase's graph even if the phase
    /// already had a current node. Returns false when the id is unknown.
    pub fn set_initial_phase(&mut self, id: &str) -> bool {
        let Some(&idx) = self.phase_index.get(id) else {
            return false;
        };
        self.current_phase = Some(idx);
        let phase = &mut self.phases[idx];
        if let Some(initial) = phase.initial_state.clone() {
            phase.graph.set_initial_state(&initial);
        }
        true
    }

    pub fn has_current_phase(&self) -> bool {
        self.current_phase.is_some()
    }

    pub fn current_phase_id(&self) -> Result<&str, GraphError> {
        self.current_phase
            .map(|idx| self.phases[idx].id())
            .ok_or(GraphError::NoCurrentPhase)
    }

    /// The current state id of the current phase.
    pub fn current_state_id(&self) -> Result<&str, GraphError> {
        let idx = self.current_phase.ok_or(GraphError::NoCurrentPhase)?;
        self.phases[idx].graph.current_state_id()
    }

    /// The current node of the current phase.
    pub fn current_node(&self) -> Result<&Node, GraphError> {
        let idx = self.current_phase.ok_or(GraphError::NoCurrentPhase)?;
        self.phases[idx].graph.current_node()
    }

    /// Mutable view of the current node, for drivers that inject stimulus
    /// by writing vars between ticks.
    pub fn current_node_mut(&mut self) -> Result<&mut Node, GraphError> {
        let idx = self.current_phase.ok_or(GraphError::NoCurrentPhase)?;
        self.phases[idx].graph.current_node_mut()
    }

    /// Look up a phase by id.
    pub fn phase(&self, id: &str) -> Option<&Phase> {
        self.phase_index.get(id).map(|&idx| &self.phases[idx])
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn phase_edge_count(&self) -> usize {
        self.phase_edges.len()
    }

    pub(crate) fn phases_mut(&mut self) -> &mut Vec<Phase> {
        &mut self.phases
    }

    pub(crate) fn set_current_phase_index(&mut self, idx: Option<usize>) {
        self.current_phase = idx;
    }

    /// One hierarchical advancement.
    ///
    /// 1. The current phase takes its node-level step ([`StateGraph::step`]).
    /// 2. The phase's outgoing phase edges are evaluated in declaration
    ///    order against the (possibly updated) current node; the first
    ///    whose condition is true switches the current phase. A phase
    ///    entered without a current node starts at its declared initial
    ///    state; a phase that ran before resumes where it left off.
    ///
    /// Returns `None` when there is no current phase. A condition error
    /// from either level restores the graph to its pre-step state.
    pub fn step(&mut self) -> Result<Option<StepOutcome>, GraphError> {
        let Some(phase_idx) = self.current_phase else {
            return Ok(None);
        };

        let taken = self.phases[phase_idx].graph.step_recorded()?;
        let state_changed = taken.is_some();

        // Evaluate phase edges before mutating phase state, so an
        // evaluation error can still unwind the node transition.
        let target = match self.first_firing_phase_edge(phase_idx) {
            Ok(target) => target,
            Err(err) => {
                if let Some(taken) = taken {
                    self.phases[phase_idx].graph.undo(taken);
                }
                return Err(err);
            }
        };

        let mut phase_changed = false;
        if let Some(target_idx) = target {
            self.current_phase = Some(target_idx);
            let phase = &mut self.phases[target_idx];
            if !phase.graph.has_current_state() {
                if let Some(initial) = phase.initial_state.clone() {
                    phase.graph.set_initial_state(&initial);
                }
            }
            phase_changed = true;
            tracing::debug!(
                from = %self.phases[phase_idx].id,
                to = %self.phases[target_idx].id,
                "phase transition"
            );
        }

        Ok(Some(StepOutcome {
            phase_changed,
            state_changed,
            phase_id: self.current_phase_id()?.to_string(),
            state_id: self.current_state_id()?.to_string(),
        }))
    }

    /// Index of the target phase of the first outgoing phase edge whose
    /// condition holds against the current node of `phase_idx`. Pure.
    fn first_firing_phase_edge(&self, phase_idx: usize) -> Result<Option<usize>, GraphError> {
        let node = self.phases[phase_idx].graph.current_node()?;
        for &edge_idx in &self.phase_adjacency[phase_idx] {
            let edge = &self.phase_edges[edge_idx];
            if edge.evaluate(node)? {
                let target = *self
                    .phase_index
                    .get(&edge.to)
                    .ok_or_else(|| GraphError::UnknownPhase {
                        id: edge.to.clone(),
                    })?;
                return Ok(Some(target));
            }
        }
        Ok(None)
    }
}
