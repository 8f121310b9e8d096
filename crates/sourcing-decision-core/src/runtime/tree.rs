// crates/sourcing-decision-core/src/runtime/tree.rs
// ============================================================================
// Module: Decision Tree
// Description: Gates, decision nodes, and the validated decision graph.
// Purpose: Build the static route graph once and validate it before traversal.
// Dependencies: crate::{core, interfaces}, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`DecisionTree`] is assembled with a [`DecisionTreeBuilder`] and is
//! immutable afterwards. Each [`DecisionNode`] belongs to exactly one route,
//! holds an ordered list of [`Gate`]s combined with AND semantics, and carries a
//! success edge plus an optional failure edge.
//!
//! `build()` fails closed: a missing root, a dangling edge, or a cycle is a
//! configuration error, so every built tree walks without repeating a node.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::core::context::ExecutionContext;
use crate::core::identifiers::GateId;
use crate::core::identifiers::NodeId;
use crate::core::route::GateType;
use crate::core::route::SourceRoute;
use crate::interfaces::GatePredicate;
use crate::interfaces::PredicateError;

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Stateless boolean check attached to a node.
#[derive(Clone)]
pub struct Gate {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Gate category.
    pub gate_type: GateType,
    /// Human-readable description.
    pub description: String,
    /// Optional numeric threshold the predicate compares against.
    pub threshold: Option<f64>,
    /// Predicate; `None` means the gate is always open.
    predicate: Option<Arc<dyn GatePredicate>>,
}

impl Gate {
    /// Creates a gate with no predicate (always open).
    #[must_use]
    pub fn new(
        gate_id: impl Into<GateId>,
        gate_type: GateType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            gate_id: gate_id.into(),
            gate_type,
            description: description.into(),
            threshold: None,
            predicate: None,
        }
    }

    /// Attaches a predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl GatePredicate + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Attaches a numeric threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Returns true when the gate carries a predicate.
    #[must_use]
    pub const fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Evaluates the gate against a context.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when the predicate cannot decide.
    pub fn evaluate(&self, context: &ExecutionContext) -> Result<bool, PredicateError> {
        match &self.predicate {
            Some(predicate) => predicate.evaluate(context),
            None => Ok(true),
        }
    }

    /// Returns a serializable description of the gate.
    #[must_use]
    pub fn info(&self) -> GateInfo {
        GateInfo {
            gate_id: self.gate_id.clone(),
            gate_type: self.gate_type,
            description: self.description.clone(),
            threshold: self.threshold,
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("gate_id", &self.gate_id)
            .field("gate_type", &self.gate_type)
            .field("description", &self.description)
            .field("threshold", &self.threshold)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Serializable gate description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateInfo {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Gate category.
    pub gate_type: GateType,
    /// Human-readable description.
    pub description: String,
    /// Optional numeric threshold.
    pub threshold: Option<f64>,
}

// ============================================================================
// SECTION: Decision Node
// ============================================================================

/// Static estimates attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeEstimates {
    /// Lead time estimate in days.
    pub lead_time: f64,
    /// Cost estimate.
    pub cost: f64,
    /// Historical success rate in [0, 1].
    pub success_rate: f64,
}

impl NodeEstimates {
    /// Creates a set of estimates.
    #[must_use]
    pub const fn new(lead_time: f64, cost: f64, success_rate: f64) -> Self {
        Self {
            lead_time,
            cost,
            success_rate,
        }
    }
}

/// One route's node in the decision graph.
#[derive(Debug, Clone)]
pub struct DecisionNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// Route the node represents.
    pub route: SourceRoute,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Gates evaluated with AND semantics, in order.
    pub gates: Vec<Gate>,
    /// Next node when every gate passes.
    pub success_node: Option<NodeId>,
    /// Next node when any gate fails.
    pub failure_node: Option<NodeId>,
    /// Static estimates.
    pub estimates: NodeEstimates,
}

impl DecisionNode {
    /// Returns the edge taken for the given gate outcome.
    #[must_use]
    pub const fn next_node(&self, passed: bool) -> Option<&NodeId> {
        if passed { self.success_node.as_ref() } else { self.failure_node.as_ref() }
    }

    /// Returns a serializable description of the node.
    #[must_use]
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            node_id: self.node_id.clone(),
            route: self.route,
            route_number: self.route.number(),
            name: self.name.clone(),
            description: self.description.clone(),
            gates: self.gates.iter().map(Gate::info).collect(),
            success_node: self.success_node.clone(),
            failure_node: self.failure_node.clone(),
            estimates: self.estimates,
        }
    }
}

/// Serializable node description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    /// Node identifier.
    pub node_id: NodeId,
    /// Route.
    pub route: SourceRoute,
    /// Stable route number.
    pub route_number: u8,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Gate summaries in evaluation order.
    pub gates: Vec<GateInfo>,
    /// Success edge.
    pub success_node: Option<NodeId>,
    /// Failure edge.
    pub failure_node: Option<NodeId>,
    /// Static estimates.
    pub estimates: NodeEstimates,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Decision tree configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node id was registered twice.
    #[error("duplicate node identifier: {0}")]
    DuplicateNode(String),
    /// A gate id was attached twice to the same node.
    #[error("duplicate gate identifier {gate_id} on node {node_id}")]
    DuplicateGate {
        /// Node the gate was attached to.
        node_id: String,
        /// Repeated gate identifier.
        gate_id: String,
    },
    /// A referenced node id is not registered.
    #[error("unknown {role} node: {node_id}")]
    UnknownNode {
        /// Unregistered node identifier.
        node_id: String,
        /// Role of the reference (gate target, source, success, failure).
        role: &'static str,
    },
    /// The tree has no nodes.
    #[error("decision tree has no root node")]
    MissingRoot,
    /// The graph contains a cycle through the named node.
    #[error("decision tree contains a cycle through node {0}")]
    Cycle(String),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Incremental builder for a [`DecisionTree`].
#[derive(Debug, Default)]
pub struct DecisionTreeBuilder {
    /// Nodes keyed by id.
    nodes: BTreeMap<NodeId, DecisionNode>,
    /// Node ids in creation order.
    order: Vec<NodeId>,
}

impl DecisionTreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node. The first node created becomes the root.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateNode`] when the id is already registered.
    pub fn create_node(
        &mut self,
        node_id: impl Into<NodeId>,
        route: SourceRoute,
        name: impl Into<String>,
        description: impl Into<String>,
        estimates: NodeEstimates,
    ) -> Result<&mut Self, TreeError> {
        let node_id = node_id.into();
        if self.nodes.contains_key(&node_id) {
            return Err(TreeError::DuplicateNode(node_id.to_string()));
        }
        let node = DecisionNode {
            node_id: node_id.clone(),
            route,
            name: name.into(),
            description: description.into(),
            gates: Vec::new(),
            success_node: None,
            failure_node: None,
            estimates,
        };
        self.nodes.insert(node_id.clone(), node);
        self.order.push(node_id);
        Ok(self)
    }

    /// Appends a gate to a node's ordered gate list.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] when the node is not registered and
    /// [`TreeError::DuplicateGate`] when the node already has the gate id.
    pub fn add_gate_to_node(&mut self, node_id: &NodeId, gate: Gate) -> Result<&mut Self, TreeError> {
        let node = self.nodes.get_mut(node_id).ok_or_else(|| TreeError::UnknownNode {
            node_id: node_id.to_string(),
            role: "gate target",
        })?;
        if node.gates.iter().any(|existing| existing.gate_id == gate.gate_id) {
            return Err(TreeError::DuplicateGate {
                node_id: node_id.to_string(),
                gate_id: gate.gate_id.to_string(),
            });
        }
        node.gates.push(gate);
        Ok(self)
    }

    /// Wires a node's success edge and optional failure edge.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] when any referenced id is not registered.
    pub fn connect_nodes(
        &mut self,
        from: &NodeId,
        success: &NodeId,
        failure: Option<&NodeId>,
    ) -> Result<&mut Self, TreeError> {
        self.ensure_known(success, "success")?;
        if let Some(failure) = failure {
            self.ensure_known(failure, "failure")?;
        }
        let node = self.nodes.get_mut(from).ok_or_else(|| TreeError::UnknownNode {
            node_id: from.to_string(),
            role: "source",
        })?;
        node.success_node = Some(success.clone());
        node.failure_node = failure.cloned();
        Ok(self)
    }

    /// Validates the graph and returns the immutable tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MissingRoot`] when no node exists and
    /// [`TreeError::Cycle`] when any edge chain returns to a node.
    pub fn build(self) -> Result<DecisionTree, TreeError> {
        let root = self.order.first().cloned().ok_or(TreeError::MissingRoot)?;
        ensure_acyclic(&self.nodes, &self.order)?;
        info!(node_count = self.order.len(), root = %root, "decision tree built");
        Ok(DecisionTree {
            nodes: self.nodes,
            order: self.order,
            root,
        })
    }

    /// Ensures an edge target is registered.
    fn ensure_known(&self, node_id: &NodeId, role: &'static str) -> Result<(), TreeError> {
        if self.nodes.contains_key(node_id) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode {
                node_id: node_id.to_string(),
                role,
            })
        }
    }
}

// ============================================================================
// SECTION: Decision Tree
// ============================================================================

/// Validated, immutable decision graph.
///
/// # Invariants
/// - The root is the first node created.
/// - Every edge targets a registered node.
/// - No edge chain revisits a node.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    /// Nodes keyed by id.
    nodes: BTreeMap<NodeId, DecisionNode>,
    /// Node ids in creation order.
    order: Vec<NodeId>,
    /// Root node id.
    root: NodeId,
}

impl DecisionTree {
    /// Returns the root node id.
    #[must_use]
    pub const fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> Option<&DecisionNode> {
        self.nodes.get(&self.root)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&DecisionNode> {
        self.nodes.get(node_id)
    }

    /// Iterates nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &DecisionNode> {
        self.order.iter().filter_map(|node_id| self.nodes.get(node_id))
    }

    /// Iterates every gate in the tree, node by node.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.nodes().flat_map(|node| node.gates.iter())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when the tree has no nodes. Never true for a built tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns serializable descriptions of every node in creation order.
    #[must_use]
    pub fn node_infos(&self) -> Vec<NodeInfo> {
        self.nodes().map(DecisionNode::info).collect()
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Visit marker for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS stack.
    Active,
    /// Fully explored.
    Done,
}

/// Rejects graphs where any edge chain returns to a node.
///
/// Uses an explicit stack so deep graphs cannot exhaust the call stack.
fn ensure_acyclic(
    nodes: &BTreeMap<NodeId, DecisionNode>,
    order: &[NodeId],
) -> Result<(), TreeError> {
    let mut marks: BTreeMap<&NodeId, Mark> = BTreeMap::new();
    let mut stack: Vec<(&NodeId, usize)> = Vec::new();
    for start in order {
        if marks.contains_key(start) {
            continue;
        }
        marks.insert(start, Mark::Active);
        stack.push((start, 0));
        while let Some((node_id, edge_index)) = stack.pop() {
            let Some(next) = nodes.get(node_id).and_then(|node| edge_at(node, edge_index)) else {
                marks.insert(node_id, Mark::Done);
                continue;
            };
            stack.push((node_id, edge_index + 1));
            match marks.get(next) {
                Some(Mark::Done) => {}
                Some(Mark::Active) => return Err(TreeError::Cycle(next.to_string())),
                None => {
                    marks.insert(next, Mark::Active);
                    stack.push((next, 0));
                }
            }
        }
    }
    Ok(())
}

/// Returns the node's `index`-th outgoing edge, success before failure.
fn edge_at(node: &DecisionNode, index: usize) -> Option<&NodeId> {
    [node.success_node.as_ref(), node.failure_node.as_ref()].into_iter().flatten().nth(index)
}
