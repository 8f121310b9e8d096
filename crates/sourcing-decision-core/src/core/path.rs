// crates/sourcing-decision-core/src/core/path.rs
// ============================================================================
// Module: Execution Path
// Description: Per-run accumulator describing one traversal of the decision tree.
// Purpose: Record visited nodes, per-node gate results, and the final outcome.
// Dependencies: crate::core::{identifiers, route}, serde, time
// ============================================================================

//! ## Overview
//! An [`ExecutionPath`] is produced by one `execute` call. Visits are appended
//! in walk order and never rewritten. The outcome fields are set exactly once
//! when the walk reaches a terminal node or a dead end.
//!
//! A path that never reached a terminal node (depth exhausted) keeps
//! `final_success = false` and `final_route = None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::core::identifiers::GateId;
use crate::core::identifiers::ItemId;
use crate::core::identifiers::NodeId;
use crate::core::identifiers::PathId;
use crate::core::route::SourceRoute;

// ============================================================================
// SECTION: Node Results
// ============================================================================

/// Gate outcome for one visited node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResult {
    /// True when every gate on the node passed.
    pub passed: bool,
    /// Gates that failed, in evaluation order.
    pub failed_gates: Vec<GateId>,
}

/// Final outcome recorded on a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    /// Whether a viable route was found.
    pub success: bool,
    /// Route the outcome resolved to.
    pub route: SourceRoute,
    /// Human-readable source label.
    pub source: String,
    /// Total lead time in days.
    pub lead_time: f64,
    /// Total cost.
    pub cost: f64,
}

impl PathOutcome {
    /// Outcome for a path that found no viable route.
    #[must_use]
    pub fn failed(route: SourceRoute, source: impl Into<String>) -> Self {
        Self {
            success: false,
            route,
            source: source.into(),
            lead_time: f64::INFINITY,
            cost: f64::INFINITY,
        }
    }
}

// ============================================================================
// SECTION: Execution Path
// ============================================================================

/// Accumulated result of one traversal.
///
/// # Invariants
/// - `visited_nodes` is append-only and in walk order.
/// - Every id in `visited_nodes` has an entry in `node_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPath {
    /// Path identifier.
    pub path_id: PathId,
    /// Item the path was computed for.
    pub item_id: ItemId,
    /// Demand quantity from the context.
    pub demand_quantity: f64,
    /// Required date from the context.
    pub required_date: Date,
    /// Visited node ids in walk order.
    pub visited_nodes: Vec<NodeId>,
    /// Gate results per visited node.
    pub node_results: BTreeMap<NodeId, NodeResult>,
    /// Whether a viable route was found.
    pub final_success: bool,
    /// Route the path resolved to, if it reached a terminal.
    pub final_route: Option<SourceRoute>,
    /// Total lead time in days.
    #[serde(with = "crate::core::unbounded")]
    pub total_lead_time: f64,
    /// Total cost.
    #[serde(with = "crate::core::unbounded")]
    pub total_cost: f64,
    /// Human-readable source label.
    pub selected_source: Option<String>,
    /// True when the walk stopped at the depth bound.
    pub depth_exhausted: bool,
}

impl ExecutionPath {
    /// Creates an empty path for one context.
    #[must_use]
    pub fn new(
        path_id: impl Into<PathId>,
        item_id: ItemId,
        demand_quantity: f64,
        required_date: Date,
    ) -> Self {
        Self {
            path_id: path_id.into(),
            item_id,
            demand_quantity,
            required_date,
            visited_nodes: Vec::new(),
            node_results: BTreeMap::new(),
            final_success: false,
            final_route: None,
            total_lead_time: 0.0,
            total_cost: 0.0,
            selected_source: None,
            depth_exhausted: false,
        }
    }

    /// Appends a node visit and its gate results.
    pub fn add_node_visit(&mut self, node_id: NodeId, passed: bool, failed_gates: Vec<GateId>) {
        self.node_results.insert(
            node_id.clone(),
            NodeResult {
                passed,
                failed_gates,
            },
        );
        self.visited_nodes.push(node_id);
    }

    /// Records the final outcome.
    pub fn set_outcome(&mut self, outcome: PathOutcome) {
        self.final_success = outcome.success;
        self.final_route = Some(outcome.route);
        self.selected_source = Some(outcome.source);
        self.total_lead_time = outcome.lead_time;
        self.total_cost = outcome.cost;
    }

    /// Returns the gate result for the last visited node.
    #[must_use]
    pub fn last_result(&self) -> Option<&NodeResult> {
        self.visited_nodes.last().and_then(|node_id| self.node_results.get(node_id))
    }

    /// Total number of failed gates across all visited nodes.
    #[must_use]
    pub fn num_gates_failed(&self) -> usize {
        self.node_results.values().map(|result| result.failed_gates.len()).sum()
    }

    /// Returns a flat, serializable summary of the path.
    #[must_use]
    pub fn summary(&self) -> PathSummary {
        PathSummary {
            path_id: self.path_id.clone(),
            item_id: self.item_id.clone(),
            demand_quantity: self.demand_quantity,
            required_date: self.required_date.to_string(),
            success: self.final_success,
            route: self.final_route.map(SourceRoute::as_str),
            route_number: self.final_route.map(SourceRoute::number),
            source: self.selected_source.clone(),
            lead_time_days: self.total_lead_time,
            cost: self.total_cost,
            nodes_visited: self
                .visited_nodes
                .iter()
                .map(NodeId::as_str)
                .collect::<Vec<_>>()
                .join(" > "),
            num_nodes: self.visited_nodes.len(),
            num_gates_failed: self.num_gates_failed(),
            depth_exhausted: self.depth_exhausted,
        }
    }
}

// ============================================================================
// SECTION: Path Summary
// ============================================================================

/// Flat view of an [`ExecutionPath`] suitable for JSON and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSummary {
    /// Path identifier.
    pub path_id: PathId,
    /// Item identifier.
    pub item_id: ItemId,
    /// Demand quantity.
    pub demand_quantity: f64,
    /// ISO-8601 required date.
    pub required_date: String,
    /// Whether a viable route was found.
    pub success: bool,
    /// Route name.
    pub route: Option<&'static str>,
    /// Route number.
    pub route_number: Option<u8>,
    /// Source label.
    pub source: Option<String>,
    /// Total lead time in days.
    #[serde(serialize_with = "crate::core::unbounded::serialize")]
    pub lead_time_days: f64,
    /// Total cost.
    #[serde(serialize_with = "crate::core::unbounded::serialize")]
    pub cost: f64,
    /// Visited node ids joined with `>`.
    pub nodes_visited: String,
    /// Number of visited nodes.
    pub num_nodes: usize,
    /// Number of failed gates.
    pub num_gates_failed: usize,
    /// True when the walk stopped at the depth bound.
    pub depth_exhausted: bool,
}
