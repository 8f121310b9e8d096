// crates/sourcing-decision-core/src/runtime/engine.rs
// ============================================================================
// Module: Execution Engine
// Description: Deterministic traversal of the decision tree for one context.
// Purpose: Produce an execution path per context, optionally via a gate manager.
// Dependencies: crate::{core, runtime}, serde, tracing
// ============================================================================

//! ## Overview
//! [`ExecutionEngine::execute`] starts at the root, evaluates every gate of
//! the current node (AND semantics), records the visit, and follows the success
//! or failure edge until it reaches a node without the needed edge or the depth
//! bound.
//!
//! A terminal node on the sentinel route resolves the outcome to the first
//! operational node on the path whose gates all passed. Paths with no such node
//! fail with infinite cost and lead time.
//!
//! When the engine holds a [`SharedGateManager`], gate evaluation goes through
//! the manager so results are cached and audited. A poisoned manager lock is
//! logged and gates are evaluated directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::core::context::ExecutionContext;
use crate::core::identifiers::GateId;
use crate::core::identifiers::PathId;
use crate::core::path::ExecutionPath;
use crate::core::path::PathOutcome;
use crate::core::path::PathSummary;
use crate::core::route::SourceRoute;
use crate::runtime::export::ExportFormat;
use crate::runtime::export::export_records;
use crate::runtime::gate_manager::SharedGateManager;
use crate::runtime::tree::DecisionNode;
use crate::runtime::tree::DecisionTree;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default traversal depth bound.
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of nodes visited per path.
    pub max_depth: usize,
    /// Whether gate evaluations through a manager use its cache.
    pub use_gate_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            use_gate_cache: true,
        }
    }
}

impl EngineConfig {
    /// Returns the settings with `max_depth` raised to at least one, so the
    /// root is always visited.
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            max_depth: if self.max_depth == 0 { 1 } else { self.max_depth },
            use_gate_cache: self.use_gate_cache,
        }
    }
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Aggregate view over a batch of paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStatistics {
    /// Number of paths.
    pub total_paths: usize,
    /// Paths that found a viable route.
    pub successful_paths: usize,
    /// Paths that did not.
    pub failed_paths: usize,
    /// Successful paths divided by total paths.
    pub success_rate: f64,
    /// Mean lead time over successful paths; zero when none succeeded.
    pub average_lead_time: f64,
    /// Mean cost over successful paths; zero when none succeeded.
    pub average_cost: f64,
    /// Number of paths resolved to each route.
    pub routes_used: BTreeMap<SourceRoute, usize>,
    /// Paths that stopped at the depth bound.
    pub depth_exhausted: usize,
}

// ============================================================================
// SECTION: Execution Engine
// ============================================================================

/// Walks a decision tree for execution contexts.
pub struct ExecutionEngine {
    /// Tree being walked.
    tree: DecisionTree,
    /// Engine settings.
    config: EngineConfig,
    /// Optional manager gates are evaluated through.
    gate_manager: Option<SharedGateManager>,
    /// Per-engine path sequence.
    sequence: AtomicU64,
}

impl ExecutionEngine {
    /// Creates an engine that evaluates gates directly.
    ///
    /// A `max_depth` of zero is raised to one.
    #[must_use]
    pub const fn new(tree: DecisionTree, config: EngineConfig) -> Self {
        Self {
            tree,
            config: config.clamped(),
            gate_manager: None,
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an engine that evaluates gates through a shared manager.
    ///
    /// Tree gates missing from the manager are registered with default
    /// configuration; gates already registered keep their configuration.
    /// A `max_depth` of zero is raised to one.
    #[must_use]
    pub fn with_gate_manager(
        tree: DecisionTree,
        config: EngineConfig,
        gate_manager: SharedGateManager,
    ) -> Self {
        match gate_manager.lock() {
            Ok(mut manager) => {
                for gate in tree.gates() {
                    if !manager.contains_gate(&gate.gate_id) {
                        manager.register_gate(gate.clone(), None);
                    }
                }
            }
            Err(_) => warn!("gate manager mutex poisoned, tree gates not registered"),
        }
        Self {
            tree,
            config: config.clamped(),
            gate_manager: Some(gate_manager),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the tree.
    #[must_use]
    pub const fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// Returns the shared gate manager, if any.
    #[must_use]
    pub const fn gate_manager(&self) -> Option<&SharedGateManager> {
        self.gate_manager.as_ref()
    }

    /// Walks the tree for one context.
    #[must_use]
    pub fn execute(&self, context: &ExecutionContext) -> ExecutionPath {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let path_id = PathId::new(format!("{}-{sequence:06}", context.item_id));
        let mut path = ExecutionPath::new(
            path_id,
            context.item_id.clone(),
            context.demand_quantity,
            context.required_date,
        );
        info!(
            path_id = %path.path_id,
            item_id = %context.item_id,
            demand = context.demand_quantity,
            required_date = %context.required_date,
            "execution started"
        );

        let mut current = Some(self.tree.root_id().clone());
        while let Some(node_id) = current.take() {
            if path.visited_nodes.len() >= self.config.max_depth {
                path.depth_exhausted = true;
                warn!(
                    path_id = %path.path_id,
                    max_depth = self.config.max_depth,
                    next_node = %node_id,
                    "max depth reached without a terminal node"
                );
                return path;
            }
            let Some(node) = self.tree.node(&node_id) else {
                warn!(path_id = %path.path_id, node_id = %node_id, "edge targets missing node");
                path.set_outcome(PathOutcome::failed(SourceRoute::FinalResult, node_id.as_str()));
                return path;
            };
            let (passed, failed_gates) = self.evaluate_node(node, context);
            debug!(
                path_id = %path.path_id,
                node_id = %node_id,
                route = %node.route,
                passed,
                failed = failed_gates.len(),
                "node evaluated"
            );
            path.add_node_visit(node_id, passed, failed_gates);
            match node.next_node(passed) {
                Some(next) => current = Some(next.clone()),
                None => self.finish(&mut path, node, passed),
            }
        }
        path
    }

    /// Walks the tree for each context independently.
    #[must_use]
    pub fn execute_batch(&self, contexts: &[ExecutionContext]) -> Vec<ExecutionPath> {
        contexts.iter().map(|context| self.execute(context)).collect()
    }

    /// Aggregates statistics over completed paths. Returns `None` for no paths.
    #[must_use]
    pub fn get_execution_statistics(paths: &[ExecutionPath]) -> Option<ExecutionStatistics> {
        if paths.is_empty() {
            return None;
        }
        let successful: Vec<&ExecutionPath> = paths.iter().filter(|path| path.final_success).collect();
        let mut routes_used = BTreeMap::new();
        for route in paths.iter().filter_map(|path| path.final_route) {
            *routes_used.entry(route).or_insert(0) += 1;
        }
        #[allow(clippy::cast_precision_loss, reason = "Batch sizes stay far below 2^52.")]
        let (success_rate, average_lead_time, average_cost) = {
            let total = paths.len() as f64;
            let count = successful.len() as f64;
            if successful.is_empty() {
                (0.0, 0.0, 0.0)
            } else {
                (
                    count / total,
                    successful.iter().map(|path| path.total_lead_time).sum::<f64>() / count,
                    successful.iter().map(|path| path.total_cost).sum::<f64>() / count,
                )
            }
        };
        Some(ExecutionStatistics {
            total_paths: paths.len(),
            successful_paths: successful.len(),
            failed_paths: paths.len() - successful.len(),
            success_rate,
            average_lead_time,
            average_cost,
            routes_used,
            depth_exhausted: paths.iter().filter(|path| path.depth_exhausted).count(),
        })
    }

    /// Writes path summaries as JSON or CSV.
    ///
    /// Returns false when the file cannot be written.
    #[must_use]
    pub fn export_execution_log(
        &self,
        paths: &[ExecutionPath],
        file: &Path,
        format: ExportFormat,
    ) -> bool {
        let summaries: Vec<PathSummary> = paths.iter().map(ExecutionPath::summary).collect();
        export_records("execution_log", file, format, &summaries, &summaries)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Evaluates every gate of a node and returns (passed, failed gate ids).
    fn evaluate_node(
        &self,
        node: &DecisionNode,
        context: &ExecutionContext,
    ) -> (bool, Vec<GateId>) {
        if let Some(shared) = &self.gate_manager {
            match shared.lock() {
                Ok(mut manager) => {
                    let failed: Vec<GateId> = node
                        .gates
                        .iter()
                        .filter(|gate| {
                            !manager.evaluate_gate(&gate.gate_id, context, self.config.use_gate_cache).0
                        })
                        .map(|gate| gate.gate_id.clone())
                        .collect();
                    return (failed.is_empty(), failed);
                }
                Err(_) => {
                    warn!(node_id = %node.node_id, "gate manager mutex poisoned, evaluating directly");
                }
            }
        }
        let failed: Vec<GateId> = node
            .gates
            .iter()
            .filter(|gate| match gate.evaluate(context) {
                Ok(passed) => !passed,
                Err(err) => {
                    error!(gate_id = %gate.gate_id, node_id = %node.node_id, error = %err, "gate predicate failed");
                    true
                }
            })
            .map(|gate| gate.gate_id.clone())
            .collect();
        (failed.is_empty(), failed)
    }

    /// Records the outcome at a node without the edge the walk needed.
    fn finish(&self, path: &mut ExecutionPath, node: &DecisionNode, passed: bool) {
        if !passed {
            warn!(path_id = %path.path_id, node_id = %node.node_id, "path failed at dead end");
            path.set_outcome(PathOutcome::failed(node.route, node.name.as_str()));
            return;
        }
        let resolved = if node.route.is_sentinel() { self.first_passed_operational(path) } else { Some(node) };
        match resolved {
            Some(source) => {
                info!(path_id = %path.path_id, route = %source.route, source = %source.name, "execution succeeded");
                path.set_outcome(PathOutcome {
                    success: true,
                    route: source.route,
                    source: source.name.clone(),
                    lead_time: source.estimates.lead_time,
                    cost: source.estimates.cost,
                });
            }
            None => {
                warn!(path_id = %path.path_id, "no operational route passed");
                path.set_outcome(PathOutcome::failed(node.route, node.name.as_str()));
            }
        }
    }

    /// Returns the first visited operational node whose gates all passed.
    fn first_passed_operational(&self, path: &ExecutionPath) -> Option<&DecisionNode> {
        path.visited_nodes
            .iter()
            .filter(|node_id| path.node_results.get(*node_id).is_some_and(|result| result.passed))
            .filter_map(|node_id| self.tree.node(node_id))
            .find(|node| !node.route.is_sentinel())
    }
}
