// crates/sourcing-decision-core/src/runtime/mod.rs
// ============================================================================
// Module: Sourcing Decision Runtime
// Description: Decision tree, gate manager, execution engine, and path evaluator.
// Purpose: Walk the route graph for a context and score the resulting paths.
// Dependencies: crate::{core, interfaces}, csv, serde_json, tracing
// ============================================================================

//! ## Overview
//! Runtime modules turn an [`crate::ExecutionContext`] into a scored sourcing
//! decision. The tree is built once; the engine walks it per context; the
//! evaluator ranks the resulting paths. The gate manager adds caching and an
//! audit trail to gate evaluation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod evaluator;
pub mod export;
pub mod gate_manager;
pub mod profiles;
pub mod rules;
pub mod standard;
pub mod tree;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::DEFAULT_MAX_DEPTH;
pub use engine::EngineConfig;
pub use engine::ExecutionEngine;
pub use engine::ExecutionStatistics;
pub use evaluator::CompareWeights;
pub use evaluator::FeasibilityLevel;
pub use evaluator::FeasibilityMetric;
pub use evaluator::FeasibilityScore;
pub use evaluator::PathComparison;
pub use evaluator::PathEvaluator;
pub use evaluator::RankedPath;
pub use evaluator::cost_score;
pub use evaluator::lead_time_score;
pub use export::ExportError;
pub use export::ExportFormat;
pub use export::write_csv;
pub use export::write_json;
pub use gate_manager::DEFAULT_MAX_CACHE_SIZE;
pub use gate_manager::GateConfiguration;
pub use gate_manager::GateEvaluation;
pub use gate_manager::GateLogEntry;
pub use gate_manager::GateManager;
pub use gate_manager::GateManagerConfig;
pub use gate_manager::GateState;
pub use gate_manager::GateStatistics;
pub use gate_manager::Severity;
pub use gate_manager::SeverityReport;
pub use gate_manager::SharedGateManager;
pub use profiles::RouteScoringProfile;
pub use profiles::ScoreWeights;
pub use profiles::sentinel_profile;
pub use profiles::standard_profiles;
pub use rules::GlobalRule;
pub use standard::standard_decision_tree;
pub use standard::standard_node_id;
pub use tree::DecisionNode;
pub use tree::DecisionTree;
pub use tree::DecisionTreeBuilder;
pub use tree::Gate;
pub use tree::GateInfo;
pub use tree::NodeEstimates;
pub use tree::NodeInfo;
pub use tree::TreeError;
