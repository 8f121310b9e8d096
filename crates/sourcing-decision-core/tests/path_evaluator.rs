// crates/sourcing-decision-core/tests/path_evaluator.rs
// ============================================================================
// Module: Path Evaluator Tests
// Description: Tests for feasibility scoring, comparison, and ranking.
// Purpose: Pin decay curves, budget handling, and ranking order.
// Dependencies: sourcing-decision-core, time
// ============================================================================
//! ## Overview
//! Scores hand-built and engine-produced paths against a fixed reference date.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use sourcing_decision_core::CompareWeights;
use sourcing_decision_core::Criticality;
use sourcing_decision_core::EngineConfig;
use sourcing_decision_core::ExecutionContext;
use sourcing_decision_core::ExecutionEngine;
use sourcing_decision_core::ExecutionPath;
use sourcing_decision_core::FeasibilityLevel;
use sourcing_decision_core::FeasibilityMetric;
use sourcing_decision_core::ItemId;
use sourcing_decision_core::NodeId;
use sourcing_decision_core::PathEvaluator;
use sourcing_decision_core::PathOutcome;
use sourcing_decision_core::SourceRoute;
use sourcing_decision_core::cost_score;
use sourcing_decision_core::lead_time_score;
use sourcing_decision_core::standard_decision_tree;
use sourcing_decision_core::standard_profiles;
use time::Date;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const TOLERANCE: f64 = 1e-9;

fn reference() -> Date {
    date!(2026 - 01 - 01)
}

fn required() -> Date {
    date!(2026 - 02 - 01)
}

fn evaluator() -> PathEvaluator {
    PathEvaluator::new(reference())
}

fn resolved_path(id: &str, route: SourceRoute, lead_time: f64, cost: f64) -> ExecutionPath {
    let mut path = ExecutionPath::new(id, ItemId::new("MAT"), 10.0, required());
    path.add_node_visit(NodeId::new("n"), true, Vec::new());
    path.set_outcome(PathOutcome {
        success: true,
        route,
        source: route.as_str().to_string(),
        lead_time,
        cost,
    });
    path
}

fn engine_path(context: &ExecutionContext) -> ExecutionPath {
    ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default()).execute(context)
}

// ============================================================================
// SECTION: Decay Curves
// ============================================================================

/// Tests lead-time score anchor points.
#[test]
fn test_lead_time_score_curve() {
    assert!((lead_time_score(5.0, 2.0) - 1.0).abs() < TOLERANCE);
    assert!((lead_time_score(0.0, 2.0) - 1.0).abs() < TOLERANCE);
    assert!((lead_time_score(-1.0, 2.0) - 0.75).abs() < TOLERANCE);
    assert!((lead_time_score(-2.0, 2.0) - 0.5).abs() < TOLERANCE);
    assert!((lead_time_score(-3.0, 2.0) - 0.25).abs() < TOLERANCE);
    assert!(lead_time_score(-4.0, 2.0).abs() < TOLERANCE);
    assert!(lead_time_score(-40.0, 2.0).abs() < TOLERANCE);
}

/// Tests cost score anchor points.
#[test]
fn test_cost_score_curve() {
    assert!((cost_score(0.5, 0.2) - 1.0).abs() < TOLERANCE);
    assert!((cost_score(1.0, 0.2) - 1.0).abs() < TOLERANCE);
    assert!((cost_score(1.1, 0.2) - 0.75).abs() < TOLERANCE);
    assert!((cost_score(1.2, 0.2) - 0.5).abs() < TOLERANCE);
    assert!((cost_score(1.3, 0.2) - 0.25).abs() < TOLERANCE);
    assert!(cost_score(1.4, 0.2).abs() < TOLERANCE);
    assert!(cost_score(f64::INFINITY, 0.2).abs() < TOLERANCE);
}

/// Tests zero tolerances do not divide by zero.
#[test]
fn test_zero_tolerances() {
    assert!((lead_time_score(1.0, 0.0) - 1.0).abs() < TOLERANCE);
    assert!(lead_time_score(-1.0, 0.0).abs() < TOLERANCE);
    assert!((cost_score(1.0, 0.0) - 1.0).abs() < TOLERANCE);
    assert!(cost_score(1.01, 0.0).abs() < TOLERANCE);
    assert!(cost_score(f64::NAN, 0.2).abs() < TOLERANCE);
}

// ============================================================================
// SECTION: Path Scoring
// ============================================================================

/// Tests a local stock path scores fully feasible.
#[test]
fn test_stock_path_is_fully_feasible() {
    let mut context = ExecutionContext::new("MAT-001", 50.0, required());
    context.local_stock_available = 100.0;
    let path = engine_path(&context);

    let score = evaluator().evaluate_path(&path, required(), 100.0, Criticality::Medium);

    assert_eq!(score.route, SourceRoute::StockLocal);
    assert_eq!(score.feasibility_level, FeasibilityLevel::Full);
    assert!(score.failed_metrics().is_empty());
    assert!((score.margin_days - 30.0).abs() < TOLERANCE);
    assert!((score.cost_ratio - 0.1).abs() < TOLERANCE);
    assert!((score.risk_score - 0.95).abs() < TOLERANCE);
    assert!((score.quality_score - 0.99).abs() < TOLERANCE);
    assert!((score.composite_score - 0.9775).abs() < TOLERANCE);
    assert!(score.notes.is_empty());
}

/// Tests a route outside the criticality's tag set is only partially feasible.
#[test]
fn test_criticality_mismatch() {
    let path = resolved_path("p", SourceRoute::Purchase, 14.0, 50.0);

    let medium = evaluator().evaluate_path(&path, required(), 100.0, Criticality::Medium);
    assert!(!medium.criticality_match);
    assert_eq!(medium.feasibility_level, FeasibilityLevel::Partial);
    assert_eq!(medium.failed_metrics(), vec![FeasibilityMetric::Criticality]);

    let expedite = resolved_path("e", SourceRoute::Expedite, 1.0, 100.0);
    let high = evaluator().evaluate_path(&expedite, required(), 200.0, Criticality::High);
    assert!(high.criticality_match);
}

/// Tests late, over-budget, failed paths collect notes and low levels.
#[test]
fn test_failed_path_notes_and_level() {
    let mut context = ExecutionContext::new("MAT-003", 50.0, required());
    context.supplier_available = false;
    let path = engine_path(&context);

    let score = evaluator().evaluate_path(&path, required(), 100.0, Criticality::Critical);

    assert!(!score.success);
    assert!(!score.lead_time_ok);
    assert!(!score.cost_ok);
    assert!(score.success_score.abs() < TOLERANCE);
    assert_eq!(score.feasibility_level, FeasibilityLevel::Infeasible);
    assert_eq!(score.notes.len(), 3);
    assert!(score.notes[0].contains("did not reach"));
    assert!((0.0..=1.0).contains(&score.composite_score));
}

/// Tests a zero budget is never within budget.
#[test]
fn test_zero_budget_always_over() {
    let path = resolved_path("p", SourceRoute::StockLocal, 1.0, 0.0);
    let score = evaluator().evaluate_path(&path, required(), 0.0, Criticality::Low);
    assert!(!score.cost_ok);
    assert!(score.cost_ratio.is_infinite());
    assert!(score.cost_score.abs() < TOLERANCE);
    assert!(score.notes.iter().any(|note| note.contains("cost exceeds budget")));
}

/// Tests lateness measured from the reference date.
#[test]
fn test_lateness_uses_reference_date() {
    let path = resolved_path("p", SourceRoute::Purchase, 14.0, 10.0);
    let late = PathEvaluator::new(date!(2026 - 01 - 20));

    let score = late.evaluate_path(&path, required(), 100.0, Criticality::Medium);

    assert!((score.margin_days + 2.0).abs() < TOLERANCE);
    assert!(!score.lead_time_ok);
    assert!((score.lead_time_score - 0.5).abs() < TOLERANCE);
    assert!(score.notes.iter().any(|note| note == "lead time exceeds requirement by 2.0 days"));
}

/// Tests routes missing from a custom profile map use the sentinel weights.
#[test]
fn test_missing_profile_uses_sentinel() {
    let mut profiles = standard_profiles();
    profiles.remove(&SourceRoute::Loan);
    let evaluator = PathEvaluator::with_profiles(reference(), profiles);
    assert!(evaluator.profile(SourceRoute::Loan).is_none());

    let path = resolved_path("p", SourceRoute::Loan, 2.0, 50.0);
    let score = evaluator.evaluate_path(&path, required(), 100.0, Criticality::Medium);
    assert!((score.composite_score - 1.0).abs() < TOLERANCE);
}

/// Tests every standard profile's weights sum to one.
#[test]
fn test_profile_weights_sum_to_one() {
    let profiles = standard_profiles();
    assert_eq!(profiles.len(), 12);
    for profile in profiles.values() {
        assert!((profile.weights.total() - 1.0).abs() < TOLERANCE, "{}", profile.route);
    }
}

// ============================================================================
// SECTION: Comparison and Ranking
// ============================================================================

/// Tests comparison picks the highest combined score.
#[test]
fn test_compare_paths_picks_best() {
    let paths = vec![
        resolved_path("late", SourceRoute::Purchase, 60.0, 50.0),
        resolved_path("good", SourceRoute::Purchase, 14.0, 50.0),
    ];
    let comparison = evaluator()
        .compare_paths(&paths, required(), 100.0, Criticality::Medium, None)
        .unwrap();

    assert_eq!(comparison.best_index, 1);
    assert_eq!(comparison.best_path_id.as_str(), "good");
    assert_eq!(comparison.scores.len(), 2);
    assert!((comparison.best_score - comparison.combined_scores[1]).abs() < TOLERANCE);

    let cost_only = CompareWeights {
        composite: 0.0,
        lead_time: 0.0,
        cost: 1.0,
    };
    let tied = evaluator()
        .compare_paths(&paths, required(), 100.0, Criticality::Medium, Some(cost_only))
        .unwrap();
    assert_eq!(tied.best_index, 0);

    assert!(evaluator().compare_paths(&[], required(), 100.0, Criticality::Medium, None).is_none());
}

/// Tests equal composites rank by ascending cost with 1-based ranks.
#[test]
fn test_rank_paths_breaks_ties_by_cost() {
    let paths = vec![
        resolved_path("p600", SourceRoute::Purchase, 14.0, 600.0),
        resolved_path("p400", SourceRoute::Purchase, 14.0, 400.0),
        resolved_path("p500", SourceRoute::Purchase, 14.0, 500.0),
    ];
    let ranked = evaluator().rank_paths(&paths, required(), 1000.0, Criticality::Medium);

    let order: Vec<(usize, &str)> =
        ranked.iter().map(|entry| (entry.rank, entry.path.path_id.as_str())).collect();
    assert_eq!(order, vec![(1, "p400"), (2, "p500"), (3, "p600")]);
    assert!(ranked.windows(2).all(|pair| pair[0].score.composite_score >= pair[1].score.composite_score));
}

/// Tests the higher composite outranks a cheaper path.
#[test]
fn test_rank_paths_prefers_composite() {
    let paths = vec![
        resolved_path("late", SourceRoute::Purchase, 60.0, 10.0),
        resolved_path("ontime", SourceRoute::Purchase, 14.0, 90.0),
    ];
    let ranked = evaluator().rank_paths(&paths, required(), 100.0, Criticality::Medium);
    assert_eq!(ranked[0].path.path_id.as_str(), "ontime");
    assert_eq!(ranked[1].rank, 2);
}
