//! Traversal and scoring property-based tests for sourcing decision core.
//!
//! ## Purpose
//! These tests drive randomized contexts through the standard tree and the
//! path evaluator to check structural invariants that must hold for every
//! input, not only the curated scenarios.
//!
//! ## What is covered
//! - Visited sequences are non-empty, duplicate-free, and bounded by depth.
//! - Successful paths resolve to an operational route with finite totals.
//! - Composite scores stay in [0, 1] and levels match the failed metrics.
//! - Feasibility never improves when a path fails more or conditions tighten.
//! - Decay curves are bounded and non-increasing.
// crates/sourcing-decision-core/tests/proptest_invariants.rs
// ============================================================================
// Module: Traversal Property-Based Tests
// Description: Randomized checks for traversal and scoring invariants.
// Purpose: Ensure invariants hold across arbitrary contexts without panics.
// ============================================================================

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use sourcing_decision_core::Criticality;
use sourcing_decision_core::EngineConfig;
use sourcing_decision_core::ExecutionContext;
use sourcing_decision_core::ExecutionEngine;
use sourcing_decision_core::ExecutionPath;
use sourcing_decision_core::FeasibilityLevel;
use sourcing_decision_core::GateId;
use sourcing_decision_core::ItemId;
use sourcing_decision_core::NodeId;
use sourcing_decision_core::PathEvaluator;
use sourcing_decision_core::PathOutcome;
use sourcing_decision_core::SourceRoute;
use sourcing_decision_core::cost_score;
use sourcing_decision_core::lead_time_score;
use sourcing_decision_core::standard_decision_tree;
use time::Duration;
use time::macros::date;

fn criticality() -> impl Strategy<Value = Criticality> {
    prop_oneof![
        Just(Criticality::Low),
        Just(Criticality::Medium),
        Just(Criticality::High),
        Just(Criticality::Critical),
    ]
}

fn operational_route() -> impl Strategy<Value = SourceRoute> {
    prop::sample::select(
        SourceRoute::ALL.iter().copied().filter(|route| !route.is_sentinel()).collect::<Vec<_>>(),
    )
}

/// Builds a path with `failed_nodes` failed visits before one passing visit.
fn scripted_path(
    route: SourceRoute,
    failed_nodes: usize,
    succeeded: bool,
    lead_time: f64,
    cost: f64,
) -> ExecutionPath {
    let mut path = ExecutionPath::new("P-1", ItemId::new("MAT-P"), 10.0, date!(2026 - 02 - 01));
    for index in 0..failed_nodes {
        path.add_node_visit(
            NodeId::new(format!("failed_{index}")),
            false,
            vec![GateId::new(format!("gate_{index}"))],
        );
    }
    path.add_node_visit(NodeId::new("resolved"), true, Vec::new());
    let outcome = if succeeded {
        PathOutcome {
            success: true,
            route,
            source: route.as_str().to_string(),
            lead_time,
            cost,
        }
    } else {
        PathOutcome::failed(route, route.as_str())
    };
    path.set_outcome(outcome);
    path
}

prop_compose! {
    fn arbitrary_context()(
        demand in 0.0f64..500.0,
        stock in 0.0f64..500.0,
        assets in prop_oneof![Just(0.0f64), 0.0f64..50.0],
        has_bom in any::<bool>(),
        has_substitute in any::<bool>(),
        transfer in prop_oneof![Just(0.0f64), 0.0f64..500.0],
        relationships in any::<(bool, bool, bool)>(),
        expedite in any::<(bool, bool)>(),
        supplier in any::<bool>(),
        budget in prop_oneof![Just(f64::INFINITY), 0.0f64..100.0],
        criticality in criticality(),
    ) -> ExecutionContext {
        let mut context = ExecutionContext::new("MAT-P", demand, date!(2026 - 02 - 01));
        context.local_stock_available = stock;
        context.local_assets_available = assets;
        if has_bom {
            context.bom_components_available.insert("component".to_string(), 1.0);
        }
        if has_substitute {
            context.substitutes_available.push("MAT-P-ALT".to_string());
        }
        context.transfer_centers_available.insert("north".to_string(), transfer);
        (context.intercompany_available, context.vmi_contract_active, context.loan_partner_available) =
            relationships;
        context.can_expedite = expedite.0;
        context.expedite_budget_available = if expedite.1 { 200.0 } else { 0.0 };
        context.supplier_available = supplier;
        context.budget_available = budget;
        context.criticality = criticality;
        context
    }
}

proptest! {
    #[test]
    fn traversal_visits_are_bounded_and_unique(
        context in arbitrary_context(),
        max_depth in 1usize..=14,
    ) {
        let engine = ExecutionEngine::new(
            standard_decision_tree().unwrap(),
            EngineConfig { max_depth, use_gate_cache: true },
        );
        let path = engine.execute(&context);

        prop_assert!(!path.visited_nodes.is_empty());
        prop_assert!(path.visited_nodes.len() <= max_depth);
        let unique: BTreeSet<_> = path.visited_nodes.iter().collect();
        prop_assert_eq!(unique.len(), path.visited_nodes.len());
        prop_assert!(path.visited_nodes.iter().all(|node| path.node_results.contains_key(node)));
        if path.depth_exhausted {
            prop_assert_eq!(path.final_route, None);
            prop_assert!(!path.final_success);
        }
    }

    #[test]
    fn successful_paths_resolve_operational_routes(context in arbitrary_context()) {
        let engine = ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default());
        let path = engine.execute(&context);
        let again = engine.execute(&context);

        prop_assert!(!path.depth_exhausted);
        prop_assert_eq!(&path.visited_nodes, &again.visited_nodes);
        prop_assert_eq!(path.final_route, again.final_route);
        if path.final_success {
            let route = path.final_route.unwrap();
            prop_assert!(!route.is_sentinel());
            prop_assert!(path.total_cost.is_finite());
            prop_assert!(path.total_lead_time.is_finite());
        } else {
            prop_assert!(path.total_cost.is_infinite());
        }
        if context.supplier_available {
            prop_assert!(path.final_success);
        }
    }

    #[test]
    fn composite_scores_are_bounded(
        context in arbitrary_context(),
        max_budget in prop_oneof![Just(0.0f64), Just(-5.0f64), 0.0f64..500.0],
    ) {
        let engine = ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default());
        let path = engine.execute(&context);
        let evaluator = PathEvaluator::new(date!(2026 - 01 - 01));
        let score = evaluator.evaluate_path(&path, context.required_date, max_budget, context.criticality);

        prop_assert!((0.0..=1.0).contains(&score.composite_score));
        prop_assert!((0.0..=1.0).contains(&score.risk_score));
        prop_assert_eq!(
            score.feasibility_level,
            FeasibilityLevel::from_failed_count(score.failed_metrics().len())
        );
        if max_budget <= 0.0 {
            prop_assert!(!score.cost_ok);
        }
    }

    #[test]
    fn feasibility_never_improves_with_more_failures(
        route in operational_route(),
        lead_time in 0.0f64..40.0,
        cost in 0.0f64..500.0,
        succeeded in any::<bool>(),
        failed_nodes in 0usize..6,
        extra_failed_nodes in 0usize..6,
        outcome_fails in any::<bool>(),
        max_budget in prop_oneof![Just(0.0f64), Just(f64::INFINITY), 1.0f64..1000.0],
        criticality in criticality(),
    ) {
        let evaluator = PathEvaluator::new(date!(2026 - 01 - 01));
        let required = date!(2026 - 01 - 21);
        let better = scripted_path(route, failed_nodes, succeeded, lead_time, cost);
        let worse = scripted_path(
            route,
            failed_nodes + extra_failed_nodes,
            succeeded && !outcome_fails,
            lead_time,
            cost,
        );
        let better = evaluator.evaluate_path(&better, required, max_budget, criticality);
        let worse = evaluator.evaluate_path(&worse, required, max_budget, criticality);

        let better_failed: BTreeSet<_> = better.failed_metrics().into_iter().collect();
        let worse_failed: BTreeSet<_> = worse.failed_metrics().into_iter().collect();
        prop_assert!(better_failed.is_subset(&worse_failed));
        prop_assert!(better.feasibility_level <= worse.feasibility_level);
        if !outcome_fails {
            prop_assert_eq!(better.feasibility_level, worse.feasibility_level);
        }
    }

    #[test]
    fn feasibility_never_improves_under_tighter_limits(
        route in operational_route(),
        lead_time in 0.0f64..40.0,
        cost in 0.0f64..500.0,
        succeeded in any::<bool>(),
        days_ahead in 0i64..60,
        days_earlier in 0i64..60,
        max_budget in 1.0f64..1000.0,
        budget_factor in 0.0f64..=1.0,
        criticality in criticality(),
    ) {
        let evaluator = PathEvaluator::new(date!(2026 - 01 - 01));
        let path = scripted_path(route, 1, succeeded, lead_time, cost);
        let relaxed_date = date!(2026 - 01 - 01) + Duration::days(days_ahead);
        let strict_date = relaxed_date - Duration::days(days_earlier);

        let relaxed = evaluator.evaluate_path(&path, relaxed_date, max_budget, criticality);
        let strict =
            evaluator.evaluate_path(&path, strict_date, max_budget * budget_factor, criticality);

        let relaxed_failed: BTreeSet<_> = relaxed.failed_metrics().into_iter().collect();
        let strict_failed: BTreeSet<_> = strict.failed_metrics().into_iter().collect();
        prop_assert!(relaxed_failed.is_subset(&strict_failed));
        prop_assert!(relaxed.feasibility_level <= strict.feasibility_level);
    }

    #[test]
    fn decay_curves_are_bounded_and_monotonic(
        first in -50.0f64..50.0,
        second in -50.0f64..50.0,
        tolerance in 0.0f64..5.0,
    ) {
        let (low, high) = if first <= second { (first, second) } else { (second, first) };
        let lead_low = lead_time_score(low, tolerance);
        let lead_high = lead_time_score(high, tolerance);
        prop_assert!((0.0..=1.0).contains(&lead_low));
        prop_assert!(lead_low <= lead_high);

        let cost_low = cost_score(1.0 + low.abs() / 10.0, tolerance);
        let cost_high = cost_score(1.0 + high.abs() / 10.0, tolerance);
        prop_assert!((0.0..=1.0).contains(&cost_low));
        prop_assert!((0.0..=1.0).contains(&cost_high));
        if low.abs() <= high.abs() {
            prop_assert!(cost_low >= cost_high);
        }
    }
}
