// crates/sourcing-decision-core/tests/audit_export.rs
// ============================================================================
// Module: Audit Export Tests
// Description: Tests for JSON and CSV exports of audit, path, and score records.
// Purpose: Ensure exports are complete and failures are reported, not raised.
// Dependencies: sourcing-decision-core, serde_json, tempfile, time
// ============================================================================
//! ## Overview
//! Writes exports into temporary directories and reads them back.

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

use std::fs;
use std::sync::Arc;

use sourcing_decision_core::Criticality;
use sourcing_decision_core::EngineConfig;
use sourcing_decision_core::ExecutionContext;
use sourcing_decision_core::ExecutionEngine;
use sourcing_decision_core::ExecutionPath;
use sourcing_decision_core::ExportFormat;
use sourcing_decision_core::FixedClock;
use sourcing_decision_core::GateEvaluation;
use sourcing_decision_core::GateManager;
use sourcing_decision_core::GateManagerConfig;
use sourcing_decision_core::PathEvaluator;
use sourcing_decision_core::SharedGateManager;
use sourcing_decision_core::standard_decision_tree;
use time::macros::date;
use time::macros::datetime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn contexts() -> Vec<ExecutionContext> {
    let mut stock = ExecutionContext::new("MAT-001", 5.0, date!(2026 - 02 - 01));
    stock.local_stock_available = 10.0;
    let purchase = ExecutionContext::new("MAT-002", 5.0, date!(2026 - 02 - 01));
    vec![stock, purchase]
}

fn audited_engine() -> (ExecutionEngine, SharedGateManager) {
    let manager = GateManager::with_clock(
        GateManagerConfig::default(),
        Arc::new(FixedClock::new(datetime!(2026-01-15 08:00 UTC))),
    );
    let shared = manager.into_shared();
    let engine = ExecutionEngine::with_gate_manager(
        standard_decision_tree().unwrap(),
        EngineConfig::default(),
        shared.clone(),
    );
    (engine, shared)
}

// ============================================================================
// SECTION: Audit Log
// ============================================================================

/// Tests the JSON audit log contains every recorded evaluation.
#[test]
fn test_audit_log_json() {
    let (engine, shared) = audited_engine();
    let _ = engine.execute_batch(&contexts());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("audit.json");

    let manager = shared.lock().unwrap();
    assert!(manager.export_audit_log(&file, ExportFormat::Json));

    let text = fs::read_to_string(&file).unwrap();
    let records: Vec<GateEvaluation> = serde_json::from_str(&text).unwrap();
    assert_eq!(records.len(), manager.history().len());
    assert_eq!(records.as_slice(), manager.history());
    assert!(text.contains("2026-01-15T08:00:00Z"));
}

/// Tests the CSV audit log has a header and one row per evaluation.
#[test]
fn test_audit_log_csv() {
    let (engine, shared) = audited_engine();
    let _ = engine.execute_batch(&contexts());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("audit.csv");

    let manager = shared.lock().unwrap();
    assert!(manager.export_audit_log(&file, ExportFormat::Csv));

    let text = fs::read_to_string(&file).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("gate_id,gate_type,state,result,context_hash,timestamp,notes")
    );
    assert_eq!(lines.count(), manager.history().len());
}

/// Tests an unwritable destination reports failure instead of raising.
#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("missing").join("audit.json");
    let manager = GateManager::default();
    assert!(!manager.export_audit_log(&file, ExportFormat::Json));
    assert!(!manager.export_audit_log(&file, ExportFormat::Csv));
}

// ============================================================================
// SECTION: Execution Log and Feasibility Report
// ============================================================================

/// Tests the execution log carries one summary per path.
#[test]
fn test_execution_log_exports() {
    let engine = ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default());
    let paths = engine.execute_batch(&contexts());
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("paths.json");
    assert!(engine.export_execution_log(&paths, &json, ExportFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["route"], "STOCK_LOCAL");
    assert_eq!(rows[0]["route_number"], 1);
    assert_eq!(rows[1]["route"], "PURCHASE");

    let csv = dir.path().join("paths.csv");
    assert!(engine.export_execution_log(&paths, &csv, ExportFormat::Csv));
    let text = fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().next().unwrap().starts_with("path_id,item_id,"));
    assert!(text.contains("node_1 > node_2"));
}

/// Tests a failed path keeps its infinite totals through JSON.
#[test]
fn test_failed_path_json_round_trip() {
    let engine = ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default());
    let mut context = ExecutionContext::new("MAT-404", 50.0, date!(2026 - 02 - 01));
    context.supplier_available = false;
    let path = engine.execute(&context);
    assert!(!path.final_success);

    let text = serde_json::to_string(&path).unwrap();
    let restored: ExecutionPath = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, path);
    assert!(restored.total_cost.is_infinite());
    assert!(restored.total_lead_time.is_infinite());

    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("failed.json");
    assert!(engine.export_execution_log(std::slice::from_ref(&path), &json, ExportFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value[0]["cost"], "inf");
    assert_eq!(value[0]["lead_time_days"], "inf");
}

/// Tests the feasibility report exports scores in both formats.
#[test]
fn test_feasibility_report_exports() {
    let engine = ExecutionEngine::new(standard_decision_tree().unwrap(), EngineConfig::default());
    let paths = engine.execute_batch(&contexts());
    let evaluator = PathEvaluator::new(date!(2026 - 01 - 01));
    let scores: Vec<_> = paths
        .iter()
        .map(|path| evaluator.evaluate_path(path, date!(2026 - 02 - 01), 100.0, Criticality::Medium))
        .collect();
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("report.json");
    assert!(evaluator.export_feasibility_report(&scores, &json, ExportFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["feasibility_level"], "FULL");

    let csv = dir.path().join("report.csv");
    assert!(evaluator.export_feasibility_report(&scores, &csv, ExportFormat::Csv));
    let text = fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().next().unwrap().starts_with("path_id,route,feasibility_level,"));
}

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Tests export format parsing.
#[test]
fn test_export_format_parsing() {
    assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert!("xml".parse::<ExportFormat>().is_err());
    assert_eq!(ExportFormat::default(), ExportFormat::Json);
}
