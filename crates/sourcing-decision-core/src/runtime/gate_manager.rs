// crates/sourcing-decision-core/src/runtime/gate_manager.rs
// ============================================================================
// Module: Gate Manager
// Description: Gate registry with cached, audited evaluation.
// Purpose: Evaluate gates deterministically while keeping an audit trail.
// Dependencies: crate::{core, runtime}, serde, time, tracing
// ============================================================================

//! ## Overview
//! The [`GateManager`] owns registered gates, their configuration, a result
//! cache keyed by `(gate id, context hash)`, the global evaluation history, and
//! a per-gate log used for pass-rate statistics.
//!
//! Evaluation never fails. Unknown gates and predicate errors produce a closed
//! gate with state [`GateState::Unknown`] and an explanatory note. Only
//! successful predicate evaluations are cached and recorded.
//!
//! The cache stops accepting entries once it reaches `max_cache_size`; there is
//! no eviction. Call [`GateManager::clear_cache`] to reset it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::core::clock::Clock;
use crate::core::clock::SystemClock;
use crate::core::context::ExecutionContext;
use crate::core::hashing::HashDigest;
use crate::core::hashing::context_hash;
use crate::core::identifiers::GateId;
use crate::core::route::GateType;
use crate::runtime::export::ExportFormat;
use crate::runtime::export::export_records;
use crate::runtime::rules::GlobalRule;
use crate::runtime::tree::Gate;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of cached evaluations.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// Note attached to evaluations of unregistered gates.
pub const NOTE_NOT_REGISTERED: &str = "gate not registered";

/// Note attached to bypassed, disabled gates.
pub const NOTE_DISABLED: &str = "gate disabled";

/// Note attached to gates bypassed by context applicability.
pub const NOTE_NOT_APPLICABLE: &str = "gate not applicable to context";

// ============================================================================
// SECTION: Gate State and Severity
// ============================================================================

/// Outcome state of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateState {
    /// Gate passed.
    Open,
    /// Gate failed.
    Closed,
    /// Gate could not be evaluated.
    Unknown,
}

impl GateState {
    /// Returns the upper-case state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance of a gate when results are grouped by severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must pass for a severity report to pass.
    Critical,
    /// Ordinary gate.
    #[default]
    Normal,
    /// Advisory gate.
    Warning,
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Per-gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfiguration {
    /// Disabled gates are bypassed and report open.
    pub enabled: bool,
    /// Severity used by [`GateManager::evaluate_by_severity`].
    pub severity: Severity,
    /// When non-empty, the gate applies only to contexts carrying one of these tags.
    pub applicable_contexts: BTreeSet<String>,
    /// The gate never applies to contexts carrying one of these tags.
    pub not_applicable_contexts: BTreeSet<String>,
}

impl Default for GateConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Normal,
            applicable_contexts: BTreeSet::new(),
            not_applicable_contexts: BTreeSet::new(),
        }
    }
}

impl GateConfiguration {
    /// Returns true when the gate applies to the context's tags.
    #[must_use]
    pub fn applies_to(&self, context: &ExecutionContext) -> bool {
        if self.not_applicable_contexts.iter().any(|tag| context.has_tag(tag)) {
            return false;
        }
        self.applicable_contexts.is_empty()
            || self.applicable_contexts.iter().any(|tag| context.has_tag(tag))
    }
}

/// Gate manager settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateManagerConfig {
    /// Maximum number of cached evaluations.
    pub max_cache_size: usize,
}

impl Default for GateManagerConfig {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
        }
    }
}

// ============================================================================
// SECTION: Evaluation Records
// ============================================================================

/// Audit record for one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateEvaluation {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Gate category.
    pub gate_type: GateType,
    /// Evaluation state.
    pub state: GateState,
    /// Boolean result.
    pub result: bool,
    /// Hex digest of the evaluated context; empty when none was computed.
    pub context_hash: String,
    /// Evaluation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Free-form notes.
    pub notes: String,
}

/// Per-gate log entry used for statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateLogEntry {
    /// Evaluation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Whether the gate passed.
    pub passed: bool,
    /// Hex digest of the evaluated context.
    pub context_hash: String,
}

/// Pass-rate statistics for one gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateStatistics {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Gate category.
    pub gate_type: GateType,
    /// Recorded evaluations.
    pub total_evaluations: usize,
    /// Recorded passes.
    pub passed: usize,
    /// Recorded failures.
    pub failed: usize,
    /// Passes divided by evaluations; zero when nothing was recorded.
    pub pass_rate: f64,
    /// Whether the gate is enabled.
    pub enabled: bool,
    /// Configured severity.
    pub severity: Severity,
}

/// Evaluations grouped by configured severity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SeverityReport {
    /// True when every critical gate passed.
    pub passed: bool,
    /// Critical gate evaluations.
    pub critical: Vec<GateEvaluation>,
    /// Normal gate evaluations.
    pub normal: Vec<GateEvaluation>,
    /// Warning gate evaluations.
    pub warning: Vec<GateEvaluation>,
}

// ============================================================================
// SECTION: Gate Manager
// ============================================================================

/// Gate manager shared between an engine and its caller.
pub type SharedGateManager = Arc<Mutex<GateManager>>;

/// Registered gate together with its configuration.
#[derive(Debug, Clone)]
struct RegisteredGate {
    /// Gate definition.
    gate: Gate,
    /// Gate configuration.
    config: GateConfiguration,
}

/// Registry and cached, audited evaluator for gates.
pub struct GateManager {
    /// Registered gates keyed by id.
    gates: BTreeMap<GateId, RegisteredGate>,
    /// Named cross-gate rules.
    global_rules: BTreeMap<String, GlobalRule>,
    /// Cached evaluations keyed by gate and context hash.
    cache: BTreeMap<(GateId, String), GateEvaluation>,
    /// Global evaluation history in evaluation order.
    history: Vec<GateEvaluation>,
    /// Per-gate evaluation logs.
    gate_logs: BTreeMap<GateId, Vec<GateLogEntry>>,
    /// Manager settings.
    config: GateManagerConfig,
    /// Timestamp source for evaluation records.
    clock: Arc<dyn Clock>,
    /// Set once the cache-full warning has been logged.
    cache_full_logged: bool,
}

impl Default for GateManager {
    fn default() -> Self {
        Self::new(GateManagerConfig::default())
    }
}

impl GateManager {
    /// Creates a manager stamping records with UTC wall-clock time.
    #[must_use]
    pub fn new(config: GateManagerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a manager with an explicit clock.
    #[must_use]
    pub fn with_clock(config: GateManagerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            gates: BTreeMap::new(),
            global_rules: BTreeMap::new(),
            cache: BTreeMap::new(),
            history: Vec::new(),
            gate_logs: BTreeMap::new(),
            config,
            clock,
            cache_full_logged: false,
        }
    }

    /// Wraps the manager for sharing with an engine.
    #[must_use]
    pub fn into_shared(self) -> SharedGateManager {
        Arc::new(Mutex::new(self))
    }

    /// Returns the manager settings.
    #[must_use]
    pub const fn config(&self) -> GateManagerConfig {
        self.config
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Registers a gate, overwriting any gate with the same id.
    pub fn register_gate(&mut self, gate: Gate, config: Option<GateConfiguration>) {
        debug!(gate_id = %gate.gate_id, "gate registered");
        self.gate_logs.entry(gate.gate_id.clone()).or_default();
        self.gates.insert(
            gate.gate_id.clone(),
            RegisteredGate {
                gate,
                config: config.unwrap_or_default(),
            },
        );
    }

    /// Registers a named cross-gate rule, overwriting any rule with the same name.
    pub fn register_global_rule(&mut self, name: impl Into<String>, rule: GlobalRule) {
        self.global_rules.insert(name.into(), rule);
    }

    /// Returns true when a gate with the id is registered.
    #[must_use]
    pub fn contains_gate(&self, gate_id: &GateId) -> bool {
        self.gates.contains_key(gate_id)
    }

    /// Number of registered gates.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns a gate's configuration.
    #[must_use]
    pub fn configuration(&self, gate_id: &GateId) -> Option<&GateConfiguration> {
        self.gates.get(gate_id).map(|registered| &registered.config)
    }

    /// Replaces a gate's configuration. Returns false for unknown gates.
    pub fn configure_gate(&mut self, gate_id: &GateId, config: GateConfiguration) -> bool {
        match self.gates.get_mut(gate_id) {
            Some(registered) => {
                registered.config = config;
                true
            }
            None => false,
        }
    }

    /// Enables or disables a gate. Returns false for unknown gates.
    pub fn set_gate_enabled(&mut self, gate_id: &GateId, enabled: bool) -> bool {
        match self.gates.get_mut(gate_id) {
            Some(registered) => {
                registered.config.enabled = enabled;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Evaluates one gate against a context.
    ///
    /// Cache hits return the cached record unchanged and are not re-recorded.
    pub fn evaluate_gate(
        &mut self,
        gate_id: &GateId,
        context: &ExecutionContext,
        use_cache: bool,
    ) -> (bool, GateEvaluation) {
        let Some(registered) = self.gates.get(gate_id) else {
            warn!(gate_id = %gate_id, "evaluation requested for unregistered gate");
            let evaluation = self.record(
                gate_id.clone(),
                GateType::Complex,
                GateState::Unknown,
                &HashDigest::empty(),
                NOTE_NOT_REGISTERED.to_string(),
            );
            return (false, evaluation);
        };
        let gate_type = registered.gate.gate_type;
        if !registered.config.enabled {
            debug!(gate_id = %gate_id, "gate disabled, bypassing");
            let evaluation = self.record(
                gate_id.clone(),
                gate_type,
                GateState::Open,
                &HashDigest::empty(),
                NOTE_DISABLED.to_string(),
            );
            return (true, evaluation);
        }
        if !registered.config.applies_to(context) {
            debug!(gate_id = %gate_id, "gate not applicable, bypassing");
            let evaluation = self.record(
                gate_id.clone(),
                gate_type,
                GateState::Open,
                &HashDigest::empty(),
                NOTE_NOT_APPLICABLE.to_string(),
            );
            return (true, evaluation);
        }

        let (digest, hash_note) = match context_hash(context) {
            Ok(digest) => (Some(digest), None),
            Err(err) => {
                warn!(gate_id = %gate_id, error = %err, "context hash failed, cache bypassed");
                (None, Some(format!("context hash unavailable: {err}")))
            }
        };
        if use_cache
            && let Some(digest) = &digest
            && let Some(cached) = self.cache.get(&(gate_id.clone(), digest.value.clone()))
        {
            debug!(gate_id = %gate_id, "gate cache hit");
            return (cached.result, cached.clone());
        }

        let outcome = registered.gate.evaluate(context);
        let gate_note = evaluation_note(&registered.gate);
        let digest = digest.unwrap_or_else(HashDigest::empty);
        match outcome {
            Ok(passed) => {
                let state = if passed { GateState::Open } else { GateState::Closed };
                debug!(gate_id = %gate_id, state = %state, "gate evaluated");
                let notes = match hash_note {
                    Some(hash_note) => format!("{gate_note}; {hash_note}"),
                    None => gate_note,
                };
                let evaluation = self.record(gate_id.clone(), gate_type, state, &digest, notes);
                self.append(&evaluation);
                if use_cache && !digest.is_empty() {
                    self.insert_cache(gate_id, &digest, &evaluation);
                }
                (passed, evaluation)
            }
            Err(err) => {
                error!(gate_id = %gate_id, error = %err, "gate predicate failed");
                let evaluation = self.record(
                    gate_id.clone(),
                    gate_type,
                    GateState::Unknown,
                    &digest,
                    format!("predicate error: {err}"),
                );
                (false, evaluation)
            }
        }
    }

    /// Evaluates gates in order, optionally stopping at the first failure.
    ///
    /// Gates skipped by short-circuiting are omitted from the returned list.
    pub fn evaluate_gates_batch(
        &mut self,
        gate_ids: &[GateId],
        context: &ExecutionContext,
        stop_on_fail: bool,
    ) -> (bool, Vec<GateEvaluation>) {
        let mut all_passed = true;
        let mut evaluations = Vec::with_capacity(gate_ids.len());
        for gate_id in gate_ids {
            let (passed, evaluation) = self.evaluate_gate(gate_id, context, true);
            evaluations.push(evaluation);
            if !passed {
                all_passed = false;
                if stop_on_fail {
                    break;
                }
            }
        }
        (all_passed, evaluations)
    }

    /// Evaluates `primary`, then `fallback` only when the primary fails.
    pub fn evaluate_with_fallback(
        &mut self,
        primary: &GateId,
        context: &ExecutionContext,
        fallback: Option<&GateId>,
    ) -> (bool, Vec<GateEvaluation>) {
        let (passed, evaluation) = self.evaluate_gate(primary, context, true);
        let mut evaluations = vec![evaluation];
        if passed {
            return (true, evaluations);
        }
        let Some(fallback) = fallback else {
            return (false, evaluations);
        };
        debug!(primary = %primary, fallback = %fallback, "primary gate failed, trying fallback");
        let (passed, evaluation) = self.evaluate_gate(fallback, context, true);
        evaluations.push(evaluation);
        (passed, evaluations)
    }

    /// Evaluates every listed gate and combines them with a named global rule.
    ///
    /// An unknown rule name yields `(false, [])` without evaluating anything.
    pub fn apply_global_rule(
        &mut self,
        rule_name: &str,
        gate_ids: &[GateId],
        context: &ExecutionContext,
    ) -> (bool, Vec<GateEvaluation>) {
        let Some(rule) = self.global_rules.get(rule_name).cloned() else {
            warn!(rule = rule_name, "global rule not registered");
            return (false, Vec::new());
        };
        let evaluations: Vec<GateEvaluation> = gate_ids
            .iter()
            .map(|gate_id| self.evaluate_gate(gate_id, context, true).1)
            .collect();
        let passed = rule.apply(&evaluations, context);
        debug!(rule = rule_name, label = rule.label(), passed, "global rule applied");
        (passed, evaluations)
    }

    /// Evaluates every listed gate and groups the results by severity.
    ///
    /// The report passes when every critical gate passed.
    pub fn evaluate_by_severity(
        &mut self,
        gate_ids: &[GateId],
        context: &ExecutionContext,
    ) -> SeverityReport {
        let mut report = SeverityReport {
            passed: true,
            ..SeverityReport::default()
        };
        for gate_id in gate_ids {
            let severity =
                self.configuration(gate_id).map_or(Severity::Normal, |config| config.severity);
            let (passed, evaluation) = self.evaluate_gate(gate_id, context, true);
            match severity {
                Severity::Critical => {
                    report.passed &= passed;
                    report.critical.push(evaluation);
                }
                Severity::Normal => report.normal.push(evaluation),
                Severity::Warning => report.warning.push(evaluation),
            }
        }
        report
    }

    // ------------------------------------------------------------------------
    // Statistics and Maintenance
    // ------------------------------------------------------------------------

    /// Returns pass-rate statistics for one gate.
    #[must_use]
    pub fn get_gate_statistics(&self, gate_id: &GateId) -> Option<GateStatistics> {
        let registered = self.gates.get(gate_id)?;
        let log = self.gate_logs.get(gate_id).map_or(&[][..], Vec::as_slice);
        let total = log.len();
        let passed = log.iter().filter(|entry| entry.passed).count();
        #[allow(clippy::cast_precision_loss, reason = "Evaluation counts stay far below 2^52.")]
        let pass_rate = if total == 0 { 0.0 } else { passed as f64 / total as f64 };
        Some(GateStatistics {
            gate_id: gate_id.clone(),
            gate_type: registered.gate.gate_type,
            total_evaluations: total,
            passed,
            failed: total - passed,
            pass_rate,
            enabled: registered.config.enabled,
            severity: registered.config.severity,
        })
    }

    /// Returns statistics for every registered gate, sorted by gate id.
    #[must_use]
    pub fn get_all_statistics(&self) -> Vec<GateStatistics> {
        self.gates.keys().filter_map(|gate_id| self.get_gate_statistics(gate_id)).collect()
    }

    /// Returns the recorded evaluation history.
    #[must_use]
    pub fn history(&self) -> &[GateEvaluation] {
        &self.history
    }

    /// Returns a gate's per-gate log.
    #[must_use]
    pub fn gate_log(&self, gate_id: &GateId) -> Option<&[GateLogEntry]> {
        self.gate_logs.get(gate_id).map(Vec::as_slice)
    }

    /// Number of cached evaluations.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Empties the result cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cache_full_logged = false;
    }

    /// Empties the history and every per-gate log.
    pub fn clear_history(&mut self) {
        self.history.clear();
        for log in self.gate_logs.values_mut() {
            log.clear();
        }
    }

    /// Writes the evaluation history as JSON or CSV.
    ///
    /// Returns false when the file cannot be written.
    #[must_use]
    pub fn export_audit_log(&self, path: &Path, format: ExportFormat) -> bool {
        export_records("gate_audit", path, format, &self.history, &self.history)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Builds an evaluation record stamped by the clock.
    fn record(
        &self,
        gate_id: GateId,
        gate_type: GateType,
        state: GateState,
        digest: &HashDigest,
        notes: String,
    ) -> GateEvaluation {
        GateEvaluation {
            gate_id,
            gate_type,
            state,
            result: state == GateState::Open,
            context_hash: digest.value.clone(),
            timestamp: self.clock.now(),
            notes,
        }
    }

    /// Appends an evaluation to the history and the per-gate log.
    fn append(&mut self, evaluation: &GateEvaluation) {
        self.history.push(evaluation.clone());
        self.gate_logs.entry(evaluation.gate_id.clone()).or_default().push(GateLogEntry {
            timestamp: evaluation.timestamp,
            passed: evaluation.result,
            context_hash: evaluation.context_hash.clone(),
        });
    }

    /// Caches an evaluation unless the cache is full.
    fn insert_cache(&mut self, gate_id: &GateId, digest: &HashDigest, evaluation: &GateEvaluation) {
        if self.cache.len() >= self.config.max_cache_size {
            if !self.cache_full_logged {
                warn!(max_cache_size = self.config.max_cache_size, "gate cache full, new results not cached");
                self.cache_full_logged = true;
            }
            return;
        }
        self.cache.insert((gate_id.clone(), digest.value.clone()), evaluation.clone());
    }
}

/// Describes what a gate checked: its threshold when it has one, otherwise
/// its description.
fn evaluation_note(gate: &Gate) -> String {
    match gate.threshold {
        Some(threshold) => format!("threshold: {threshold}"),
        None => format!("custom condition: {}", gate.description),
    }
}
