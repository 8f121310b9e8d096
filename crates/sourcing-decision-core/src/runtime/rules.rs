// crates/sourcing-decision-core/src/runtime/rules.rs
// ============================================================================
// Module: Global Gate Rules
// Description: Cross-gate rules combining several gate evaluations.
// Purpose: Express OR-style and k-of-n logic that node AND semantics cannot.
// Dependencies: crate::{core, runtime::gate_manager}
// ============================================================================

//! ## Overview
//! A [`GlobalRule`] receives every evaluation it was asked to combine plus the
//! context, and returns a single decision. The built-ins cover the common
//! shapes; arbitrary closures are accepted through [`GlobalRule::new`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::core::context::ExecutionContext;
use crate::runtime::gate_manager::GateEvaluation;

// ============================================================================
// SECTION: Global Rule
// ============================================================================

/// Signature of a cross-gate rule.
pub type RuleFn = dyn Fn(&[GateEvaluation], &ExecutionContext) -> bool + Send + Sync;

/// Cross-gate decision rule.
#[derive(Clone)]
pub struct GlobalRule {
    /// Short label for logs.
    label: String,
    /// Rule body.
    rule: Arc<RuleFn>,
}

impl GlobalRule {
    /// Wraps an arbitrary rule closure.
    #[must_use]
    pub fn new<F>(label: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&[GateEvaluation], &ExecutionContext) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            rule: Arc::new(rule),
        }
    }

    /// Passes when every evaluation passed (vacuously true for none).
    #[must_use]
    pub fn all() -> Self {
        Self::new("all", |evaluations, _| evaluations.iter().all(|evaluation| evaluation.result))
    }

    /// Passes when at least one evaluation passed.
    #[must_use]
    pub fn any() -> Self {
        Self::new("any", |evaluations, _| evaluations.iter().any(|evaluation| evaluation.result))
    }

    /// Passes when at least `required` evaluations passed.
    #[must_use]
    pub fn at_least(required: usize) -> Self {
        Self::new(format!("at_least_{required}"), move |evaluations, _| {
            evaluations.iter().filter(|evaluation| evaluation.result).count() >= required
        })
    }

    /// Returns the rule label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Applies the rule.
    #[must_use]
    pub fn apply(&self, evaluations: &[GateEvaluation], context: &ExecutionContext) -> bool {
        (self.rule)(evaluations, context)
    }
}

impl fmt::Debug for GlobalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalRule").field("label", &self.label).finish_non_exhaustive()
    }
}
