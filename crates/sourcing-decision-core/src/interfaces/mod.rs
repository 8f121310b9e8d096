// crates/sourcing-decision-core/src/interfaces/mod.rs
// ============================================================================
// Module: Sourcing Decision Interfaces
// Description: Trait seams for gate predicates and upstream sourcing algorithms.
// Purpose: Define the contract surfaces the runtime calls into.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Gate predicates are pure functions of an [`ExecutionContext`]. They report
//! failure through [`PredicateError`] rather than panicking; the gate manager
//! turns an error into a closed gate with state `Unknown`.
//!
//! Sourcing algorithms compute numeric proposals upstream of traversal. Their
//! math lives outside this crate; only the proposal shape is defined here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::context::ExecutionContext;
use crate::core::context::SourcingProposal;
use crate::core::identifiers::ItemId;
use crate::core::route::SourceRoute;

// ============================================================================
// SECTION: Gate Predicate
// ============================================================================

/// Errors reported by gate predicates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// Predicate could not reach a decision.
    #[error("predicate failed: {0}")]
    Failed(String),
    /// A fact the predicate depends on was not materialized.
    #[error("missing fact: {0}")]
    MissingFact(String),
}

/// Pure boolean check over an execution context.
///
/// Implementations must not perform I/O or hold mutable state.
pub trait GatePredicate: Send + Sync {
    /// Evaluates the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when no decision can be reached.
    fn evaluate(&self, context: &ExecutionContext) -> Result<bool, PredicateError>;
}

impl<F> GatePredicate for F
where
    F: Fn(&ExecutionContext) -> Result<bool, PredicateError> + Send + Sync,
{
    fn evaluate(&self, context: &ExecutionContext) -> Result<bool, PredicateError> {
        self(context)
    }
}

// ============================================================================
// SECTION: Sourcing Algorithm
// ============================================================================

/// Errors reported by upstream sourcing algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    /// The algorithm's data source was unavailable.
    #[error("sourcing data unavailable: {0}")]
    Unavailable(String),
    /// The algorithm rejected its inputs.
    #[error("invalid sourcing input: {0}")]
    InvalidInput(String),
}

/// Upstream module that proposes quantities, costs, and lead times for a route.
pub trait SourcingAlgorithm {
    /// Route the algorithm proposes for.
    fn route(&self) -> SourceRoute;

    /// Computes a proposal for the item, or `None` when the route cannot help.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError`] when the proposal cannot be computed.
    fn propose(
        &self,
        item_id: &ItemId,
        demand_quantity: f64,
    ) -> Result<Option<SourcingProposal>, AlgorithmError>;

    /// Computes a proposal and folds it into `context`.
    ///
    /// Returns true when a proposal was applied.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError`] when the proposal cannot be computed.
    fn enrich(&self, context: &mut ExecutionContext) -> Result<bool, AlgorithmError> {
        let proposal = self.propose(&context.item_id, context.demand_quantity)?;
        match proposal {
            Some(proposal) => {
                context.apply_proposal(self.route(), &proposal);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
