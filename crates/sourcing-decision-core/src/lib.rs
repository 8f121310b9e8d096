// crates/sourcing-decision-core/src/lib.rs
// ============================================================================
// Module: Sourcing Decision Core Library
// Description: Public API surface for the sourcing decision engine.
// Purpose: Expose core types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Sourcing decision core selects and scores a fulfillment route for one
//! requisition line. A static 12-route graph is walked with boolean gates over
//! an execution context; completed paths are scored with per-route weighted
//! profiles and ranked.
//!
//! The engine performs no I/O beyond the explicit export helpers and never
//! installs a tracing subscriber.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AlgorithmError;
pub use interfaces::GatePredicate;
pub use interfaces::PredicateError;
pub use interfaces::SourcingAlgorithm;
pub use runtime::*;
