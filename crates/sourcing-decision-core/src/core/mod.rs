// crates/sourcing-decision-core/src/core/mod.rs
// ============================================================================
// Module: Sourcing Decision Core Types
// Description: Routes, identifiers, contexts, paths, and hashing.
// Purpose: Provide stable, serializable types shared by the runtime and callers.
// Dependencies: serde, serde_jcs, sha2, time
// ============================================================================

//! ## Overview
//! Core types describe the inputs and outputs of one sourcing decision: the
//! [`ExecutionContext`] snapshot going in and the [`ExecutionPath`] coming out.
//! They carry no behavior beyond construction and summarization.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod clock;
pub mod context;
pub mod hashing;
pub mod identifiers;
pub mod path;
pub mod route;
pub mod unbounded;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use context::Criticality;
pub use context::DEFAULT_SUPPLIER_LEAD_TIME_DAYS;
pub use context::ExecutionContext;
pub use context::PROPOSAL_TRANSFER_CENTER;
pub use context::SourcingProposal;
pub use context::UnknownCriticality;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::context_hash;
pub use identifiers::GateId;
pub use identifiers::ItemId;
pub use identifiers::NodeId;
pub use identifiers::PathId;
pub use path::ExecutionPath;
pub use path::NodeResult;
pub use path::PathOutcome;
pub use path::PathSummary;
pub use route::GateType;
pub use route::SourceRoute;
