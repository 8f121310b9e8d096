// crates/sourcing-decision-config/src/lib.rs
// ============================================================================
// Module: Sourcing Decision Config Library
// Description: Configuration model, validation, and canonical example.
// Purpose: Single source of truth for sourcing-decision.toml semantics.
// Dependencies: sourcing-decision-core, serde, toml
// ============================================================================

//! ## Overview
//! `sourcing-decision-config` defines the TOML configuration for the sourcing
//! decision engine. Loading is strict and fails closed; a validated config
//! converts into the core crate's engine, gate manager, and comparison
//! settings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
