// crates/sourcing-decision-core/src/core/context.rs
// ============================================================================
// Module: Sourcing Execution Context
// Description: Immutable snapshot of supply-chain facts for one requisition line.
// Purpose: Provide the only input gate predicates are allowed to reason over.
// Dependencies: crate::core::{identifiers, route}, serde, time
// ============================================================================

//! ## Overview
//! An [`ExecutionContext`] is materialized upstream (inventory, supplier, and
//! warehouse repositories plus the sourcing algorithms) before traversal begins.
//! Predicates read it and never perform I/O of their own.
//!
//! Maps are ordered so the context fingerprint is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::core::identifiers::ItemId;
use crate::core::route::SourceRoute;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default supplier lead time in days when no proposal is available.
pub const DEFAULT_SUPPLIER_LEAD_TIME_DAYS: f64 = 14.0;

/// Transfer center key used when a transfer proposal is folded into a context.
pub const PROPOSAL_TRANSFER_CENTER: &str = "proposal";

// ============================================================================
// SECTION: Criticality
// ============================================================================

/// Business criticality of a requisition line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    /// Low criticality; flexible deadline.
    Low,
    /// Medium criticality (default).
    #[default]
    Medium,
    /// High criticality.
    High,
    /// Critical; emergency sourcing is acceptable.
    Critical,
}

impl Criticality {
    /// Returns the lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Risk penalty added to the base route risk for this criticality.
    #[must_use]
    pub const fn risk_penalty(self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.05,
            Self::High => 0.10,
            Self::Critical => 0.20,
        }
    }

    /// Route tags that satisfy this criticality level.
    #[must_use]
    pub const fn acceptable_tags(self) -> &'static [&'static str] {
        match self {
            Self::Low => &["low_criticality", "all_criticality", "flexible_deadline"],
            Self::Medium => &["medium_criticality", "all_criticality"],
            Self::High => &["high_criticality", "all_criticality"],
            Self::Critical => {
                &["critical_only", "high_criticality", "all_criticality", "emergency_only"]
            }
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a criticality label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown criticality level: {0}")]
pub struct UnknownCriticality(pub String);

impl FromStr for Criticality {
    type Err = UnknownCriticality;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownCriticality(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Sourcing Proposal
// ============================================================================

/// Numeric proposal returned by an upstream sourcing algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcingProposal {
    /// Quantity the algorithm can cover.
    pub proposed_quantity: f64,
    /// Estimated cost of the proposal.
    pub estimated_cost: f64,
    /// Estimated lead time in days.
    pub estimated_lead_time: f64,
    /// Algorithm confidence in [0, 1].
    pub confidence_score: f64,
    /// Human-readable rationale.
    pub reasoning: String,
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Snapshot of facts gates reason over for one evaluation run.
///
/// # Invariants
/// - Treated as immutable once traversal starts.
/// - All facts are materialized before `execute` is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Requested material.
    pub item_id: ItemId,
    /// Demanded quantity.
    pub demand_quantity: f64,
    /// Date the material is required by.
    pub required_date: Date,
    /// Unreserved stock in the local warehouse.
    pub local_stock_available: f64,
    /// Quantity obtainable by releasing held assets.
    pub local_assets_available: f64,
    /// Components obtainable by BOM disassembly, keyed by component.
    pub bom_components_available: BTreeMap<String, f64>,
    /// Approved substitute materials.
    pub substitutes_available: Vec<String>,
    /// Stock available at other centers, keyed by center.
    pub transfer_centers_available: BTreeMap<String, f64>,
    /// An affiliated company can supply.
    pub intercompany_available: bool,
    /// A vendor-managed inventory contract is in force.
    pub vmi_contract_active: bool,
    /// A partner is willing to lend.
    pub loan_partner_available: bool,
    /// Days remaining until the deadline.
    pub days_to_deadline: f64,
    /// The supplier accepts rush delivery.
    pub can_expedite: bool,
    /// Budget reserved for expediting.
    pub expedite_budget_available: f64,
    /// A qualified supplier exists.
    pub supplier_available: bool,
    /// Standard supplier lead time in days.
    pub supplier_lead_time_days: f64,
    /// Business criticality.
    pub criticality: Criticality,
    /// Budget available for the line.
    #[serde(with = "crate::core::unbounded")]
    pub budget_available: f64,
    /// Maximum acceptable cost.
    #[serde(with = "crate::core::unbounded")]
    pub max_acceptable_cost: f64,
    /// Free-form context tags (for example `urgent`) used for gate applicability.
    pub context_tags: BTreeSet<String>,
}

impl ExecutionContext {
    /// Creates a context with the required facts and defaults for the rest.
    ///
    /// Defaults: no stock, assets, BOM, substitutes, or transfers; no
    /// relationships; a supplier is available with the default lead time;
    /// unbounded budget and cost.
    #[must_use]
    pub fn new(item_id: impl Into<ItemId>, demand_quantity: f64, required_date: Date) -> Self {
        Self {
            item_id: item_id.into(),
            demand_quantity,
            required_date,
            local_stock_available: 0.0,
            local_assets_available: 0.0,
            bom_components_available: BTreeMap::new(),
            substitutes_available: Vec::new(),
            transfer_centers_available: BTreeMap::new(),
            intercompany_available: false,
            vmi_contract_active: false,
            loan_partner_available: false,
            days_to_deadline: 0.0,
            can_expedite: false,
            expedite_budget_available: 0.0,
            supplier_available: true,
            supplier_lead_time_days: DEFAULT_SUPPLIER_LEAD_TIME_DAYS,
            criticality: Criticality::Medium,
            budget_available: f64::INFINITY,
            max_acceptable_cost: f64::INFINITY,
            context_tags: BTreeSet::new(),
        }
    }

    /// Total stock available across all transfer centers.
    #[must_use]
    pub fn transfer_total(&self) -> f64 {
        self.transfer_centers_available.values().sum()
    }

    /// Returns true when the context carries the tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.context_tags.contains(tag)
    }

    /// Folds an upstream algorithm proposal for `route` into the context.
    ///
    /// Routes without a natural context field leave the context unchanged.
    pub fn apply_proposal(&mut self, route: SourceRoute, proposal: &SourcingProposal) {
        match route {
            SourceRoute::StockLocal => {
                self.local_stock_available = proposal.proposed_quantity;
            }
            SourceRoute::StockLocalAssets => {
                self.local_assets_available = proposal.proposed_quantity;
            }
            SourceRoute::Transfer => {
                self.transfer_centers_available
                    .insert(PROPOSAL_TRANSFER_CENTER.to_string(), proposal.proposed_quantity);
            }
            SourceRoute::Purchase => {
                self.supplier_available = proposal.proposed_quantity > 0.0;
                self.supplier_lead_time_days = proposal.estimated_lead_time;
            }
            SourceRoute::Expedite => {
                self.can_expedite = proposal.proposed_quantity > 0.0;
                self.expedite_budget_available = proposal.estimated_cost;
            }
            SourceRoute::Disassembly
            | SourceRoute::Substitutes
            | SourceRoute::Recovery
            | SourceRoute::Intercompany
            | SourceRoute::Vmi
            | SourceRoute::Loan
            | SourceRoute::FinalResult => {}
        }
    }
}
