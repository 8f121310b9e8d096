// crates/sourcing-decision-core/src/core/route.rs
// ============================================================================
// Module: Sourcing Routes and Gate Types
// Description: Closed enumerations for fulfillment routes and gate categories.
// Purpose: Give the 12 routes and 9 gate types stable numbering and names.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`SourceRoute`] enumerates the 12 mutually exclusive fulfillment strategies.
//! Routes 1-11 are operational. Route 12 is the terminal sentinel every standard
//! chain converges on. The numeric values are a stable contract for callers.
//!
//! [`GateType`] classifies what a gate reasons about.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Source Route
// ============================================================================

/// Fulfillment strategy for one requisition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceRoute {
    /// Release available local stock.
    StockLocal = 1,
    /// Release local stock together with held assets.
    StockLocalAssets = 2,
    /// Disassemble a parent BOM to obtain components.
    Disassembly = 3,
    /// Use technically approved substitutes.
    Substitutes = 4,
    /// Recover parts from recycling or asset teardown.
    Recovery = 5,
    /// Transfer stock from another site.
    Transfer = 6,
    /// Buy from an affiliated company.
    Intercompany = 7,
    /// Draw from vendor-managed inventory.
    Vmi = 8,
    /// Borrow from a partner.
    Loan = 9,
    /// Rush delivery from a supplier.
    Expedite = 10,
    /// Standard supplier purchase.
    Purchase = 11,
    /// Terminal sentinel; not an operational route.
    FinalResult = 12,
}

impl SourceRoute {
    /// All routes in numeric order.
    pub const ALL: [Self; 12] = [
        Self::StockLocal,
        Self::StockLocalAssets,
        Self::Disassembly,
        Self::Substitutes,
        Self::Recovery,
        Self::Transfer,
        Self::Intercompany,
        Self::Vmi,
        Self::Loan,
        Self::Expedite,
        Self::Purchase,
        Self::FinalResult,
    ];

    /// Returns the stable route number (1-12).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Resolves a route from its stable number.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::StockLocal),
            2 => Some(Self::StockLocalAssets),
            3 => Some(Self::Disassembly),
            4 => Some(Self::Substitutes),
            5 => Some(Self::Recovery),
            6 => Some(Self::Transfer),
            7 => Some(Self::Intercompany),
            8 => Some(Self::Vmi),
            9 => Some(Self::Loan),
            10 => Some(Self::Expedite),
            11 => Some(Self::Purchase),
            12 => Some(Self::FinalResult),
            _ => None,
        }
    }

    /// Returns the canonical upper-case route name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StockLocal => "STOCK_LOCAL",
            Self::StockLocalAssets => "STOCK_LOCAL_ASSETS",
            Self::Disassembly => "DISASSEMBLY",
            Self::Substitutes => "SUBSTITUTES",
            Self::Recovery => "RECOVERY",
            Self::Transfer => "TRANSFER",
            Self::Intercompany => "INTERCOMPANY",
            Self::Vmi => "VMI",
            Self::Loan => "LOAN",
            Self::Expedite => "EXPEDITE",
            Self::Purchase => "PURCHASE",
            Self::FinalResult => "FINAL_RESULT",
        }
    }

    /// Returns true for the terminal sentinel route.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        matches!(self, Self::FinalResult)
    }
}

impl fmt::Display for SourceRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Gate Type
// ============================================================================

/// Category of fact a gate reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateType {
    /// Is the material available?
    Availability,
    /// Is there enough time?
    Timing,
    /// Is the cost acceptable?
    Cost,
    /// Is the quality acceptable?
    Quality,
    /// Is the risk acceptable?
    Risk,
    /// Does it comply with regulations?
    Regulatory,
    /// Is a business relationship in place?
    Relationship,
    /// Does the forecast support it?
    Forecast,
    /// Composite or custom logic.
    Complex,
}

impl GateType {
    /// All gate types in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Availability,
        Self::Timing,
        Self::Cost,
        Self::Quality,
        Self::Risk,
        Self::Regulatory,
        Self::Relationship,
        Self::Forecast,
        Self::Complex,
    ];

    /// Returns the canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Timing => "timing",
            Self::Cost => "cost",
            Self::Quality => "quality",
            Self::Risk => "risk",
            Self::Regulatory => "regulatory",
            Self::Relationship => "relationship",
            Self::Forecast => "forecast",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
