// crates/sourcing-decision-core/src/runtime/profiles.rs
// ============================================================================
// Module: Route Scoring Profiles
// Description: Static per-route weights and tolerances for feasibility scoring.
// Purpose: Parameterize the path evaluator for each of the 12 routes.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Each [`RouteScoringProfile`] weights the four continuous sub-scores
//! (success, lead time, cost, risk) and sets the tolerances the lead-time and
//! cost decay curves use. Weights for every route sum to 1.0 so the composite
//! score stays in [0, 1].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::route::SourceRoute;

// ============================================================================
// SECTION: Profile Types
// ============================================================================

/// Sub-score weights of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    /// Weight of the success score.
    pub success: f64,
    /// Weight of the lead-time score.
    pub lead_time: f64,
    /// Weight of the cost score.
    pub cost: f64,
    /// Weight of the risk score.
    pub risk: f64,
}

impl ScoreWeights {
    /// Sum of all four weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.success + self.lead_time + self.cost + self.risk
    }
}

/// Static scoring configuration for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteScoringProfile {
    /// Route the profile applies to.
    pub route: SourceRoute,
    /// Expected success rate when the route is taken.
    pub base_success_rate: f64,
    /// Expected relative cost volatility.
    pub cost_volatility: f64,
    /// Expected lead-time variability in days.
    pub lead_time_variability: f64,
    /// Sub-score weights.
    pub weights: ScoreWeights,
    /// Relative cost overrun at which the cost score reaches 0.5.
    pub acceptable_cost_premium: f64,
    /// Lateness in days at which the lead-time score reaches 0.5.
    pub critical_lead_time_margin: f64,
    /// Quality ceiling reported as the quality score.
    pub min_quality_acceptable: f64,
    /// Situations the route is best suited for.
    pub optimal_for: Vec<&'static str>,
}

impl RouteScoringProfile {
    /// Returns true when any of `tags` appears in `optimal_for`.
    #[must_use]
    pub fn matches_any(&self, tags: &[&str]) -> bool {
        self.optimal_for.iter().any(|tag| tags.contains(tag))
    }
}

// ============================================================================
// SECTION: Standard Profiles
// ============================================================================

/// Compact row used to declare the standard profiles.
struct ProfileRow {
    /// Route.
    route: SourceRoute,
    /// Base success rate.
    success: f64,
    /// Cost volatility.
    volatility: f64,
    /// Lead-time variability.
    variability: f64,
    /// Weights.
    weights: ScoreWeights,
    /// Cost premium.
    premium: f64,
    /// Critical lead-time margin.
    margin: f64,
    /// Minimum quality.
    quality: f64,
    /// Optimal-for tags.
    tags: &'static [&'static str],
}

/// Shorthand constructor for weights.
const fn weights(success: f64, lead_time: f64, cost: f64, risk: f64) -> ScoreWeights {
    ScoreWeights {
        success,
        lead_time,
        cost,
        risk,
    }
}

/// Profile row of the terminal sentinel.
const SENTINEL_ROW: ProfileRow = ProfileRow {
    route: SourceRoute::FinalResult,
    success: 1.0,
    volatility: 0.0,
    variability: 0.0,
    weights: weights(1.0, 0.0, 0.0, 0.0),
    premium: 0.20,
    margin: 2.0,
    quality: 0.95,
    tags: &["all"],
};

/// Standard profile table in route order.
const PROFILE_ROWS: [ProfileRow; 12] = [
    ProfileRow {
        route: SourceRoute::StockLocal,
        success: 0.95,
        volatility: 0.05,
        variability: 0.5,
        weights: weights(0.30, 0.20, 0.35, 0.15),
        premium: 0.05,
        margin: 0.5,
        quality: 0.99,
        tags: &["all_criticality", "immediate_need", "cost_sensitive"],
    },
    ProfileRow {
        route: SourceRoute::StockLocalAssets,
        success: 0.85,
        volatility: 0.08,
        variability: 1.0,
        weights: weights(0.25, 0.25, 0.30, 0.20),
        premium: 0.10,
        margin: 1.0,
        quality: 0.97,
        tags: &["medium_criticality", "short_term"],
    },
    ProfileRow {
        route: SourceRoute::Disassembly,
        success: 0.70,
        volatility: 0.15,
        variability: 3.0,
        weights: weights(0.20, 0.30, 0.35, 0.15),
        premium: 0.25,
        margin: 2.0,
        quality: 0.92,
        tags: &["high_complexity", "available_parent_components"],
    },
    ProfileRow {
        route: SourceRoute::Substitutes,
        success: 0.75,
        volatility: 0.12,
        variability: 2.5,
        weights: weights(0.25, 0.25, 0.30, 0.20),
        premium: 0.15,
        margin: 1.5,
        quality: 0.94,
        tags: &["non_critical", "technical_flexibility"],
    },
    ProfileRow {
        route: SourceRoute::Recovery,
        success: 0.60,
        volatility: 0.20,
        variability: 5.0,
        weights: weights(0.15, 0.35, 0.35, 0.15),
        premium: 0.50,
        margin: 3.0,
        quality: 0.90,
        tags: &["low_criticality", "flexible_deadline", "cost_driven"],
    },
    ProfileRow {
        route: SourceRoute::Transfer,
        success: 0.88,
        volatility: 0.10,
        variability: 2.0,
        weights: weights(0.25, 0.30, 0.25, 0.20),
        premium: 0.12,
        margin: 1.5,
        quality: 0.97,
        tags: &["multi_site_network", "balanced_inventory"],
    },
    ProfileRow {
        route: SourceRoute::Intercompany,
        success: 0.82,
        volatility: 0.08,
        variability: 1.5,
        weights: weights(0.25, 0.25, 0.30, 0.20),
        premium: 0.10,
        margin: 1.0,
        quality: 0.96,
        tags: &["corporate_network", "transfer_pricing_advantage"],
    },
    ProfileRow {
        route: SourceRoute::Vmi,
        success: 0.90,
        volatility: 0.06,
        variability: 1.0,
        weights: weights(0.30, 0.25, 0.25, 0.20),
        premium: 0.08,
        margin: 0.8,
        quality: 0.98,
        tags: &["contract_active", "predictable_demand", "quality_critical"],
    },
    ProfileRow {
        route: SourceRoute::Loan,
        success: 0.65,
        volatility: 0.25,
        variability: 2.5,
        weights: weights(0.20, 0.30, 0.20, 0.30),
        premium: 0.30,
        margin: 2.0,
        quality: 0.93,
        tags: &["emergency_only", "relationship_based"],
    },
    ProfileRow {
        route: SourceRoute::Expedite,
        success: 0.75,
        volatility: 0.30,
        variability: 1.0,
        weights: weights(0.20, 0.40, 0.25, 0.15),
        premium: 0.50,
        margin: 0.5,
        quality: 0.95,
        tags: &["high_criticality", "tight_deadline", "expedite_budget"],
    },
    ProfileRow {
        route: SourceRoute::Purchase,
        success: 0.85,
        volatility: 0.10,
        variability: 3.0,
        weights: weights(0.20, 0.30, 0.35, 0.15),
        premium: 0.20,
        margin: 2.0,
        quality: 0.96,
        tags: &["standard_sourcing", "supplier_qualified"],
    },
    SENTINEL_ROW,
];

impl ProfileRow {
    /// Expands the row into a profile for `route`.
    fn to_profile(&self, route: SourceRoute) -> RouteScoringProfile {
        RouteScoringProfile {
            route,
            base_success_rate: self.success,
            cost_volatility: self.volatility,
            lead_time_variability: self.variability,
            weights: self.weights,
            acceptable_cost_premium: self.premium,
            critical_lead_time_margin: self.margin,
            min_quality_acceptable: self.quality,
            optimal_for: self.tags.to_vec(),
        }
    }
}

/// Returns the 12 standard route profiles keyed by route.
#[must_use]
pub fn standard_profiles() -> BTreeMap<SourceRoute, RouteScoringProfile> {
    PROFILE_ROWS.iter().map(|row| (row.route, row.to_profile(row.route))).collect()
}

/// Returns the sentinel profile relabeled for `route`.
///
/// Used for routes missing from a custom profile map.
#[must_use]
pub fn sentinel_profile(route: SourceRoute) -> RouteScoringProfile {
    SENTINEL_ROW.to_profile(route)
}
