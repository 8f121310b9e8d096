// crates/sourcing-decision-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Path Evaluator
// Description: Multi-criteria feasibility scoring and ranking of execution paths.
// Purpose: Turn completed paths into comparable, bounded feasibility scores.
// Dependencies: crate::{core, runtime}, serde, time, tracing
// ============================================================================

//! ## Overview
//! [`PathEvaluator`] scores a path against a required date, a budget, and a
//! criticality level using the path's route profile. Every sub-score and the
//! composite are bounded to [0, 1]; the feasibility level is derived from the
//! number of failed boolean metrics.
//!
//! Scoring never reads the wall clock. Days to the required date are measured
//! from the evaluator's reference date.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use tracing::debug;

use crate::core::context::Criticality;
use crate::core::identifiers::PathId;
use crate::core::path::ExecutionPath;
use crate::core::route::SourceRoute;
use crate::runtime::export::ExportFormat;
use crate::runtime::export::export_records;
use crate::runtime::profiles::RouteScoringProfile;
use crate::runtime::profiles::sentinel_profile;
use crate::runtime::profiles::standard_profiles;

// ============================================================================
// SECTION: Feasibility Types
// ============================================================================

/// Overall feasibility derived from the number of failed metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeasibilityLevel {
    /// No metric failed.
    Full,
    /// One metric failed.
    Partial,
    /// Two metrics failed.
    Marginal,
    /// Three or more metrics failed.
    Infeasible,
}

impl FeasibilityLevel {
    /// Maps a failed-metric count to a level.
    #[must_use]
    pub const fn from_failed_count(failed: usize) -> Self {
        match failed {
            0 => Self::Full,
            1 => Self::Partial,
            2 => Self::Marginal,
            _ => Self::Infeasible,
        }
    }

    /// Returns the upper-case level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
            Self::Marginal => "MARGINAL",
            Self::Infeasible => "INFEASIBLE",
        }
    }
}

impl fmt::Display for FeasibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean feasibility metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityMetric {
    /// Path reached a successful terminal.
    Success,
    /// Lead time fits the required date.
    LeadTime,
    /// Cost fits the budget.
    Cost,
    /// Route suits the criticality.
    Criticality,
    /// Path visited at least one node.
    Availability,
}

/// Feasibility assessment of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityScore {
    /// Path identifier.
    pub path_id: PathId,
    /// Route the score was computed against.
    pub route: SourceRoute,
    /// Path reached a successful terminal.
    pub success: bool,
    /// Lead time fits the required date.
    pub lead_time_ok: bool,
    /// Cost fits the budget.
    pub cost_ok: bool,
    /// Route suits the criticality.
    pub criticality_match: bool,
    /// Path visited at least one node. A weak proxy for availability.
    pub available: bool,
    /// Success sub-score.
    pub success_score: f64,
    /// Lead-time sub-score.
    pub lead_time_score: f64,
    /// Cost sub-score.
    pub cost_score: f64,
    /// Risk sub-score.
    pub risk_score: f64,
    /// Static quality ceiling of the route.
    pub quality_score: f64,
    /// Weighted composite in [0, 1].
    pub composite_score: f64,
    /// Feasibility level.
    pub feasibility_level: FeasibilityLevel,
    /// Days to the required date minus the path lead time.
    #[serde(serialize_with = "crate::core::unbounded::serialize")]
    pub margin_days: f64,
    /// Cost divided by the budget.
    #[serde(serialize_with = "crate::core::unbounded::serialize")]
    pub cost_ratio: f64,
    /// Human-readable explanations.
    pub notes: Vec<String>,
}

impl FeasibilityScore {
    /// Returns the failed boolean metrics.
    #[must_use]
    pub fn failed_metrics(&self) -> Vec<FeasibilityMetric> {
        [
            (self.success, FeasibilityMetric::Success),
            (self.lead_time_ok, FeasibilityMetric::LeadTime),
            (self.cost_ok, FeasibilityMetric::Cost),
            (self.criticality_match, FeasibilityMetric::Criticality),
            (self.available, FeasibilityMetric::Availability),
        ]
        .into_iter()
        .filter_map(|(ok, metric)| (!ok).then_some(metric))
        .collect()
    }
}

/// Flat feasibility row for CSV export.
#[derive(Debug, Serialize)]
struct FeasibilityRow<'a> {
    /// Path identifier.
    path_id: &'a str,
    /// Route name.
    route: &'static str,
    /// Feasibility level.
    feasibility_level: &'static str,
    /// Composite score.
    composite_score: f64,
    /// Success sub-score.
    success_score: f64,
    /// Lead-time sub-score.
    lead_time_score: f64,
    /// Cost sub-score.
    cost_score: f64,
    /// Risk sub-score.
    risk_score: f64,
    /// Quality score.
    quality_score: f64,
    /// Success flag.
    success: bool,
    /// Lead-time flag.
    lead_time_ok: bool,
    /// Cost flag.
    cost_ok: bool,
    /// Criticality flag.
    criticality_match: bool,
    /// Availability flag.
    available: bool,
    /// Notes joined with `; `.
    notes: String,
}

impl<'a> From<&'a FeasibilityScore> for FeasibilityRow<'a> {
    fn from(score: &'a FeasibilityScore) -> Self {
        Self {
            path_id: score.path_id.as_str(),
            route: score.route.as_str(),
            feasibility_level: score.feasibility_level.as_str(),
            composite_score: score.composite_score,
            success_score: score.success_score,
            lead_time_score: score.lead_time_score,
            cost_score: score.cost_score,
            risk_score: score.risk_score,
            quality_score: score.quality_score,
            success: score.success,
            lead_time_ok: score.lead_time_ok,
            cost_ok: score.cost_ok,
            criticality_match: score.criticality_match,
            available: score.available,
            notes: score.notes.join("; "),
        }
    }
}

// ============================================================================
// SECTION: Comparison Types
// ============================================================================

/// Weights combining a feasibility score for [`PathEvaluator::compare_paths`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompareWeights {
    /// Weight of the composite score.
    pub composite: f64,
    /// Weight of the lead-time score.
    pub lead_time: f64,
    /// Weight of the cost score.
    pub cost: f64,
}

impl Default for CompareWeights {
    fn default() -> Self {
        Self {
            composite: 0.5,
            lead_time: 0.25,
            cost: 0.25,
        }
    }
}

impl CompareWeights {
    /// Combines a score's components with these weights.
    #[must_use]
    pub fn combine(&self, score: &FeasibilityScore) -> f64 {
        score.composite_score * self.composite
            + score.lead_time_score * self.lead_time
            + score.cost_score * self.cost
    }
}

/// Result of comparing candidate paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathComparison {
    /// Index of the best path in the input slice.
    pub best_index: usize,
    /// Identifier of the best path.
    pub best_path_id: PathId,
    /// Combined score of the best path.
    pub best_score: f64,
    /// Feasibility score of every candidate, in input order.
    pub scores: Vec<FeasibilityScore>,
    /// Combined score of every candidate, in input order.
    pub combined_scores: Vec<f64>,
}

/// Path with its 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPath<'a> {
    /// 1-based rank.
    pub rank: usize,
    /// Ranked path.
    pub path: &'a ExecutionPath,
    /// Feasibility score of the path.
    pub score: FeasibilityScore,
}

// ============================================================================
// SECTION: Path Evaluator
// ============================================================================

/// Scores and ranks execution paths.
#[derive(Debug, Clone)]
pub struct PathEvaluator {
    /// Profiles keyed by route.
    profiles: BTreeMap<SourceRoute, RouteScoringProfile>,
    /// Date days-to-deadline are measured from.
    reference_date: Date,
}

impl PathEvaluator {
    /// Creates an evaluator with the standard profiles.
    #[must_use]
    pub fn new(reference_date: Date) -> Self {
        Self::with_profiles(reference_date, standard_profiles())
    }

    /// Creates an evaluator with explicit profiles. Routes without a profile
    /// score with the sentinel profile's weights.
    #[must_use]
    pub const fn with_profiles(
        reference_date: Date,
        profiles: BTreeMap<SourceRoute, RouteScoringProfile>,
    ) -> Self {
        Self {
            profiles,
            reference_date,
        }
    }

    /// Returns the reference date.
    #[must_use]
    pub const fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Returns the profile for a route.
    #[must_use]
    pub fn profile(&self, route: SourceRoute) -> Option<&RouteScoringProfile> {
        self.profiles.get(&route)
    }

    /// Scores one path.
    #[must_use]
    pub fn evaluate_path(
        &self,
        path: &ExecutionPath,
        required_date: Date,
        max_budget: f64,
        criticality: Criticality,
    ) -> FeasibilityScore {
        let route = path.final_route.unwrap_or(SourceRoute::FinalResult);
        let profile = self.profiles.get(&route).cloned().unwrap_or_else(|| sentinel_profile(route));
        let mut notes = Vec::new();

        let success = path.final_success;
        let success_score = if success { profile.base_success_rate } else { 0.0 };
        if !success {
            notes.push("path did not reach a successful terminal".to_string());
        }

        let margin_days = self.days_until(required_date) - path.total_lead_time;
        let lead_time_ok = margin_days >= 0.0;
        let lead_time_score = lead_time_score(margin_days, profile.critical_lead_time_margin);
        if !lead_time_ok {
            notes.push(format!("lead time exceeds requirement by {:.1} days", -margin_days));
        }

        let cost_ratio = if max_budget > 0.0 { path.total_cost / max_budget } else { f64::INFINITY };
        let cost_ok = max_budget > 0.0 && cost_ratio <= 1.0;
        let cost_score = cost_score(cost_ratio, profile.acceptable_cost_premium);
        if !cost_ok {
            notes.push(format!("cost exceeds budget (ratio {cost_ratio:.2})"));
        }

        let criticality_match = profile.matches_any(criticality.acceptable_tags());
        let available = !path.visited_nodes.is_empty();

        let base_risk = match path.last_result() {
            None => 0.5,
            Some(result) if result.passed => 0.0,
            Some(_) => 1.0,
        };
        let risk_score = (1.0 - (base_risk + criticality.risk_penalty())).clamp(0.0, 1.0);
        let quality_score = profile.min_quality_acceptable;

        let weights = profile.weights;
        let composite_score = unit_interval(
            success_score * weights.success
                + lead_time_score * weights.lead_time
                + cost_score * weights.cost
                + risk_score * weights.risk,
        );

        let failed = [success, lead_time_ok, cost_ok, criticality_match, available]
            .iter()
            .filter(|ok| !**ok)
            .count();
        let feasibility_level = FeasibilityLevel::from_failed_count(failed);
        debug!(
            path_id = %path.path_id,
            route = %route,
            composite_score,
            level = %feasibility_level,
            "path evaluated"
        );

        FeasibilityScore {
            path_id: path.path_id.clone(),
            route,
            success,
            lead_time_ok,
            cost_ok,
            criticality_match,
            available,
            success_score,
            lead_time_score,
            cost_score,
            risk_score,
            quality_score,
            composite_score,
            feasibility_level,
            margin_days,
            cost_ratio,
            notes,
        }
    }

    /// Returns the path with the highest weighted combination of composite,
    /// lead-time, and cost scores. The first maximum wins.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn compare_paths(
        &self,
        paths: &[ExecutionPath],
        required_date: Date,
        max_budget: f64,
        criticality: Criticality,
        weights: Option<CompareWeights>,
    ) -> Option<PathComparison> {
        let weights = weights.unwrap_or_default();
        let scores: Vec<FeasibilityScore> = paths
            .iter()
            .map(|path| self.evaluate_path(path, required_date, max_budget, criticality))
            .collect();
        let combined_scores: Vec<f64> = scores.iter().map(|score| weights.combine(score)).collect();
        let mut best: Option<(usize, f64)> = None;
        for (index, combined) in combined_scores.iter().copied().enumerate() {
            if best.is_none_or(|(_, current)| combined > current) {
                best = Some((index, combined));
            }
        }
        let (best_index, best_score) = best?;
        let best_path_id = paths.get(best_index)?.path_id.clone();
        Some(PathComparison {
            best_index,
            best_path_id,
            best_score,
            scores,
            combined_scores,
        })
    }

    /// Ranks paths by composite score, best first, with 1-based ranks.
    ///
    /// Ties break by lower total cost, then lower total lead time, then input order.
    #[must_use]
    pub fn rank_paths<'a>(
        &self,
        paths: &'a [ExecutionPath],
        required_date: Date,
        max_budget: f64,
        criticality: Criticality,
    ) -> Vec<RankedPath<'a>> {
        let mut scored: Vec<(&'a ExecutionPath, FeasibilityScore)> = paths
            .iter()
            .map(|path| (path, self.evaluate_path(path, required_date, max_budget, criticality)))
            .collect();
        scored.sort_by(|(left_path, left), (right_path, right)| {
            right
                .composite_score
                .total_cmp(&left.composite_score)
                .then_with(|| compare_finite(left_path.total_cost, right_path.total_cost))
                .then_with(|| compare_finite(left_path.total_lead_time, right_path.total_lead_time))
        });
        scored
            .into_iter()
            .enumerate()
            .map(|(index, (path, score))| RankedPath {
                rank: index + 1,
                path,
                score,
            })
            .collect()
    }

    /// Writes feasibility scores as JSON or CSV.
    ///
    /// Returns false when the file cannot be written.
    #[must_use]
    pub fn export_feasibility_report(
        &self,
        scores: &[FeasibilityScore],
        path: &Path,
        format: ExportFormat,
    ) -> bool {
        let rows: Vec<FeasibilityRow<'_>> = scores.iter().map(FeasibilityRow::from).collect();
        export_records("feasibility_report", path, format, scores, &rows)
    }

    /// Whole days from the reference date to `date`.
    #[allow(clippy::cast_precision_loss, reason = "Calendar day spans fit in f64 exactly.")]
    fn days_until(&self, date: Date) -> f64 {
        (date - self.reference_date).whole_days() as f64
    }
}

// ============================================================================
// SECTION: Scoring Helpers
// ============================================================================

/// Lead-time score: 1.0 when on time, 0.5 at `-critical_margin`, 0.0 by
/// `-2 * critical_margin`.
#[must_use]
pub fn lead_time_score(margin_days: f64, critical_margin: f64) -> f64 {
    if margin_days >= 0.0 {
        return 1.0;
    }
    if critical_margin <= 0.0 {
        return 0.0;
    }
    unit_interval(decay(-margin_days, critical_margin))
}

/// Cost score: 1.0 within budget, 0.5 at `1 + premium`, 0.0 by `1 + 2 * premium`.
#[must_use]
pub fn cost_score(cost_ratio: f64, premium: f64) -> f64 {
    if cost_ratio <= 1.0 {
        return 1.0;
    }
    if premium <= 0.0 {
        return 0.0;
    }
    unit_interval(decay(cost_ratio - 1.0, premium))
}

/// Orders floats ascending with NaN last.
fn compare_finite(left: f64, right: f64) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.total_cmp(&right),
    }
}

/// Bounds a score to [0, 1], mapping NaN to 0.
fn unit_interval(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

/// Piecewise-linear decay of an overrun: 1.0 at zero, 0.5 at `tolerance`,
/// 0.0 at `2 * tolerance`. `tolerance` must be positive.
fn decay(overrun: f64, tolerance: f64) -> f64 {
    if overrun <= tolerance {
        1.0 - (overrun / tolerance) * 0.5
    } else {
        0.5 - ((overrun - tolerance) / tolerance) * 0.5
    }
}
