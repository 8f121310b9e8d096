// crates/sourcing-decision-core/src/runtime/standard.rs
// ============================================================================
// Module: Standard Sourcing Tree
// Description: The canonical 12-route sourcing topology and its gates.
// Purpose: Provide the default graph callers evaluate requisition lines against.
// Dependencies: crate::{core, interfaces, runtime::tree}
// ============================================================================

//! ## Overview
//! Node ids `node_1` through `node_12` map to routes 1-12 and are a stable
//! contract. Every chain converges on `node_12` (the terminal sentinel), which
//! has no gates.
//!
//! | from | success | failure |
//! |------|---------|---------|
//! | 1    | 2       | 3       |
//! | 2    | 3       | 4       |
//! | 3    | 4       | 5       |
//! | 4    | 5       | 6       |
//! | 5    | 6       | 7       |
//! | 6    | 8       | 7       |
//! | 7    | 8       | 9       |
//! | 8    | 9       | 10      |
//! | 9    | 10      | 11      |
//! | 10   | 12      | 12      |
//! | 11   | 12      | 12      |

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::context::ExecutionContext;
use crate::core::identifiers::NodeId;
use crate::core::route::GateType;
use crate::core::route::SourceRoute;
use crate::interfaces::GatePredicate;
use crate::interfaces::PredicateError;
use crate::runtime::tree::DecisionTree;
use crate::runtime::tree::DecisionTreeBuilder;
use crate::runtime::tree::Gate;
use crate::runtime::tree::NodeEstimates;
use crate::runtime::tree::TreeError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum budget required before recovery is considered viable.
pub const RECOVERY_MIN_BUDGET: f64 = 30.0;

/// Static definition of one standard node.
struct NodeDef {
    /// Route number, also the node id suffix.
    number: u8,
    /// Route.
    route: SourceRoute,
    /// Display name.
    name: &'static str,
    /// Description.
    description: &'static str,
    /// Static estimates.
    estimates: NodeEstimates,
}

/// Standard node definitions in route order.
const NODES: [NodeDef; 12] = [
    NodeDef {
        number: 1,
        route: SourceRoute::StockLocal,
        name: "Stock Local",
        description: "Release available local stock",
        estimates: NodeEstimates::new(1.0, 10.0, 0.95),
    },
    NodeDef {
        number: 2,
        route: SourceRoute::StockLocalAssets,
        name: "Stock Local + Assets",
        description: "Release local stock together with held assets",
        estimates: NodeEstimates::new(2.0, 15.0, 0.85),
    },
    NodeDef {
        number: 3,
        route: SourceRoute::Disassembly,
        name: "Disassembly",
        description: "Disassemble a parent BOM",
        estimates: NodeEstimates::new(3.0, 25.0, 0.70),
    },
    NodeDef {
        number: 4,
        route: SourceRoute::Substitutes,
        name: "Substitutes",
        description: "Use approved substitutes",
        estimates: NodeEstimates::new(2.0, 20.0, 0.75),
    },
    NodeDef {
        number: 5,
        route: SourceRoute::Recovery,
        name: "Recovery",
        description: "Recover parts from teardown",
        estimates: NodeEstimates::new(4.0, 30.0, 0.60),
    },
    NodeDef {
        number: 6,
        route: SourceRoute::Transfer,
        name: "Transfer",
        description: "Transfer stock between sites",
        estimates: NodeEstimates::new(3.0, 35.0, 0.80),
    },
    NodeDef {
        number: 7,
        route: SourceRoute::Intercompany,
        name: "Intercompany",
        description: "Buy from an affiliated company",
        estimates: NodeEstimates::new(5.0, 45.0, 0.75),
    },
    NodeDef {
        number: 8,
        route: SourceRoute::Vmi,
        name: "VMI",
        description: "Draw from vendor-managed inventory",
        estimates: NodeEstimates::new(7.0, 40.0, 0.70),
    },
    NodeDef {
        number: 9,
        route: SourceRoute::Loan,
        name: "Loan",
        description: "Borrow from a partner",
        estimates: NodeEstimates::new(2.0, 50.0, 0.50),
    },
    NodeDef {
        number: 10,
        route: SourceRoute::Expedite,
        name: "Expedite",
        description: "Rush delivery from a supplier",
        estimates: NodeEstimates::new(1.0, 100.0, 0.85),
    },
    NodeDef {
        number: 11,
        route: SourceRoute::Purchase,
        name: "Purchase",
        description: "Standard supplier purchase",
        estimates: NodeEstimates::new(14.0, 50.0, 0.95),
    },
    NodeDef {
        number: 12,
        route: SourceRoute::FinalResult,
        name: "Final Result",
        description: "Terminal decision node",
        estimates: NodeEstimates::new(0.0, 0.0, 1.0),
    },
];

/// Edges: (from, success, failure).
const EDGES: [(u8, u8, u8); 11] = [
    (1, 2, 3),
    (2, 3, 4),
    (3, 4, 5),
    (4, 5, 6),
    (5, 6, 7),
    (6, 8, 7),
    (7, 8, 9),
    (8, 9, 10),
    (9, 10, 11),
    (10, 12, 12),
    (11, 12, 12),
];

// ============================================================================
// SECTION: Standard Tree
// ============================================================================

/// Returns the id of the standard node for a route number.
#[must_use]
pub fn standard_node_id(number: u8) -> NodeId {
    NodeId::new(format!("node_{number}"))
}

/// Builds the standard 12-route sourcing tree.
///
/// # Errors
///
/// Returns [`TreeError`] only if the static topology is inconsistent.
pub fn standard_decision_tree() -> Result<DecisionTree, TreeError> {
    let mut builder = DecisionTreeBuilder::new();
    for node in NODES {
        builder.create_node(
            standard_node_id(node.number),
            node.route,
            node.name,
            node.description,
            node.estimates,
        )?;
    }
    for (number, gate) in standard_gates() {
        builder.add_gate_to_node(&standard_node_id(number), gate)?;
    }
    for (from, success, failure) in EDGES {
        builder.connect_nodes(
            &standard_node_id(from),
            &standard_node_id(success),
            Some(&standard_node_id(failure)),
        )?;
    }
    builder.build()
}

/// Gates of the standard tree paired with their node number.
fn standard_gates() -> Vec<(u8, Gate)> {
    vec![
        (
            1,
            Gate::new("gate_stock_available", GateType::Availability, "Local stock covers demand")
                .with_predicate(Fact(stock_covers_demand)),
        ),
        (
            2,
            Gate::new("gate_assets_available", GateType::Availability, "Held assets available")
                .with_predicate(Fact(assets_available)),
        ),
        (
            3,
            Gate::new("gate_bom_available", GateType::Availability, "BOM components available")
                .with_predicate(Fact(bom_available)),
        ),
        (
            4,
            Gate::new("gate_substitutes_approved", GateType::Quality, "Approved substitutes exist")
                .with_predicate(Fact(substitutes_available)),
        ),
        (
            5,
            Gate::new("gate_recovery_viable", GateType::Cost, "Recovery is economically viable")
                .with_predicate(Fact(recovery_viable))
                .with_threshold(RECOVERY_MIN_BUDGET),
        ),
        (
            6,
            Gate::new("gate_transfer_available", GateType::Availability, "Transfer stock covers demand")
                .with_predicate(Fact(transfer_covers_demand)),
        ),
        (
            7,
            Gate::new(
                "gate_intercompany_available",
                GateType::Relationship,
                "Affiliated company can supply",
            )
            .with_predicate(Fact(intercompany_available)),
        ),
        (
            8,
            Gate::new("gate_vmi_active", GateType::Relationship, "VMI contract in force")
                .with_predicate(Fact(vmi_active)),
        ),
        (
            9,
            Gate::new("gate_loan_partner_available", GateType::Relationship, "Loan partner available")
                .with_predicate(Fact(loan_partner_available)),
        ),
        (
            10,
            Gate::new("gate_expedite_available", GateType::Timing, "Supplier accepts rush delivery")
                .with_predicate(Fact(expedite_available)),
        ),
        (
            10,
            Gate::new("gate_expedite_budget", GateType::Cost, "Expedite budget reserved")
                .with_predicate(Fact(expedite_budget_available)),
        ),
        (
            11,
            Gate::new("gate_supplier_available", GateType::Availability, "Qualified supplier exists")
                .with_predicate(Fact(supplier_available)),
        ),
    ]
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Infallible predicate over context facts.
#[derive(Debug, Clone, Copy)]
struct Fact(fn(&ExecutionContext) -> bool);

impl GatePredicate for Fact {
    fn evaluate(&self, context: &ExecutionContext) -> Result<bool, PredicateError> {
        Ok((self.0)(context))
    }
}

/// Local stock covers the demand.
fn stock_covers_demand(context: &ExecutionContext) -> bool {
    context.local_stock_available >= context.demand_quantity
}

/// Any held assets can be released.
fn assets_available(context: &ExecutionContext) -> bool {
    context.local_assets_available > 0.0
}

/// At least one BOM component is available.
fn bom_available(context: &ExecutionContext) -> bool {
    !context.bom_components_available.is_empty()
}

/// At least one approved substitute exists.
fn substitutes_available(context: &ExecutionContext) -> bool {
    !context.substitutes_available.is_empty()
}

/// Assets exist and the budget covers recovery.
fn recovery_viable(context: &ExecutionContext) -> bool {
    context.local_assets_available > 0.0 && context.budget_available >= RECOVERY_MIN_BUDGET
}

/// Stock across transfer centers covers the demand.
fn transfer_covers_demand(context: &ExecutionContext) -> bool {
    context.transfer_total() >= context.demand_quantity
}

/// An affiliated company can supply.
fn intercompany_available(context: &ExecutionContext) -> bool {
    context.intercompany_available
}

/// A VMI contract is in force.
fn vmi_active(context: &ExecutionContext) -> bool {
    context.vmi_contract_active
}

/// A loan partner is available.
fn loan_partner_available(context: &ExecutionContext) -> bool {
    context.loan_partner_available
}

/// The supplier accepts rush delivery.
fn expedite_available(context: &ExecutionContext) -> bool {
    context.can_expedite
}

/// Budget is reserved for expediting.
fn expedite_budget_available(context: &ExecutionContext) -> bool {
    context.expedite_budget_available > 0.0
}

/// A qualified supplier exists.
fn supplier_available(context: &ExecutionContext) -> bool {
    context.supplier_available
}
