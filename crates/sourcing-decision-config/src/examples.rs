// crates/sourcing-decision-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for sourcing decision configuration. The example lists
//! every key with its default value plus two gate overrides.

/// Returns a canonical example `sourcing-decision.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[engine]
max_depth = 12
use_gate_cache = true

[gate_manager]
max_cache_size = 1000

[comparison]
composite = 0.5
lead_time = 0.25
cost = 0.25

[[gates]]
gate_id = "gate_vmi_active"
enabled = false
severity = "warning"
applicable_contexts = []
not_applicable_contexts = []

[[gates]]
gate_id = "gate_expedite_budget"
severity = "critical"
applicable_contexts = ["urgent"]
"#,
    )
}
