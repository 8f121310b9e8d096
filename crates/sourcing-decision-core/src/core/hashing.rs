// crates/sourcing-decision-core/src/core/hashing.rs
// ============================================================================
// Module: Context Fingerprint Hashing
// Description: Canonical JSON encoding and SHA-256 digests for contexts.
// Purpose: Key the gate cache on a stable digest of every context fact.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Gate results are memoized per `(gate, context hash)`. The hash covers the
//! entire [`ExecutionContext`], so two contexts share a cache entry only when
//! every fact a predicate could read is identical.
//!
//! Floats are fingerprinted by their IEEE-754 bit pattern. This keeps
//! infinities and negative zero distinct without going through JSON numbers,
//! which cannot represent non-finite values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::context::ExecutionContext;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 over canonical JSON bytes.
    Sha256,
}

/// Hex-encoded content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced the digest.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl HashDigest {
    /// Returns a digest with no value; used when a gate was never evaluated.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            value: String::new(),
        }
    }

    /// Returns true when the digest carries no value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while fingerprinting a context.
#[derive(Debug, Error)]
pub enum HashError {
    /// Canonical JSON encoding failed.
    #[error("failed to canonicalize context: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Context Fingerprint
// ============================================================================

/// Canonical projection of an [`ExecutionContext`].
#[derive(Debug, Serialize)]
struct ContextFingerprint<'a> {
    /// Item identifier.
    item_id: &'a str,
    /// Demand quantity bits.
    demand_quantity: String,
    /// ISO-8601 required date.
    required_date: String,
    /// Local stock bits.
    local_stock_available: String,
    /// Local assets bits.
    local_assets_available: String,
    /// BOM components with quantity bits.
    bom_components_available: BTreeMap<&'a str, String>,
    /// Substitutes in caller order.
    substitutes_available: &'a [String],
    /// Transfer centers with quantity bits.
    transfer_centers_available: BTreeMap<&'a str, String>,
    /// Intercompany flag.
    intercompany_available: bool,
    /// VMI flag.
    vmi_contract_active: bool,
    /// Loan flag.
    loan_partner_available: bool,
    /// Days to deadline bits.
    days_to_deadline: String,
    /// Expedite flag.
    can_expedite: bool,
    /// Expedite budget bits.
    expedite_budget_available: String,
    /// Supplier flag.
    supplier_available: bool,
    /// Supplier lead time bits.
    supplier_lead_time_days: String,
    /// Criticality label.
    criticality: &'static str,
    /// Budget bits.
    budget_available: String,
    /// Max cost bits.
    max_acceptable_cost: String,
    /// Context tags in sorted order.
    context_tags: Vec<&'a str>,
}

impl<'a> ContextFingerprint<'a> {
    /// Projects a context into its canonical fingerprint.
    fn from_context(context: &'a ExecutionContext) -> Self {
        Self {
            item_id: context.item_id.as_str(),
            demand_quantity: float_bits(context.demand_quantity),
            required_date: context.required_date.to_string(),
            local_stock_available: float_bits(context.local_stock_available),
            local_assets_available: float_bits(context.local_assets_available),
            bom_components_available: float_map(&context.bom_components_available),
            substitutes_available: &context.substitutes_available,
            transfer_centers_available: float_map(&context.transfer_centers_available),
            intercompany_available: context.intercompany_available,
            vmi_contract_active: context.vmi_contract_active,
            loan_partner_available: context.loan_partner_available,
            days_to_deadline: float_bits(context.days_to_deadline),
            can_expedite: context.can_expedite,
            expedite_budget_available: float_bits(context.expedite_budget_available),
            supplier_available: context.supplier_available,
            supplier_lead_time_days: float_bits(context.supplier_lead_time_days),
            criticality: context.criticality.as_str(),
            budget_available: float_bits(context.budget_available),
            max_acceptable_cost: float_bits(context.max_acceptable_cost),
            context_tags: context.context_tags.iter().map(String::as_str).collect(),
        }
    }
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns RFC 8785 canonical JSON bytes for a serializable value.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes raw bytes with SHA-256.
#[must_use]
pub fn sha256_digest(bytes: &[u8]) -> HashDigest {
    let digest = Sha256::digest(bytes);
    HashDigest {
        algorithm: HashAlgorithm::Sha256,
        value: hex_encode(&digest),
    }
}

/// Computes the cache key digest for a context.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the fingerprint cannot be encoded.
pub fn context_hash(context: &ExecutionContext) -> Result<HashDigest, HashError> {
    let fingerprint = ContextFingerprint::from_context(context);
    let bytes = canonical_json_bytes(&fingerprint)?;
    Ok(sha256_digest(&bytes))
}

/// Encodes a float as the hex form of its bit pattern.
fn float_bits(value: f64) -> String {
    format!("{:016x}", value.to_bits())
}

/// Converts a float map into a bit-pattern map with borrowed keys.
fn float_map(values: &BTreeMap<String, f64>) -> BTreeMap<&str, String> {
    values.iter().map(|(key, value)| (key.as_str(), float_bits(*value))).collect()
}

/// Encodes bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
