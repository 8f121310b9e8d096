// crates/sourcing-decision-core/src/core/unbounded.rs
// ============================================================================
// Module: Unbounded Float Encoding
// Description: Serde helpers for `f64` fields that may hold infinities.
// Purpose: Keep unbounded budgets and failed-path totals round-trippable.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! JSON has no representation for non-finite numbers, and `serde_json` writes
//! them as `null`. Fields that legitimately carry `f64::INFINITY` (an
//! unbounded budget, the totals of a failed path) use this module through
//! `#[serde(with = "...")]`: finite values stay plain numbers and non-finite
//! values are written as the labels `"inf"`, `"-inf"`, or `"nan"`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serializer;
use serde::de::Error as _;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Label for positive infinity.
pub const POSITIVE_INFINITY_LABEL: &str = "inf";
/// Label for negative infinity.
pub const NEGATIVE_INFINITY_LABEL: &str = "-inf";
/// Label for NaN.
pub const NAN_LABEL: &str = "nan";

/// Wire form accepted on input.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireFloat {
    /// Plain JSON number.
    Number(f64),
    /// Non-finite label.
    Label(String),
}

// ============================================================================
// SECTION: Serde Functions
// ============================================================================

/// Serializes a float, writing non-finite values as labels.
///
/// # Errors
///
/// Returns the serializer's error.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Signature required by serde(with).")]
pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = *value;
    if value.is_nan() {
        serializer.serialize_str(NAN_LABEL)
    } else if value.is_infinite() {
        let label =
            if value.is_sign_positive() { POSITIVE_INFINITY_LABEL } else { NEGATIVE_INFINITY_LABEL };
        serializer.serialize_str(label)
    } else {
        serializer.serialize_f64(value)
    }
}

/// Deserializes a float written by [`serialize`].
///
/// # Errors
///
/// Returns an error for strings other than the non-finite labels.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match WireFloat::deserialize(deserializer)? {
        WireFloat::Number(value) => Ok(value),
        WireFloat::Label(label) => match label.as_str() {
            POSITIVE_INFINITY_LABEL => Ok(f64::INFINITY),
            NEGATIVE_INFINITY_LABEL => Ok(f64::NEG_INFINITY),
            NAN_LABEL => Ok(f64::NAN),
            other => Err(D::Error::custom(format!("unrecognized float label: {other}"))),
        },
    }
}
