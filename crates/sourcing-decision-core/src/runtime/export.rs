// crates/sourcing-decision-core/src/runtime/export.rs
// ============================================================================
// Module: Audit Export
// Description: JSON and CSV writers for audit, execution, and feasibility logs.
// Purpose: Give every export surface the same non-throwing contract.
// Dependencies: csv, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Exports write to a caller-supplied path. JSON exports write one pretty
//! array; CSV exports write one header row plus one row per record. Public
//! export methods return `false` on failure and log the error; the typed
//! [`ExportError`] is used internally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use tracing::info;

// ============================================================================
// SECTION: Export Format
// ============================================================================

/// Supported export encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// CSV with a header row.
    Csv,
}

impl ExportFormat {
    /// Returns the lower-case format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ExportError::UnsupportedFormat(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File could not be created or written.
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encoding failed.
    #[error("export json error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV encoding failed.
    #[error("export csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Format name not recognized.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Writes records as a pretty JSON array.
///
/// # Errors
///
/// Returns [`ExportError`] when the file cannot be written or encoding fails.
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes records as CSV with a header row derived from the record fields.
///
/// # Errors
///
/// Returns [`ExportError`] when the file cannot be written or encoding fails.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `json_records` or `csv_records` depending on `format`.
///
/// Returns false and logs the error when the export fails.
pub(crate) fn export_records<J: Serialize, C: Serialize>(
    kind: &'static str,
    path: &Path,
    format: ExportFormat,
    json_records: &[J],
    csv_records: &[C],
) -> bool {
    let result = match format {
        ExportFormat::Json => write_json(path, json_records),
        ExportFormat::Csv => write_csv(path, csv_records),
    };
    match result {
        Ok(()) => {
            info!(kind, format = %format, path = %path.display(), records = json_records.len(), "export written");
            true
        }
        Err(err) => {
            error!(kind, format = %format, path = %path.display(), error = %err, "export failed");
            false
        }
    }
}
