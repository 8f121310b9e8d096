//! Config file loading tests for sourcing-decision-config.
// crates/sourcing-decision-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate file loading limits and error classification.
// Purpose: Ensure unreadable, oversized, or malformed files fail closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Test failure messages include debug output.")]

use std::fs;

use sourcing_decision_config::ConfigError;
use sourcing_decision_config::MAX_CONFIG_FILE_SIZE;
use sourcing_decision_config::SourcingConfig;
use sourcing_decision_config::config_toml_example;

mod common;

use crate::common::TestResult;

#[test]
fn load_reads_and_validates_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("sourcing-decision.toml");
    fs::write(&path, config_toml_example()).map_err(|err| err.to_string())?;

    let config = SourcingConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.gates.len() != 2 {
        return Err(format!("expected 2 gate overrides, got {}", config.gates.len()));
    }
    if config.source_modified_at.is_none() {
        return Err("source modification time should be recorded".to_string());
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_file_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("large.toml");
    let padding = format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size limit error, got {other:?}")),
    }
}

#[test]
fn non_utf8_file_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 error, got {other:?}")),
    }
}

#[test]
fn malformed_toml_is_parse_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[engine\nmax_depth = 3").map_err(|err| err.to_string())?;
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn invalid_values_fail_on_load() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("invalid.toml");
    fs::write(&path, "[engine]\nmax_depth = 100\n").map_err(|err| err.to_string())?;
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(message)) if message.contains("engine.max_depth") => Ok(()),
        other => Err(format!("expected max_depth error, got {other:?}")),
    }
}

#[test]
fn overlong_path_component_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("a".repeat(300));
    match SourcingConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(message)) if message.contains("component too long") => Ok(()),
        other => Err(format!("expected path component error, got {other:?}")),
    }
}
