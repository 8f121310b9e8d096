// crates/sourcing-decision-config/src/config.rs
// ============================================================================
// Module: Sourcing Decision Configuration
// Description: Configuration loading and validation for the sourcing engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: sourcing-decision-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to the engine defaults. Invalid
//! values fail closed with [`ConfigError::Invalid`] naming the offending key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use sourcing_decision_core::CompareWeights;
use sourcing_decision_core::DEFAULT_MAX_CACHE_SIZE;
use sourcing_decision_core::DEFAULT_MAX_DEPTH;
use sourcing_decision_core::EngineConfig;
use sourcing_decision_core::GateConfiguration;
use sourcing_decision_core::GateId;
use sourcing_decision_core::GateManager;
use sourcing_decision_core::GateManagerConfig;
use sourcing_decision_core::Severity;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sourcing-decision.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SOURCING_DECISION_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Smallest accepted traversal depth.
pub const MIN_MAX_DEPTH: usize = 1;
/// Largest accepted traversal depth.
pub const MAX_MAX_DEPTH: usize = 64;
/// Largest accepted gate cache size.
pub const MAX_CACHE_SIZE_LIMIT: usize = 1_000_000;
/// Maximum number of per-gate overrides.
pub const MAX_GATE_OVERRIDES: usize = 1024;
/// Maximum length of a gate id or context tag.
const MAX_IDENTIFIER_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcingConfig {
    /// Traversal settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Gate cache settings.
    #[serde(default)]
    pub gate_manager: GateManagerSettings,
    /// Weights used when comparing candidate paths.
    #[serde(default)]
    pub comparison: ComparisonSettings,
    /// Per-gate configuration overrides.
    #[serde(default)]
    pub gates: Vec<GateOverride>,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl SourcingConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then the `SOURCING_DECISION_CONFIG`
    /// environment variable, then `sourcing-decision.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.gate_manager.validate()?;
        self.comparison.validate()?;
        if self.gates.len() > MAX_GATE_OVERRIDES {
            return Err(ConfigError::Invalid("too many gate overrides".to_string()));
        }
        let mut seen = BTreeSet::new();
        for gate in &self.gates {
            gate.validate()?;
            if !seen.insert(gate.gate_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate gate override: {}",
                    gate.gate_id
                )));
            }
        }
        Ok(())
    }

    /// Returns the core engine settings.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_depth: self.engine.max_depth,
            use_gate_cache: self.engine.use_gate_cache,
        }
    }

    /// Returns the core gate manager settings.
    #[must_use]
    pub const fn gate_manager_config(&self) -> GateManagerConfig {
        GateManagerConfig {
            max_cache_size: self.gate_manager.max_cache_size,
        }
    }

    /// Returns the path comparison weights.
    #[must_use]
    pub const fn compare_weights(&self) -> CompareWeights {
        CompareWeights {
            composite: self.comparison.composite,
            lead_time: self.comparison.lead_time,
            cost: self.comparison.cost,
        }
    }

    /// Applies every gate override to a manager.
    ///
    /// All override ids are checked before any configuration changes, so a
    /// failed call leaves the manager untouched. Returns the number of gates
    /// reconfigured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override names a gate the
    /// manager does not know.
    pub fn apply_gate_overrides(&self, manager: &mut GateManager) -> Result<usize, ConfigError> {
        let overrides: Vec<(GateId, GateConfiguration)> = self
            .gates
            .iter()
            .map(|gate| (GateId::new(gate.gate_id.as_str()), gate.to_configuration()))
            .collect();
        let unknown = overrides.iter().find(|(gate_id, _)| !manager.contains_gate(gate_id));
        if let Some((gate_id, _)) = unknown {
            return Err(ConfigError::Invalid(format!(
                "gates override references unregistered gate: {gate_id}"
            )));
        }
        let count = overrides.len();
        for (gate_id, config) in overrides {
            manager.configure_gate(&gate_id, config);
        }
        Ok(count)
    }
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// `[engine]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum nodes visited per path.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Whether gate evaluations through a manager use its cache.
    #[serde(default = "default_use_gate_cache")]
    pub use_gate_cache: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            use_gate_cache: default_use_gate_cache(),
        }
    }
}

impl EngineSettings {
    /// Validates the traversal bound.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MAX_DEPTH..=MAX_MAX_DEPTH).contains(&self.max_depth) {
            return Err(ConfigError::Invalid(format!(
                "engine.max_depth must be between {MIN_MAX_DEPTH} and {MAX_MAX_DEPTH}"
            )));
        }
        Ok(())
    }
}

/// `[gate_manager]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateManagerSettings {
    /// Maximum number of cached evaluations.
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,
}

impl Default for GateManagerSettings {
    fn default() -> Self {
        Self {
            max_cache_size: default_max_cache_size(),
        }
    }
}

impl GateManagerSettings {
    /// Validates the cache bound.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cache_size == 0 || self.max_cache_size > MAX_CACHE_SIZE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "gate_manager.max_cache_size must be between 1 and {MAX_CACHE_SIZE_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// `[comparison]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSettings {
    /// Weight of the composite score.
    #[serde(default = "default_composite_weight")]
    pub composite: f64,
    /// Weight of the lead-time score.
    #[serde(default = "default_lead_time_weight")]
    pub lead_time: f64,
    /// Weight of the cost score.
    #[serde(default = "default_cost_weight")]
    pub cost: f64,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            composite: default_composite_weight(),
            lead_time: default_lead_time_weight(),
            cost: default_cost_weight(),
        }
    }
}

impl ComparisonSettings {
    /// Validates the weights are usable.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in
            [("composite", self.composite), ("lead_time", self.lead_time), ("cost", self.cost)]
        {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "comparison.{name} must be a finite, non-negative number"
                )));
            }
        }
        if self.composite + self.lead_time + self.cost <= 0.0 {
            return Err(ConfigError::Invalid(
                "comparison weights must sum to more than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[[gates]]` entry overriding one gate's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateOverride {
    /// Gate the override applies to.
    pub gate_id: String,
    /// Disabled gates are bypassed and report open.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Severity used when results are grouped by severity.
    #[serde(default)]
    pub severity: Severity,
    /// When non-empty, the gate applies only to contexts with one of these tags.
    #[serde(default)]
    pub applicable_contexts: BTreeSet<String>,
    /// The gate never applies to contexts with one of these tags.
    #[serde(default)]
    pub not_applicable_contexts: BTreeSet<String>,
}

impl GateOverride {
    /// Returns the core gate configuration for this override.
    #[must_use]
    pub fn to_configuration(&self) -> GateConfiguration {
        GateConfiguration {
            enabled: self.enabled,
            severity: self.severity,
            applicable_contexts: self.applicable_contexts.clone(),
            not_applicable_contexts: self.not_applicable_contexts.clone(),
        }
    }

    /// Validates identifiers and tag sets.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier("gates.gate_id", &self.gate_id)?;
        for tag in self.applicable_contexts.iter().chain(&self.not_applicable_contexts) {
            validate_identifier("gates context tag", tag)?;
        }
        let mut overlap = self.applicable_contexts.intersection(&self.not_applicable_contexts);
        if let Some(tag) = overlap.next() {
            return Err(ConfigError::Invalid(format!(
                "gate {} lists context {tag} as both applicable and not applicable",
                self.gate_id
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a gate id or tag: non-empty, trimmed, and bounded.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.trim() != value {
        return Err(ConfigError::Invalid(format!("{field} must not have surrounding whitespace")));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Default traversal depth.
const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Default gate cache switch.
const fn default_use_gate_cache() -> bool {
    true
}

/// Default gate cache size.
const fn default_max_cache_size() -> usize {
    DEFAULT_MAX_CACHE_SIZE
}

/// Default composite weight.
const fn default_composite_weight() -> f64 {
    0.5
}

/// Default lead-time weight.
const fn default_lead_time_weight() -> f64 {
    0.25
}

/// Default cost weight.
const fn default_cost_weight() -> f64 {
    0.25
}

/// Default gate enablement.
const fn default_enabled() -> bool {
    true
}
