//! Unit configuration: YAML parsing with environment variable substitution
//! and semantic validation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use rowhaul_types::Schema;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var regex"));

/// Role-side connection and job configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideConfig {
    /// Connection parameters for this side.
    #[serde(default)]
    pub connection: serde_json::Value,
    /// Job parameters for this side.
    #[serde(default)]
    pub job: serde_json::Value,
}

/// Heartbeat schedule settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Tick period in seconds.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// Graceful shutdown grace window in seconds.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

fn default_period_secs() -> u64 {
    120
}

fn default_grace_secs() -> u64 {
    5
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            grace_secs: default_grace_secs(),
        }
    }
}

impl HeartbeatConfig {
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

/// Configuration for one extraction unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unit name, used for logging only.
    pub unit: String,
    /// Run role: `produce` or `consume`. Checked at context resolution.
    pub role: String,
    /// Logical name of the extractor in the registry.
    pub extractor: String,
    /// Schema bound to the intermediate format for this run.
    pub schema: Schema,
    /// Flat namespaced option entries (see [`crate::context::ScopedConfig`]).
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
    /// Extractor-space connection and job configuration.
    #[serde(default)]
    pub produce: SideConfig,
    /// Framework-space connection and job configuration.
    #[serde(default)]
    pub consume: SideConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

/// Substitute `${VAR_NAME}` patterns with environment variable values.
///
/// # Errors
///
/// Returns an error if any referenced environment variable is not set.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = input.to_string();
    let mut missing = Vec::new();

    for cap in ENV_VAR_RE.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => missing.push(var_name.to_string()),
        }
    }

    if !missing.is_empty() {
        anyhow::bail!("Missing environment variable(s): {}", missing.join(", "));
    }

    Ok(result)
}

/// Parse a unit YAML string (after env var substitution).
///
/// # Errors
///
/// Returns an error if env var substitution fails or the YAML is invalid.
pub fn parse_unit_str(yaml_str: &str) -> Result<UnitConfig> {
    let substituted = substitute_env_vars(yaml_str)?;
    let config: UnitConfig =
        serde_yaml::from_str(&substituted).context("Failed to parse unit YAML")?;
    Ok(config)
}

/// Parse a unit YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML is invalid.
pub fn parse_unit(path: &Path) -> Result<UnitConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read unit file: {}", path.display()))?;
    parse_unit_str(&content)
}

/// Validate a parsed unit configuration.
///
/// Returns `Ok(())` if valid, Err with all validation errors if not. The
/// role string is deliberately not checked here; role recognition is the
/// context resolver's contract.
pub fn validate_unit(config: &UnitConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.unit.trim().is_empty() {
        errors.push("unit: name must not be empty".to_string());
    }
    if config.extractor.trim().is_empty() {
        errors.push("extractor: logical name must not be empty".to_string());
    }
    if config.heartbeat.period_secs == 0 {
        errors.push("heartbeat.period_secs: must be > 0".to_string());
    }
    if config.heartbeat.grace_secs == 0 {
        errors.push("heartbeat.grace_secs: must be > 0".to_string());
    }

    if !errors.is_empty() {
        anyhow::bail!("Invalid unit configuration:\n  - {}", errors.join("\n  - "));
    }
    Ok(())
}
