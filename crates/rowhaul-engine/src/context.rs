//! Execution context resolution.
//!
//! A unit runs under exactly one role. The resolver is a pure function of
//! the unit configuration: it selects the role's option namespace and the
//! matching connection/job configuration, and rejects anything outside the
//! recognized role set before any heartbeat or extractor activity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::UnitConfig;
use crate::error::UnitError;

/// Option namespace for extractor-space (produce) runs.
pub const EXTRACTOR_NAMESPACE: &str = "extractor.";
/// Option namespace for framework-space (consume) runs.
pub const FRAMEWORK_NAMESPACE: &str = "";

/// Recognized run roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRole {
    /// Import: the extractor runs in its own (connector) space.
    Produce,
    /// Export: the extractor runs in framework space.
    Consume,
}

/// Read-only, prefix-scoped view over the flat option entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedConfig {
    entries: BTreeMap<String, String>,
    prefix: String,
}

impl ScopedConfig {
    /// Scope `entries` to the given namespace prefix.
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>, prefix: impl Into<String>) -> Self {
        Self {
            entries,
            prefix: prefix.into(),
        }
    }

    /// Look up `key` inside this namespace.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&format!("{}{}", self.prefix, key))
            .map(String::as_str)
    }

    /// The namespace prefix this view is scoped to.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Role-scoped configuration view, resolved once per run and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    role: RunRole,
    options: ScopedConfig,
    connection: serde_json::Value,
    job: serde_json::Value,
}

impl ExecutionContext {
    #[must_use]
    pub fn role(&self) -> RunRole {
        self.role
    }

    /// Namespace-scoped option entries for this role.
    #[must_use]
    pub fn options(&self) -> &ScopedConfig {
        &self.options
    }

    /// Connection configuration for this role's space.
    #[must_use]
    pub fn connection_config(&self) -> &serde_json::Value {
        &self.connection
    }

    /// Job configuration for this role's space.
    #[must_use]
    pub fn job_config(&self) -> &serde_json::Value {
        &self.job
    }
}

/// Resolve the role-scoped execution context for a unit.
///
/// Pure function of its inputs; no side effects.
///
/// # Errors
///
/// Returns [`UnitError::UnsupportedRole`] for any role outside the
/// recognized set.
pub fn resolve_context(config: &UnitConfig) -> Result<ExecutionContext, UnitError> {
    let (role, prefix, side) = match config.role.as_str() {
        "produce" => (RunRole::Produce, EXTRACTOR_NAMESPACE, &config.produce),
        "consume" => (RunRole::Consume, FRAMEWORK_NAMESPACE, &config.consume),
        other => {
            return Err(UnitError::UnsupportedRole {
                role: other.to_string(),
            })
        }
    };

    Ok(ExecutionContext {
        role,
        options: ScopedConfig::new(config.entries.clone(), prefix),
        connection: side.connection.clone(),
        job: side.job.clone(),
    })
}
