//! Connector metadata stub.
//!
//! Hosts that present configuration forms to operators read them from the
//! connector's metadata. The engine itself never interprets forms; today's
//! connectors advertise empty lists.

use serde::{Deserialize, Serialize};

/// One configuration form descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigForm {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
}

/// Metadata a connector advertises to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub id: String,
    #[serde(default)]
    connection_forms: Vec<ConfigForm>,
    #[serde(default)]
    job_forms: Vec<ConfigForm>,
}

impl ConnectorMetadata {
    /// Metadata with no configuration forms.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connection_forms: Vec::new(),
            job_forms: Vec::new(),
        }
    }

    #[must_use]
    pub fn connection_forms(&self) -> &[ConfigForm] {
        &self.connection_forms
    }

    #[must_use]
    pub fn job_forms(&self) -> &[ConfigForm] {
        &self.job_forms
    }
}
