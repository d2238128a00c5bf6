//! Partition descriptor assigned to one extraction unit.

use serde::{Deserialize, Serialize};

/// Opaque, immutable range descriptor for the chunk of source data one
/// extraction unit processes.
///
/// The descriptor's meaning is private to the extractor that produced the
/// partitioning; the engine only carries it. A partition may additionally
/// carry the current dataset name for sources that fan records out across
/// multiple named outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    descriptor: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_dataset: Option<String>,
}

impl Partition {
    /// Create a partition from an extractor-defined descriptor.
    #[must_use]
    pub fn new(descriptor: serde_json::Value) -> Self {
        Self {
            descriptor,
            current_dataset: None,
        }
    }

    /// Attach the current dataset name (fan-out sources only).
    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.current_dataset = Some(dataset.into());
        self
    }

    /// The opaque descriptor as assigned.
    #[must_use]
    pub fn descriptor(&self) -> &serde_json::Value {
        &self.descriptor
    }

    /// Current dataset name, if this partition carries one.
    #[must_use]
    pub fn current_dataset(&self) -> Option<&str> {
        self.current_dataset.as_deref()
    }
}
