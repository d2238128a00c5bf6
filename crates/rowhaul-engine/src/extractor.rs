//! Pluggable extraction algorithms and their registry.
//!
//! An extractor reads one assigned partition and emits rows through the
//! sink; the driver invokes it exactly once per unit. Extractors are
//! selected by logical name through an explicit [`ExtractorRegistry`]
//! populated at process start — no dynamic loading.

use std::collections::HashMap;

use thiserror::Error;

use rowhaul_types::{EncodingError, Partition};

use crate::context::ExecutionContext;
use crate::error::UnitError;
use crate::sink::RowWriter;

/// Failure of one extractor call.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// A sink write failed; the encoding failure surfaces unchanged through
    /// the extractor call boundary.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The extractor's own failure (connection, query, read, ...).
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// One extraction algorithm.
pub trait Extractor: Send {
    /// Read the assigned partition and emit every row through `sink`.
    ///
    /// Called exactly once per unit; may block for an unbounded duration.
    /// Implementations propagate sink errors as-is so the driver can tell
    /// an encoding failure from a source failure.
    fn extract(
        &mut self,
        ctx: &ExecutionContext,
        sink: &mut dyn RowWriter,
        partition: &Partition,
    ) -> Result<(), ExtractorError>;

    /// Total rows read, valid after `extract` has returned successfully.
    fn rows_read(&self) -> u64;
}

impl std::fmt::Debug for dyn Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor").finish_non_exhaustive()
    }
}

type ExtractorBuilder = Box<dyn Fn() -> Box<dyn Extractor> + Send + Sync>;

/// Explicit registry of extractor builders keyed by logical name.
#[derive(Default)]
pub struct ExtractorRegistry {
    builders: HashMap<String, ExtractorBuilder>,
}

impl ExtractorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder under a logical name, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn() -> Box<dyn Extractor> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Box::new(builder));
    }

    /// Instantiate a fresh extractor for one unit run.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::UnknownExtractor`] when no builder is
    /// registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Extractor>, UnitError> {
        match self.builders.get(name) {
            Some(builder) => Ok(builder()),
            None => Err(UnitError::UnknownExtractor {
                name: name.to_string(),
            }),
        }
    }

    /// Registered logical names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
