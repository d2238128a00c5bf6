//! Fan-out specialization: dataset-keyed multi-output writing.
//!
//! Some sources tag each record with a current dataset name and expect one
//! logical output stream per distinct dataset observed. For each record the
//! writer derives the output text via a pluggable key-derivation function,
//! writes it to the dataset's named output (opened lazily on first use),
//! and bumps a single running counter that is reported once at run end.
//! There is no per-record heartbeat coupling here; the host's longer-lived
//! task heartbeat covers liveness.

use std::collections::{hash_map::Entry, HashMap};

use rowhaul_types::{EncodingError, IntermediateRecord, OutputEnvelope, Row};

use crate::scheduler::{self, TaskCounters};
use crate::sink::OutputChannel;

/// One record tagged with the dataset it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRecord {
    pub dataset: String,
    pub row: Row,
}

/// Derives the output text for one record.
pub type KeyDerivation = Box<dyn Fn(&Row) -> String + Send>;

/// Opens the named output channel for a dataset on first use.
pub type OutputFactory<C> = Box<dyn FnMut(&str) -> anyhow::Result<C> + Send>;

/// Multi-output writer keyed by dataset name.
pub struct DatasetFanout<C: OutputChannel> {
    derive_key: KeyDerivation,
    open_output: OutputFactory<C>,
    outputs: HashMap<String, C>,
    records_written: u64,
}

impl<C: OutputChannel> DatasetFanout<C> {
    #[must_use]
    pub fn new(derive_key: KeyDerivation, open_output: OutputFactory<C>) -> Self {
        Self {
            derive_key,
            open_output,
            outputs: HashMap::new(),
            records_written: 0,
        }
    }

    /// Write one record to its dataset's output.
    ///
    /// # Errors
    ///
    /// Opening the named output or writing to it is fatal, wrapped as an
    /// encoding failure like any other dropped-record hazard.
    pub fn write(&mut self, record: &TaggedRecord) -> Result<(), EncodingError> {
        let key = (self.derive_key)(&record.row);
        let channel = match self.outputs.entry(record.dataset.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let channel =
                    (self.open_output)(&record.dataset).map_err(EncodingError::Channel)?;
                tracing::debug!(dataset = %record.dataset, "Opened fan-out output");
                entry.insert(channel)
            }
        };
        channel
            .write(OutputEnvelope::new(IntermediateRecord::new(key)))
            .map_err(EncodingError::Channel)?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of distinct dataset outputs opened so far.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Records written so far.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Finalize the run: report the record counter exactly once.
    pub fn finish(self, counters: &mut dyn TaskCounters) -> u64 {
        counters.increment(scheduler::RECORDS_WRITTEN, self.records_written);
        tracing::info!(
            records = self.records_written,
            outputs = self.outputs.len(),
            "Fan-out writer finished"
        );
        self.records_written
    }
}
