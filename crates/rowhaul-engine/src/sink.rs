//! Row sink adapter: normalizes row shapes, encodes, writes envelopes.
//!
//! The sink holds no row state across calls beyond the bound format
//! instance: each row is fully encoded and written before the next is
//! accepted. The output channel is not assumed concurrency-safe and is
//! driven exclusively from inside the extraction call.

use std::sync::{Arc, Mutex};

use rowhaul_types::{EncodingError, FieldValue, IntermediateFormat, OutputEnvelope, Row};

/// The channel through which encoded records leave this unit.
pub trait OutputChannel: Send {
    /// Write one envelope.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the unit; a silently dropped record would be
    /// a correctness violation.
    fn write(&mut self, envelope: OutputEnvelope) -> anyhow::Result<()>;
}

/// Receives a single row per call, in one of the three shapes.
pub trait RowWriter {
    /// Accept a typed field-array row.
    fn write_fields(&mut self, fields: Vec<FieldValue>) -> Result<(), EncodingError>;

    /// Accept a preformatted text row.
    fn write_text(&mut self, text: String) -> Result<(), EncodingError>;

    /// Accept an opaque object row.
    fn write_object(&mut self, value: serde_json::Value) -> Result<(), EncodingError>;
}

/// Adapter from row shapes to envelopes on the output channel.
pub struct RowSink<'a> {
    format: &'a dyn IntermediateFormat,
    channel: &'a mut dyn OutputChannel,
}

impl<'a> RowSink<'a> {
    /// Bind the sink to an already schema-bound format and a channel.
    pub fn new(format: &'a dyn IntermediateFormat, channel: &'a mut dyn OutputChannel) -> Self {
        Self { format, channel }
    }

    fn write_row(&mut self, row: Row) -> Result<(), EncodingError> {
        let record = self.format.encode(&row)?;
        self.channel
            .write(OutputEnvelope::new(record))
            .map_err(EncodingError::Channel)
    }
}

impl RowWriter for RowSink<'_> {
    fn write_fields(&mut self, fields: Vec<FieldValue>) -> Result<(), EncodingError> {
        self.write_row(Row::Fields(fields))
    }

    fn write_text(&mut self, text: String) -> Result<(), EncodingError> {
        self.write_row(Row::Text(text))
    }

    fn write_object(&mut self, value: serde_json::Value) -> Result<(), EncodingError> {
        self.write_row(Row::Object(value))
    }
}

/// In-memory output channel.
///
/// Clones share the same buffer, so a host (or test) can keep a handle and
/// inspect what a moved channel wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    written: Arc<Mutex<Vec<OutputEnvelope>>>,
}

impl MemoryChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every envelope written so far, in emission order.
    #[must_use]
    pub fn written(&self) -> Vec<OutputEnvelope> {
        self.written.lock().expect("memory channel poisoned").clone()
    }
}

impl OutputChannel for MemoryChannel {
    fn write(&mut self, envelope: OutputEnvelope) -> anyhow::Result<()> {
        self.written
            .lock()
            .map_err(|_| anyhow::anyhow!("memory channel poisoned"))?
            .push(envelope);
        Ok(())
    }
}
