//! Row shapes, the canonical intermediate record, and the output envelope.
//!
//! An extractor emits each row in exactly one of three shapes; the shape may
//! vary from call to call within a run. [`IntermediateRecord`] is the
//! canonical text encoding of one row under the bound schema, and an
//! [`OutputEnvelope`] is only ever constructed from a successfully encoded
//! record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value inside a [`Row::Fields`] row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// One row emitted by an extractor.
///
/// Tagged variant replacing overload-style dispatch: a single encode
/// function consumes all three shapes exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum Row {
    /// Typed field array matching the bound schema's column count.
    Fields(Vec<FieldValue>),
    /// Preformatted text, passed through verbatim.
    Text(String),
    /// Opaque object, serialized to canonical JSON.
    Object(serde_json::Value),
}

/// Canonical text encoding of one row under the bound schema.
///
/// Identical row + identical schema always yields a byte-identical record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntermediateRecord(String);

impl IntermediateRecord {
    /// Wrap an already-encoded canonical text record.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the encoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the record, returning the encoded text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IntermediateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope wrapping an encoded record for transmission through the
/// output channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    /// The encoded record payload (an explicit key, not flattened).
    pub payload: IntermediateRecord,
}

impl OutputEnvelope {
    /// Wrap a successfully encoded record.
    #[must_use]
    pub fn new(payload: IntermediateRecord) -> Self {
        Self { payload }
    }

    /// Returns the encoded record text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.payload.as_str()
    }
}
