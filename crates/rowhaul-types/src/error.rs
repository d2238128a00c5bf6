//! Encoding error model.
//!
//! Any failure while normalizing, encoding, or writing a row is fatal to
//! the unit: a silently dropped record is a correctness violation, not a
//! recoverable condition.

use thiserror::Error;

/// A row could not be normalized, encoded, or written.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A row was encoded before any schema was bound.
    #[error("no schema bound before encoding")]
    SchemaUnbound,

    /// `bind_schema` was called a second time within a run.
    #[error("schema '{bound}' already bound; the schema binds exactly once per run")]
    SchemaRebind { bound: String },

    /// A field row does not match the bound schema's column count.
    #[error("field row has {actual} values but schema '{schema}' has {expected} columns")]
    FieldCount {
        schema: String,
        expected: usize,
        actual: usize,
    },

    /// An opaque object row could not be serialized to canonical JSON.
    #[error("object row could not be serialized")]
    Object(#[source] serde_json::Error),

    /// The output channel rejected the encoded record.
    #[error("output channel write failed")]
    Channel(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_schema() {
        let err = EncodingError::FieldCount {
            schema: "users".into(),
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("users"));
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn channel_error_preserves_cause() {
        use std::error::Error as _;
        let err = EncodingError::Channel(anyhow::anyhow!("pipe closed"));
        assert!(err.source().unwrap().to_string().contains("pipe closed"));
    }
}
