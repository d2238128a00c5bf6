//! Canonical intermediate text encoding.
//!
//! [`IntermediateFormat`] turns one [`Row`] into one [`IntermediateRecord`]
//! under a schema that is bound exactly once per run. The encoding is
//! deterministic: the same row under the same bound schema produces a
//! byte-identical record every time, which is what makes re-encoding
//! idempotent and tests reproducible.

use crate::error::EncodingError;
use crate::row::{FieldValue, IntermediateRecord, Row};
use crate::schema::Schema;

/// Polymorphic encoder from row shapes to the canonical text encoding.
pub trait IntermediateFormat: Send {
    /// Bind the run schema. Binding twice is an error; the schema never
    /// changes mid-run.
    fn bind_schema(&mut self, schema: Schema) -> Result<(), EncodingError>;

    /// The bound schema, if any.
    fn schema(&self) -> Option<&Schema>;

    /// Encode one row under the bound schema.
    fn encode(&self, row: &Row) -> Result<IntermediateRecord, EncodingError>;
}

/// Default format: comma-separated text records.
///
/// Field rows render one value per schema column, joined with `,`:
/// `NULL` for nulls, bare literals for booleans and numbers, and
/// single-quoted text with `\`, `'`, newline, and carriage return escaped.
/// Text rows pass through verbatim. Object rows serialize to canonical
/// JSON (object keys sorted).
#[derive(Debug, Default)]
pub struct CsvTextFormat {
    schema: Option<Schema>,
}

impl CsvTextFormat {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn encode_fields(&self, schema: &Schema, fields: &[FieldValue]) -> Result<String, EncodingError> {
        if fields.len() != schema.column_count() {
            return Err(EncodingError::FieldCount {
                schema: schema.name.clone(),
                expected: schema.column_count(),
                actual: fields.len(),
            });
        }
        let mut out = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            match field {
                FieldValue::Null => out.push_str("NULL"),
                FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
                FieldValue::Integer(n) => out.push_str(&n.to_string()),
                FieldValue::Float(f) => out.push_str(&f.to_string()),
                FieldValue::Text(s) => {
                    out.push('\'');
                    for c in s.chars() {
                        match c {
                            '\\' => out.push_str("\\\\"),
                            '\'' => out.push_str("\\'"),
                            '\n' => out.push_str("\\n"),
                            '\r' => out.push_str("\\r"),
                            other => out.push(other),
                        }
                    }
                    out.push('\'');
                }
            }
        }
        Ok(out)
    }
}

impl IntermediateFormat for CsvTextFormat {
    fn bind_schema(&mut self, schema: Schema) -> Result<(), EncodingError> {
        if let Some(bound) = &self.schema {
            return Err(EncodingError::SchemaRebind {
                bound: bound.name.clone(),
            });
        }
        self.schema = Some(schema);
        Ok(())
    }

    fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    fn encode(&self, row: &Row) -> Result<IntermediateRecord, EncodingError> {
        let schema = self.schema.as_ref().ok_or(EncodingError::SchemaUnbound)?;
        let text = match row {
            Row::Fields(fields) => self.encode_fields(schema, fields)?,
            Row::Text(text) => text.clone(),
            // serde_json's default map is ordered by key, so object output
            // is stable for equal values.
            Row::Object(value) => serde_json::to_string(value).map_err(EncodingError::Object)?,
        };
        Ok(IntermediateRecord::new(text))
    }
}
