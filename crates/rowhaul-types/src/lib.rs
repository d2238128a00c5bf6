//! Shared data types for the rowhaul extraction unit.
//!
//! This crate owns the data model that crosses the extraction boundary:
//! the bound [`schema::Schema`], the tagged [`row::Row`] shapes an extractor
//! may emit, the deterministic [`format::IntermediateFormat`] encoding, and
//! the [`row::OutputEnvelope`] written to the output channel.

pub mod error;
pub mod format;
pub mod partition;
pub mod row;
pub mod schema;

pub use error::EncodingError;
pub use format::{CsvTextFormat, IntermediateFormat};
pub use partition::Partition;
pub use row::{FieldValue, IntermediateRecord, OutputEnvelope, Row};
pub use schema::{Column, ColumnType, Schema};
