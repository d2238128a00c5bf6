//! Per-partition extraction unit engine.
//!
//! One [`driver::ExtractionDriver`] owns the lifecycle of a single unit of
//! extraction work: it resolves the role-scoped execution context, starts
//! the [`heartbeat::HeartbeatReporter`], invokes the configured
//! [`extractor::Extractor`] exactly once against the assigned partition,
//! and finalizes the rows-read counter. Rows flow through the
//! [`sink::RowSink`], which encodes them into the canonical intermediate
//! format and writes envelopes to the output channel.

pub mod config;
pub mod connector;
pub mod context;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod fanout;
pub mod heartbeat;
pub mod logging;
pub mod scheduler;
pub mod sink;

pub use config::UnitConfig;
pub use context::ExecutionContext;
pub use driver::{ExtractionDriver, UnitSummary};
pub use error::UnitError;
pub use extractor::{Extractor, ExtractorError, ExtractorRegistry};
pub use heartbeat::HeartbeatReporter;
pub use scheduler::{LivenessProbe, TaskCounters};
pub use sink::{MemoryChannel, OutputChannel, RowSink, RowWriter};
