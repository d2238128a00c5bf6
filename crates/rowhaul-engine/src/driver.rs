//! Extraction driver: the orchestration core of one unit.
//!
//! `Idle → ContextResolved → HeartbeatActive → Extracting →
//! {Succeeded, Failed} → HeartbeatStopped → Terminal`. Context and
//! extractor resolution happen before the heartbeat starts, the extractor
//! is invoked exactly once on a blocking worker, and the heartbeat is
//! stopped exactly once on every terminal path before control returns to
//! the caller.

use std::sync::Arc;
use std::time::Instant;

use rowhaul_types::{CsvTextFormat, IntermediateFormat, Partition};

use crate::config::UnitConfig;
use crate::context::resolve_context;
use crate::error::UnitError;
use crate::extractor::ExtractorRegistry;
use crate::heartbeat::HeartbeatReporter;
use crate::scheduler::{self, LivenessProbe, TaskCounters};
use crate::sink::{OutputChannel, RowSink};

/// Result of a completed unit run.
#[derive(Debug, Clone, Default)]
pub struct UnitSummary {
    /// Rows credited from the extractor's post-call accessor.
    pub rows_read: u64,
    pub duration_secs: f64,
}

/// Drives one unit of extraction work to a terminal state.
pub struct ExtractionDriver {
    config: UnitConfig,
    registry: Arc<ExtractorRegistry>,
}

impl ExtractionDriver {
    #[must_use]
    pub fn new(config: UnitConfig, registry: Arc<ExtractorRegistry>) -> Self {
        Self { config, registry }
    }

    /// Run the unit against its assigned partition.
    ///
    /// On success the rows-read counter is credited exactly once, from the
    /// extractor's own count after the whole call has returned. On failure
    /// the counter keeps its pre-call value: partial progress inside a
    /// failed call is not credited.
    ///
    /// # Errors
    ///
    /// [`UnitError::UnsupportedRole`] / [`UnitError::UnknownExtractor`]
    /// before any heartbeat or extractor activity;
    /// [`UnitError::Extraction`] / [`UnitError::Encoding`] after, with the
    /// original cause attached.
    pub async fn run(
        &self,
        partition: Partition,
        channel: Box<dyn OutputChannel>,
        counters: &mut dyn TaskCounters,
        probe: Arc<dyn LivenessProbe>,
    ) -> Result<UnitSummary, UnitError> {
        let started = Instant::now();

        // Idle -> ContextResolved. Failures here leave the heartbeat and
        // the extractor untouched.
        let ctx = resolve_context(&self.config)?;
        let mut extractor = self.registry.create(&self.config.extractor)?;

        let mut format = CsvTextFormat::new();
        format
            .bind_schema(self.config.schema.clone())
            .map_err(UnitError::Encoding)?;

        tracing::info!(unit = %self.config.unit, "Starting heartbeat reporter");
        let mut heartbeat = HeartbeatReporter::start(
            self.config.heartbeat.period(),
            self.config.heartbeat.grace(),
            probe,
        );

        tracing::info!(
            unit = %self.config.unit,
            extractor = %self.config.extractor,
            "Running extractor"
        );
        let mut channel = channel;
        let outcome = tokio::task::spawn_blocking(move || {
            let result = {
                let mut sink = RowSink::new(&format, channel.as_mut());
                extractor.extract(&ctx, &mut sink, &partition)
            };
            (extractor, result)
        })
        .await;

        // Every terminal state stops the heartbeat exactly once before the
        // unit returns control to its caller.
        tracing::info!(unit = %self.config.unit, "Stopping heartbeat reporter");
        heartbeat.stop().await;

        let (extractor, result) = match outcome {
            Ok(pair) => pair,
            Err(join_err) => {
                return Err(UnitError::Extraction(anyhow::anyhow!(
                    "extractor task panicked: {join_err}"
                )));
            }
        };
        result.map_err(UnitError::from)?;

        let rows_read = extractor.rows_read();
        counters.increment(scheduler::ROWS_READ, rows_read);
        tracing::info!(unit = %self.config.unit, rows_read, "Extractor finished");

        Ok(UnitSummary {
            rows_read,
            duration_secs: started.elapsed().as_secs_f64(),
        })
    }
}
