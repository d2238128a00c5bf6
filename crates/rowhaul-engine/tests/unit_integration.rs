//! End-to-end tests for one extraction unit: driver lifecycle, counter
//! finalization, heartbeat activity, and failure propagation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rowhaul_engine::config::{HeartbeatConfig, SideConfig, UnitConfig};
use rowhaul_engine::scheduler::{self, LivenessProbe, MemoryCounters};
use rowhaul_engine::sink::OutputChannel;
use rowhaul_engine::{
    ExecutionContext, ExtractionDriver, Extractor, ExtractorError, ExtractorRegistry,
    MemoryChannel, RowWriter, UnitError,
};
use rowhaul_types::{OutputEnvelope, Partition, Schema};

#[derive(Default)]
struct TickProbe {
    ticks: AtomicU64,
}

impl TickProbe {
    fn count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl LivenessProbe for TickProbe {
    fn report_alive(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Emits a fixed list of preformatted text rows.
struct TextRowsExtractor {
    rows: Vec<String>,
    rows_read: u64,
}

impl Extractor for TextRowsExtractor {
    fn extract(
        &mut self,
        _ctx: &ExecutionContext,
        sink: &mut dyn RowWriter,
        _partition: &Partition,
    ) -> Result<(), ExtractorError> {
        for row in &self.rows {
            sink.write_text(row.clone())?;
            self.rows_read += 1;
        }
        Ok(())
    }

    fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

/// Emits one row, then fails.
struct FailingExtractor {
    rows_read: u64,
}

impl Extractor for FailingExtractor {
    fn extract(
        &mut self,
        _ctx: &ExecutionContext,
        sink: &mut dyn RowWriter,
        _partition: &Partition,
    ) -> Result<(), ExtractorError> {
        sink.write_text("only-row".into())?;
        self.rows_read += 1;
        Err(ExtractorError::Source(anyhow::anyhow!(
            "source connection dropped"
        )))
    }

    fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

fn unit_config(role: &str, extractor: &str) -> UnitConfig {
    UnitConfig {
        unit: "it_unit".into(),
        role: role.into(),
        extractor: extractor.into(),
        schema: Schema::new("lines"),
        entries: BTreeMap::new(),
        produce: SideConfig::default(),
        consume: SideConfig::default(),
        // Long period: only the immediate first tick fires during a test.
        heartbeat: HeartbeatConfig {
            period_secs: 60,
            grace_secs: 5,
        },
    }
}

fn registry_with_text_rows(rows: &[&str]) -> Arc<ExtractorRegistry> {
    let rows: Vec<String> = rows.iter().map(|s| s.to_string()).collect();
    let mut registry = ExtractorRegistry::new();
    registry.register("text-rows", move || {
        Box::new(TextRowsExtractor {
            rows: rows.clone(),
            rows_read: 0,
        })
    });
    registry.register("failing", || Box::new(FailingExtractor { rows_read: 0 }));
    Arc::new(registry)
}

fn partition() -> Partition {
    Partition::new(serde_json::json!({"lo": 0, "hi": 3}))
}

#[tokio::test]
async fn test_successful_unit_credits_rows_once() {
    let registry = registry_with_text_rows(&["a,1", "a,2", "a,3"]);
    let driver = ExtractionDriver::new(unit_config("produce", "text-rows"), registry);

    let channel = MemoryChannel::new();
    let inspect = channel.clone();
    let mut counters = MemoryCounters::new();
    let probe = Arc::new(TickProbe::default());

    let summary = driver
        .run(partition(), Box::new(channel), &mut counters, probe.clone())
        .await
        .expect("unit should succeed");

    assert_eq!(summary.rows_read, 3);
    assert_eq!(counters.get(scheduler::ROWS_READ), 3);

    let written = inspect.written();
    assert_eq!(written.len(), 3);
    let texts: Vec<&str> = written.iter().map(OutputEnvelope::as_str).collect();
    assert_eq!(texts, vec!["a,1", "a,2", "a,3"]);

    // The immediate first tick fired at or before the first row.
    assert!(probe.count() >= 1);
}

#[tokio::test]
async fn test_failed_extraction_keeps_precall_counter() {
    let registry = registry_with_text_rows(&[]);
    let driver = ExtractionDriver::new(unit_config("produce", "failing"), registry);

    let channel = MemoryChannel::new();
    let inspect = channel.clone();
    let mut counters = MemoryCounters::new();
    let probe = Arc::new(TickProbe::default());

    let err = driver
        .run(partition(), Box::new(channel), &mut counters, probe.clone())
        .await
        .expect_err("unit should fail");

    assert!(matches!(err, UnitError::Extraction(_)));
    // The row emitted before the failure reached the channel, but partial
    // progress inside a failed call is not credited.
    assert_eq!(inspect.written().len(), 1);
    assert_eq!(counters.get(scheduler::ROWS_READ), 0);

    // The heartbeat is stopped: no further tick fires after run returns.
    let seen = probe.count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(probe.count(), seen);
}

#[tokio::test]
async fn test_unsupported_role_fails_before_any_activity() {
    let built = Arc::new(AtomicBool::new(false));
    let built_flag = built.clone();
    let mut registry = ExtractorRegistry::new();
    registry.register("text-rows", move || {
        built_flag.store(true, Ordering::SeqCst);
        Box::new(TextRowsExtractor {
            rows: vec![],
            rows_read: 0,
        })
    });

    let driver = ExtractionDriver::new(unit_config("replicate", "text-rows"), Arc::new(registry));
    let mut counters = MemoryCounters::new();
    let probe = Arc::new(TickProbe::default());

    let err = driver
        .run(
            partition(),
            Box::new(MemoryChannel::new()),
            &mut counters,
            probe.clone(),
        )
        .await
        .expect_err("role should be rejected");

    assert!(matches!(err, UnitError::UnsupportedRole { ref role } if role == "replicate"));
    assert!(err.is_configuration());
    assert_eq!(probe.count(), 0, "no heartbeat activity");
    assert_eq!(counters.get(scheduler::ROWS_READ), 0);
    // Role resolution happens before the extractor lookup.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!built.load(Ordering::SeqCst), "no extractor activity");
}

#[tokio::test]
async fn test_unknown_extractor_fails_before_heartbeat() {
    let registry = registry_with_text_rows(&[]);
    let driver = ExtractionDriver::new(unit_config("produce", "nope"), registry);
    let probe = Arc::new(TickProbe::default());
    let mut counters = MemoryCounters::new();

    let err = driver
        .run(
            partition(),
            Box::new(MemoryChannel::new()),
            &mut counters,
            probe.clone(),
        )
        .await
        .expect_err("lookup should fail");

    assert!(matches!(err, UnitError::UnknownExtractor { ref name } if name == "nope"));
    assert_eq!(probe.count(), 0);
}

#[tokio::test]
async fn test_channel_failure_surfaces_as_encoding_error() {
    struct BrokenChannel;
    impl OutputChannel for BrokenChannel {
        fn write(&mut self, _envelope: OutputEnvelope) -> anyhow::Result<()> {
            anyhow::bail!("downstream refused the record")
        }
    }

    let registry = registry_with_text_rows(&["a,1"]);
    let driver = ExtractionDriver::new(unit_config("produce", "text-rows"), registry);
    let mut counters = MemoryCounters::new();

    let err = driver
        .run(
            partition(),
            Box::new(BrokenChannel),
            &mut counters,
            Arc::new(TickProbe::default()),
        )
        .await
        .expect_err("write should fail the unit");

    assert!(matches!(err, UnitError::Encoding(_)));
    assert_eq!(counters.get(scheduler::ROWS_READ), 0);
}

#[tokio::test]
async fn test_extractor_panic_is_wrapped_not_propagated() {
    struct PanickyExtractor;
    impl Extractor for PanickyExtractor {
        fn extract(
            &mut self,
            _ctx: &ExecutionContext,
            _sink: &mut dyn RowWriter,
            _partition: &Partition,
        ) -> Result<(), ExtractorError> {
            panic!("index out of range in row decode");
        }
        fn rows_read(&self) -> u64 {
            0
        }
    }

    let mut registry = ExtractorRegistry::new();
    registry.register("panicky", || Box::new(PanickyExtractor));
    let driver = ExtractionDriver::new(unit_config("produce", "panicky"), Arc::new(registry));
    let mut counters = MemoryCounters::new();
    let probe = Arc::new(TickProbe::default());

    let err = driver
        .run(
            partition(),
            Box::new(MemoryChannel::new()),
            &mut counters,
            probe.clone(),
        )
        .await
        .expect_err("panic should become a unit failure");

    assert!(matches!(err, UnitError::Extraction(_)));
    assert_eq!(counters.get(scheduler::ROWS_READ), 0);

    // Heartbeat still stopped on the panic path.
    let seen = probe.count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(probe.count(), seen);
}

#[tokio::test]
async fn test_consume_role_runs_in_framework_space() {
    struct SpaceCheckExtractor {
        rows_read: u64,
    }
    impl Extractor for SpaceCheckExtractor {
        fn extract(
            &mut self,
            ctx: &ExecutionContext,
            sink: &mut dyn RowWriter,
            _partition: &Partition,
        ) -> Result<(), ExtractorError> {
            let table = ctx.job_config()["table"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("missing table"))?;
            sink.write_text(table.to_string())?;
            self.rows_read += 1;
            Ok(())
        }
        fn rows_read(&self) -> u64 {
            self.rows_read
        }
    }

    let mut config = unit_config("consume", "space-check");
    config.consume = SideConfig {
        connection: serde_json::Value::Null,
        job: serde_json::json!({"table": "users_out"}),
    };

    let mut registry = ExtractorRegistry::new();
    registry.register("space-check", || {
        Box::new(SpaceCheckExtractor { rows_read: 0 })
    });

    let channel = MemoryChannel::new();
    let inspect = channel.clone();
    let driver = ExtractionDriver::new(config, Arc::new(registry));
    let mut counters = MemoryCounters::new();

    let summary = driver
        .run(
            partition(),
            Box::new(channel),
            &mut counters,
            Arc::new(TickProbe::default()),
        )
        .await
        .unwrap();

    assert_eq!(summary.rows_read, 1);
    assert_eq!(inspect.written()[0].as_str(), "users_out");
}
