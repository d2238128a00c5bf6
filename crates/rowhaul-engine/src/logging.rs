use tracing_subscriber::EnvFilter;

/// Initialize process-wide structured logging.
///
/// Honors the `RUST_LOG` env var if set, otherwise falls back to the
/// provided level. The host calls this once before any unit starts;
/// components log through the installed subscriber instead of reaching
/// for static state.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
