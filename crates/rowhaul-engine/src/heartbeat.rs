//! Periodic liveness reporter with cooperative-then-forced shutdown.
//!
//! The reporter runs on its own task, independent of extraction progress,
//! so a long blocking extractor call is never mistaken for a stall by the
//! host scheduler. It touches only the scheduler's liveness API and shares
//! no row or record state with the extraction path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::scheduler::LivenessProbe;

/// Default tick period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(120);
/// Default graceful shutdown window.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Handle to a running heartbeat task.
///
/// The active lifetime is exactly `[start, stop + grace]`: the first tick
/// fires immediately at start, and after [`HeartbeatReporter::stop`]
/// returns no further tick fires.
pub struct HeartbeatReporter {
    handle: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
    grace: Duration,
}

impl HeartbeatReporter {
    /// Start ticking `probe` at a fixed `period`, first tick immediately.
    ///
    /// `grace` bounds how long [`stop`](Self::stop) waits for an in-flight
    /// tick before force-cancelling the task.
    #[must_use]
    pub fn start(period: Duration, grace: Duration, probe: Arc<dyn LivenessProbe>) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => probe.report_alive(),
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        Self {
            handle: Some(handle),
            shutdown,
            grace,
        }
    }

    /// Returns `true` until `stop` has been called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Request graceful termination; idempotent.
    ///
    /// Waits up to the grace window for an in-flight tick to finish and the
    /// schedule to cease, then force-cancels the task. A grace timeout is
    /// logged, never escalated: it must not fail the overall run.
    pub async fn stop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        let _ = self.shutdown.send(true);
        match tokio::time::timeout(self.grace, &mut handle).await {
            Ok(_) => tracing::debug!("heartbeat reporter stopped"),
            Err(_) => {
                tracing::warn!(
                    grace_secs = self.grace.as_secs_f64(),
                    "heartbeat reporter did not stop within grace window, cancelling"
                );
                handle.abort();
            }
        }
    }
}

impl Drop for HeartbeatReporter {
    fn drop(&mut self) {
        // No background task may outlive the unit.
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
