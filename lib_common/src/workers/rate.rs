//! # Rate Tracker Worker
//!
//! Once per tick, reads the shared event count, folds it into a
//! [`RateWindow`](crate::core::telemetry::RateWindow) and publishes the
//! resulting sample as a fixed-width line on the telemetry channel. The
//! very first tick only seeds the window — there is no delta to report
//! yet.
//!
//! Publish failures are logged and skipped; telemetry is best-effort and
//! a dropped line carries no state the next tick would not recompute.

use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::connections::store::StoreConfig;
use crate::core::state::MonitorState;
use crate::core::telemetry::{RateWindow, TELEMETRY_CHANNEL};
use crate::workers::StartReport;

/// Tunables for the rate tracker.
pub struct RateTrackerConfig {
    /// Sampling period.
    pub tick: Duration,
}

impl Default for RateTrackerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(5),
        }
    }
}

/// The per-tick throughput telemetry publisher.
pub struct RateTracker {
    store: StoreConfig,
    state: Arc<MonitorState>,
    config: RateTrackerConfig,
}

impl RateTracker {
    /// Creates a new rate tracker against the shared state.
    pub fn new(store: StoreConfig, state: Arc<MonitorState>, config: RateTrackerConfig) -> Self {
        Self {
            store,
            state,
            config,
        }
    }

    /// Connects, reports readiness over `ready`, then samples and
    /// publishes once per tick until shutdown.
    pub async fn run(self, ready: oneshot::Sender<StartReport>) {
        let mut conn = match self.store.connect().await {
            Ok(c) => c,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        log::info!("rate tracker up and running");
        self.state.worker_started();
        let _ = ready.send(Ok(()));

        let shutdown = self.state.shutdown_token().clone();
        let mut window = RateWindow::new(self.config.tick);
        loop {
            if let Some(sample) = window.observe(self.state.event_count()) {
                let line = sample.line();
                log::debug!("{line}");
                if let Err(e) = conn
                    .publish::<_, _, ()>(TELEMETRY_CHANNEL, &line)
                    .await
                {
                    log::warn!("telemetry publish failed: {e}");
                }
            }

            tokio::select! {
                _ = sleep(self.config.tick) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        log::info!("rate tracker exiting");
        self.state.worker_stopped();
    }
}
