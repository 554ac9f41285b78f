//! # Activity Monitor Worker
//!
//! Subscribes to the all-events pattern and counts every message the store
//! delivers, discarding payloads. The count is the system's throughput
//! signal; the rate tracker and the `message-count` command both read it.
//!
//! While the last sweep reported no lost keys, each event also pulses the
//! Activity channel as visual feedback. The pulse is suppressed during an
//! alarm so the alarm blink pattern stays legible.

use std::sync::Arc;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::sync::oneshot;

use crate::connections::store::StoreConfig;
use crate::core::state::MonitorState;
use crate::indicator::IndicatorPanel;
use crate::workers::StartReport;

/// Pattern matching every channel the store publishes on.
const ALL_EVENTS_PATTERN: &str = "*";

/// The all-events subscriber driving the shared event counter.
pub struct ActivityMonitor {
    store: StoreConfig,
    state: Arc<MonitorState>,
    panel: IndicatorPanel,
}

impl ActivityMonitor {
    /// Creates a new activity monitor against the shared state.
    pub fn new(store: StoreConfig, state: Arc<MonitorState>, panel: IndicatorPanel) -> Self {
        Self {
            store,
            state,
            panel,
        }
    }

    /// Connects, subscribes, reports readiness over `ready`, then counts
    /// events until shutdown or stream end.
    pub async fn run(self, ready: oneshot::Sender<StartReport>) {
        let mut pubsub = match self.store.pubsub().await {
            Ok(p) => p,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        if let Err(e) = pubsub
            .psubscribe(ALL_EVENTS_PATTERN)
            .await
            .context("PSUBSCRIBE failed")
        {
            let _ = ready.send(Err(e));
            return;
        }

        log::info!("activity monitor up and running");
        self.state.worker_started();
        let _ = ready.send(Ok(()));

        let shutdown = self.state.shutdown_token().clone();
        let mut events = pubsub.on_message();
        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(_) => {
                        // Payload discarded; only arrival matters.
                        if self.state.lost_count() == 0 {
                            self.panel.pulse_activity().await;
                        }
                        self.state.record_event();
                    }
                    None => {
                        log::warn!("event stream closed by the store");
                        break;
                    }
                },
                _ = shutdown.cancelled() => break,
            }
        }

        log::info!("activity monitor exiting");
        self.state.worker_stopped();
    }
}
