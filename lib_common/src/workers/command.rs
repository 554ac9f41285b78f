//! # Command Handler Worker
//!
//! Consumes the fixed control channel and dispatches the closed command
//! vocabulary defined in [`crate::core::command`]. Malformed payloads —
//! anything that does not decode as text — are dropped without a response,
//! as are unrecognized tokens.
//!
//! A subscribed connection cannot issue other commands, so each response
//! is delivered over a short-lived secondary connection: the text is
//! stored at the result key (best effort) and published to the channel of
//! the same name, then the connection is dropped.

use std::sync::Arc;

use anyhow::Context;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::sync::oneshot;

use crate::connections::store::StoreConfig;
use crate::core::command::{self, Command, COMMAND_CHANNEL};
use crate::core::state::MonitorState;
use crate::workers::StartReport;

/// The control-channel consumer.
pub struct CommandHandler {
    store: StoreConfig,
    state: Arc<MonitorState>,
    /// Total tracked keys, fixed at startup; the `tracked-keys` response
    /// is computed against it.
    total: u64,
}

impl CommandHandler {
    /// Creates a new command handler against the shared state.
    pub fn new(store: StoreConfig, state: Arc<MonitorState>, total: u64) -> Self {
        Self {
            store,
            state,
            total,
        }
    }

    /// Connects, subscribes to the control channel, reports readiness over
    /// `ready`, then dispatches commands until shutdown.
    pub async fn run(self, ready: oneshot::Sender<StartReport>) {
        let mut pubsub = match self.store.pubsub().await {
            Ok(p) => p,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        if let Err(e) = pubsub
            .subscribe(COMMAND_CHANNEL)
            .await
            .context("SUBSCRIBE failed")
        {
            let _ = ready.send(Err(e));
            return;
        }

        log::info!("command handler up and running");
        self.state.worker_started();
        let _ = ready.send(Ok(()));

        let shutdown = self.state.shutdown_token().clone();
        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                message = messages.next() => match message {
                    Some(msg) => {
                        // Only a textual payload is a command token;
                        // anything else is silently ignored.
                        let token: String = match msg.get_payload() {
                            Ok(t) => t,
                            Err(_) => continue,
                        };
                        let Some(cmd) = Command::parse(&token) else {
                            continue;
                        };
                        if let Some(text) = command::execute(cmd, &self.state, self.total) {
                            self.deliver(&token, &text).await;
                            log::info!("command '{token}' response: '{text}'");
                        }
                    }
                    None => {
                        log::warn!("control channel closed by the store");
                        break;
                    }
                },
                _ = shutdown.cancelled() => break,
            }
        }

        log::info!("command handler exiting");
        self.state.worker_stopped();
    }

    /// Stores and publishes one response under the result name derived
    /// from the full token. Both steps are best effort.
    async fn deliver(&self, token: &str, text: &str) {
        let name = command::result_name(token);
        let mut conn = match self.store.connect().await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("response connection failed, dropping '{name}': {e:#}");
                return;
            }
        };
        if let Err(e) = conn.set::<_, _, ()>(&name, text).await {
            log::warn!("failed to set {name}: {e}");
        }
        if let Err(e) = conn.publish::<_, _, ()>(&name, text).await {
            log::warn!("failed to publish {name}: {e}");
        }
    }
}
