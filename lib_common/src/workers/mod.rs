//! # Worker Tasks Module
//!
//! The three long-lived worker tasks of the agent. Each owns exactly one
//! store connection (a subscribed connection cannot issue other commands),
//! runs a `tokio::select!` loop against the shared shutdown token, and
//! reports its startup outcome over a one-shot rendezvous channel so the
//! coordinator can sequence initialization without a busy wait.
//!
//! ## Contained Modules:
//! - **`activity`**: subscribes to the all-events pattern and counts
//!   messages, pulsing the Activity channel while healthy.
//! - **`rate`**: computes and publishes per-tick throughput telemetry.
//! - **`command`**: consumes the control channel and dispatches remote
//!   commands.

/// The all-events subscriber that drives the shared event counter.
pub mod activity;
/// The control-channel consumer and command dispatcher.
pub mod command;
/// The per-tick throughput telemetry publisher.
pub mod rate;

// --- Public API Re-exports ---
pub use activity::ActivityMonitor;
pub use command::CommandHandler;
pub use rate::{RateTracker, RateTrackerConfig};

/// Identifies a worker in logs and startup failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    /// The all-events activity monitor.
    Activity,
    /// The remote command handler.
    Command,
    /// The throughput rate tracker.
    Rate,
}

impl WorkerKind {
    /// Lower-case worker name, for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerKind::Activity => "activity",
            WorkerKind::Command => "command",
            WorkerKind::Rate => "rate",
        }
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The startup outcome a worker reports over its rendezvous channel.
pub type StartReport = anyhow::Result<()>;
