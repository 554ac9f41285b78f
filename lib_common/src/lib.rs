//! # keywatch Monitoring Engine
//!
//! Shared library for the `keywatch` health-monitoring agent. It bundles
//! everything the agent binary composes at runtime:
//!
//! - **`core`**: the shared counter set, the liveness sweep, throughput
//!   telemetry and the remote command protocol.
//! - **`connections`**: Redis store connection helpers and the network
//!   readiness probe.
//! - **`indicator`**: the three-channel status indicator and its arbitration
//!   rules.
//! - **`workers`**: the three long-lived worker tasks (activity monitor,
//!   rate tracker, command handler).

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

// Declare the modules to re-export
pub mod connections;
pub mod core;
pub mod indicator;
pub mod workers;

// Re-export the types the agent binary composes directly
pub use crate::connections::store::StoreConfig;
pub use crate::core::command::{Command, COMMAND_CHANNEL, RESULT_PREFIX};
pub use crate::core::liveness::TrackedKeys;
pub use crate::core::state::MonitorState;
pub use crate::core::telemetry::{RateWindow, TELEMETRY_CHANNEL};
pub use crate::indicator::{
    IndicatorChannel, IndicatorDriver, IndicatorError, IndicatorPanel, LogDriver,
};
pub use crate::workers::{ActivityMonitor, CommandHandler, RateTracker, WorkerKind};
