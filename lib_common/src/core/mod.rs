//! # Core Engine Module
//!
//! The heart of the `keywatch` monitoring engine. Everything in here is
//! connection-free logic: the shared counter set the workers converge on,
//! the liveness sweep, the throughput window and the remote command
//! protocol. The pieces that actually talk to the store live in
//! `connections` and `workers`.
//!
//! ## Core Components:
//!
//! - **`state`**: the shared, lock-free counter set (`MonitorState`) passed
//!   by `Arc` into every worker. Replaces ambient process globals.
//!
//! - **`liveness`**: tracked-key discovery and the periodic existence sweep.
//!   A failed existence query counts as a lost key on purpose.
//!
//! - **`telemetry`**: the per-tick throughput window (instantaneous and
//!   smoothed rates, anomaly flag) and its fixed-width wire line.
//!
//! - **`command`**: the closed command vocabulary of the remote control
//!   channel and its response rendering.

/// The shared, lock-free counter set passed into every worker.
pub mod state;
/// Tracked-key discovery and the periodic existence sweep.
pub mod liveness;
/// Per-tick throughput telemetry and its wire format.
pub mod telemetry;
/// The remote command vocabulary and response rendering.
pub mod command;

// --- Public API Re-exports ---
// Make the primary types from the core modules directly accessible.
pub use command::Command;
pub use liveness::{KeyGroup, TrackedKeys};
pub use state::MonitorState;
pub use telemetry::{RateFlag, RateSample, RateWindow};
