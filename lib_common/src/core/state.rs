//! # Shared Monitor State
//!
//! The single set of mutable fields the coordinator and the three worker
//! tasks converge on. Everything here is lock-free: plain atomic counters
//! plus a cancellation token for the write-once shutdown flag.
//!
//! ## Core Functionality:
//!
//! - **Atomic Counters**: `event_count`, `lost_count` and `active_workers`
//!   are `AtomicU64`s updated from many tasks without a mutex. Each field is
//!   independently meaningful, so no cross-field snapshot consistency is
//!   needed (a `tracked-keys` response may pair a fresh event count with a
//!   one-interval-old lost count, and that is fine).
//!
//! - **Write-Once Shutdown**: the shutdown flag is a `CancellationToken`.
//!   `request_shutdown()` is idempotent, the transition is terminal, and
//!   every blocking wait in the system selects against `cancelled()` so
//!   shutdown latency stays bounded.
//!
//! The state is created once by the coordinator and handed to each worker
//! behind an `Arc` — never accessed as an ambient global.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The shared counter set for one monitoring run.
#[derive(Debug, Default)]
pub struct MonitorState {
    /// Total messages observed on the all-events subscription. Monotonically
    /// non-decreasing; only the activity monitor increments it.
    event_count: AtomicU64,
    /// Result of the most recent liveness sweep. Written only by the
    /// coordinator's sweep, read by the command handler and the indicator.
    lost_count: AtomicU64,
    /// Number of workers currently running: +1 on successful startup,
    /// -1 on exit.
    active_workers: AtomicU64,
    /// The write-once shutdown flag.
    shutdown: CancellationToken,
}

impl MonitorState {
    /// Creates a fresh state behind an `Arc`, ready to share with workers.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records one observed event. Returns the updated total.
    pub fn record_event(&self) -> u64 {
        self.event_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total events observed so far.
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Relaxed)
    }

    /// Stores the result of a liveness sweep.
    pub fn set_lost(&self, lost: u64) {
        self.lost_count.store(lost, Ordering::Relaxed);
    }

    /// Lost-key count from the most recent sweep.
    pub fn lost_count(&self) -> u64 {
        self.lost_count.load(Ordering::Relaxed)
    }

    /// Marks one worker as running. Returns the updated count.
    pub fn worker_started(&self) -> u64 {
        self.active_workers.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Marks one worker as exited.
    pub fn worker_stopped(&self) {
        self.active_workers.fetch_sub(1, Ordering::Relaxed);
    }

    /// Number of workers currently running.
    pub fn active_workers(&self) -> u64 {
        self.active_workers.load(Ordering::Relaxed)
    }

    /// Requests a cooperative shutdown. Idempotent; the transition to
    /// "requested" is terminal.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Whether a shutdown has been requested.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// The shutdown token, for selecting against blocking waits.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_count_only_increments() {
        let state = MonitorState::new();
        assert_eq!(state.event_count(), 0);
        assert_eq!(state.record_event(), 1);
        assert_eq!(state.record_event(), 2);
        // The API affords no decrement; the counter can only grow.
        assert_eq!(state.event_count(), 2);
    }

    #[test]
    fn test_worker_counts_balance() {
        let state = MonitorState::new();
        assert_eq!(state.worker_started(), 1);
        assert_eq!(state.worker_started(), 2);
        assert_eq!(state.worker_started(), 3);
        state.worker_stopped();
        assert_eq!(state.active_workers(), 2);
    }

    #[test]
    fn test_shutdown_is_write_once_and_idempotent() {
        let state = MonitorState::new();
        assert!(!state.shutdown_requested());
        state.request_shutdown();
        assert!(state.shutdown_requested());
        // A second request changes nothing.
        state.request_shutdown();
        assert!(state.shutdown_requested());
    }

    #[test]
    fn test_lost_count_roundtrip() {
        let state = MonitorState::new();
        state.set_lost(3);
        assert_eq!(state.lost_count(), 3);
        state.set_lost(0);
        assert_eq!(state.lost_count(), 0);
    }
}
