//! # Connections Module
//!
//! This module handles connectivity to the remote store: building and
//! authenticating Redis connections, acquiring pub/sub connections for the
//! long-lived subscribers, and the TCP reachability probe the coordinator
//! polls before its first connect attempt.

/// Store connection configuration, connect/auth helpers and the network
/// readiness probe.
pub mod store;

pub use store::{reachable, StoreConfig};
