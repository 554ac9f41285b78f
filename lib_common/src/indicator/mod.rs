//! # Status Indicator Module
//!
//! The agent encodes its health on a three-channel physical indicator:
//!
//! - **Alarm**: held on while any tracked key is lost.
//! - **Activity**: pulsed once per observed event while healthy; held on
//!   during connect and key discovery.
//! - **Pulse**: held on while awaiting network readiness; blinked once per
//!   lost key each monitoring interval while alarmed.
//!
//! The low-level channel driver is a seam: anything that can switch a
//! named output channel on and off implements [`IndicatorDriver`]. The
//! [`IndicatorPanel`] owns the arbitration rules on top — alarm cycles,
//! activity pulses, the boot flicker and the confirmation flash — with
//! alarm taking priority over activity feedback.

/// The channel driver seam and the built-in log-backed driver.
pub mod driver;
/// The arbitration panel layered over a driver.
pub mod panel;

// --- Public API Re-exports ---
pub use driver::{IndicatorChannel, IndicatorDriver, IndicatorError, LogDriver};
pub use panel::IndicatorPanel;
