//! # Indicator Channel Driver
//!
//! The only capability the engine needs from the physical indicator is
//! "set a named output channel on or off". [`IndicatorDriver`] captures
//! exactly that; the panel and the workers never see anything lower-level.

use thiserror::Error;

/// The three output channels of the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorChannel {
    /// Held on while any tracked key is lost.
    Alarm,
    /// Event feedback and the connect phase.
    Activity,
    /// Boot progress and per-lost-key blink cycles.
    Pulse,
}

impl IndicatorChannel {
    /// All channels, for whole-panel operations.
    pub const ALL: [IndicatorChannel; 3] = [
        IndicatorChannel::Alarm,
        IndicatorChannel::Activity,
        IndicatorChannel::Pulse,
    ];

    /// Lower-case channel name, for logs.
    pub fn name(self) -> &'static str {
        match self {
            IndicatorChannel::Alarm => "alarm",
            IndicatorChannel::Activity => "activity",
            IndicatorChannel::Pulse => "pulse",
        }
    }
}

/// Errors surfaced by an indicator driver.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// The driver could not be opened at startup.
    #[error("indicator setup failed: {0}")]
    Setup(String),
    /// A channel could not be switched.
    #[error("failed to drive {channel} channel: {reason}")]
    Drive {
        /// The channel that failed to switch.
        channel: &'static str,
        /// Driver-specific failure description.
        reason: String,
    },
}

/// Anything that can switch a named indicator channel on or off.
pub trait IndicatorDriver: Send + Sync {
    /// Switches `channel` on or off.
    fn set(&self, channel: IndicatorChannel, on: bool) -> Result<(), IndicatorError>;
}

/// A driver that renders channel transitions into the log. Used where no
/// physical indicator is wired up; also handy when eyeballing behavior
/// from a terminal.
#[derive(Debug, Default)]
pub struct LogDriver;

impl LogDriver {
    /// Opens the log-backed driver.
    pub fn open() -> Result<Self, IndicatorError> {
        Ok(Self)
    }
}

impl IndicatorDriver for LogDriver {
    fn set(&self, channel: IndicatorChannel, on: bool) -> Result<(), IndicatorError> {
        log::trace!(
            "indicator: {} {}",
            channel.name(),
            if on { "on" } else { "off" }
        );
        Ok(())
    }
}
