//! # Throughput Telemetry
//!
//! The rate tracker feeds the shared event count into a [`RateWindow`] once
//! per tick and publishes the resulting [`RateSample`] as a fixed-width
//! text line. Two rates are kept:
//!
//! - **instantaneous**: events per second over the last tick only, and
//! - **smoothed**: a running average, halving towards each new
//!   instantaneous reading.
//!
//! A sample carries an anomaly flag when the instantaneous rate deviates
//! from the smoothed rate by more than 50% in either direction. The flag
//! rides the telemetry line only; it never influences the status
//! indicator.

use std::time::Duration;

/// The fixed store channel telemetry lines are published to.
pub const TELEMETRY_CHANNEL: &str = "keywatch:telemetry";

/// Direction of an instantaneous-rate anomaly, relative to the smoothed
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateFlag {
    /// Within 50% of the smoothed rate in both directions.
    Steady,
    /// More than 50% above the smoothed rate.
    Higher,
    /// More than 50% below the smoothed rate.
    Lower,
}

impl RateFlag {
    /// The wire spelling of the flag. `Steady` is the empty string.
    pub fn as_str(self) -> &'static str {
        match self {
            RateFlag::Steady => "",
            RateFlag::Higher => "higher",
            RateFlag::Lower => "lower",
        }
    }
}

/// One per-tick throughput snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSample {
    /// Tick index; the first published sample carries tick 1 (tick 0 has
    /// no delta and never yields a sample).
    pub tick: u64,
    /// Event count at this tick.
    pub count: u64,
    /// Event count at the previous tick.
    pub previous: u64,
    /// Events observed during this tick.
    pub delta: u64,
    /// Running average rate, in events per second.
    pub smoothed: f64,
    /// Rate over this tick only, in events per second.
    pub instantaneous: f64,
    /// Anomaly flag for this tick.
    pub flag: RateFlag,
}

impl RateSample {
    /// Renders the fixed-width telemetry line:
    /// `[tick] count previous delta smoothed instantaneous flag`.
    pub fn line(&self) -> String {
        format!(
            "[{:06}] {:<6} {:<6} {:<3} {:5.2} {:5.2} {}",
            self.tick,
            self.count,
            self.previous,
            self.delta,
            self.smoothed,
            self.instantaneous,
            self.flag.as_str()
        )
    }
}

/// Incremental throughput computation over fixed ticks.
///
/// Feed it the current event count once per tick via [`observe`]; it
/// returns a [`RateSample`] for every tick after the first.
///
/// [`observe`]: RateWindow::observe
#[derive(Debug)]
pub struct RateWindow {
    tick_seconds: f64,
    tick: u64,
    previous: u64,
    smoothed: Option<f64>,
}

impl RateWindow {
    /// Creates a window for the given tick period.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick_seconds: tick.as_secs_f64(),
            tick: 0,
            previous: 0,
            smoothed: None,
        }
    }

    /// Folds one tick's event count into the window.
    ///
    /// The very first observation seeds the window (previous count 0, no
    /// prior smoothed rate) and yields no sample, since no full interval
    /// has elapsed yet.
    pub fn observe(&mut self, count: u64) -> Option<RateSample> {
        let delta = count.saturating_sub(self.previous);
        let instantaneous = delta as f64 / self.tick_seconds;
        let smoothed = match self.smoothed {
            None => instantaneous,
            Some(prev) => (instantaneous + prev) / 2.0,
        };

        let sample = if self.tick == 0 {
            None
        } else {
            let flag = if instantaneous > smoothed * 1.5 {
                RateFlag::Higher
            } else if instantaneous < smoothed * 0.5 {
                RateFlag::Lower
            } else {
                RateFlag::Steady
            };
            Some(RateSample {
                tick: self.tick,
                count,
                previous: self.previous,
                delta,
                smoothed,
                instantaneous,
                flag,
            })
        };

        self.smoothed = Some(smoothed);
        self.previous = count;
        self.tick += 1;
        sample
    }
}
