//! # Indicator Arbitration Panel
//!
//! [`IndicatorPanel`] layers the agent's signalling rules over a raw
//! channel driver. The rules the rest of the system relies on:
//!
//! - **Alarm priority**: while the sweep reports lost keys, the Alarm
//!   channel is held on and the Pulse channel blinks once per lost key;
//!   activity pulses are suppressed by their callers during that time so
//!   alarm and activity never visually compete.
//! - **Healthy**: all channels off; the activity monitor pulses the
//!   Activity channel per observed event.
//!
//! Post-setup driver failures are logged and swallowed — a broken lamp
//! must never take the monitor down.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use super::driver::{IndicatorChannel, IndicatorDriver};

/// Half-period of a lost-key blink cycle and of the confirmation flash.
const BLINK: Duration = Duration::from_millis(500);
/// Duration of the boot-phase alarm flicker.
const FLICKER: Duration = Duration::from_millis(50);
/// Width of one activity pulse.
const ACTIVITY_PULSE: Duration = Duration::from_millis(10);

/// The arbitration layer over an indicator driver. Cheap to clone; all
/// clones share the driver.
#[derive(Clone)]
pub struct IndicatorPanel {
    driver: Arc<dyn IndicatorDriver>,
    blink: Duration,
    flicker: Duration,
    activity_pulse: Duration,
}

impl IndicatorPanel {
    /// Wraps `driver` with the default timings.
    pub fn new(driver: Arc<dyn IndicatorDriver>) -> Self {
        Self {
            driver,
            blink: BLINK,
            flicker: FLICKER,
            activity_pulse: ACTIVITY_PULSE,
        }
    }

    /// Overrides every timing. Tests pass `Duration::ZERO`.
    pub fn with_timings(
        driver: Arc<dyn IndicatorDriver>,
        blink: Duration,
        flicker: Duration,
        activity_pulse: Duration,
    ) -> Self {
        Self {
            driver,
            blink,
            flicker,
            activity_pulse,
        }
    }

    /// Switches one channel, logging instead of propagating a driver
    /// failure.
    pub fn set(&self, channel: IndicatorChannel, on: bool) {
        if let Err(e) = self.driver.set(channel, on) {
            log::warn!("{e}");
        }
    }

    /// Switches every channel off.
    pub fn all_off(&self) {
        for channel in IndicatorChannel::ALL {
            self.set(channel, false);
        }
    }

    /// One brief Alarm blip, marking a failed readiness poll during boot.
    pub async fn boot_flicker(&self) {
        self.set(IndicatorChannel::Alarm, true);
        sleep(self.flicker).await;
        self.set(IndicatorChannel::Alarm, false);
    }

    /// The one-time all-channel flash confirming initialization.
    pub async fn confirmation_flash(&self) {
        for channel in IndicatorChannel::ALL {
            self.set(channel, true);
        }
        sleep(self.blink).await;
        self.all_off();
    }

    /// One Activity pulse for an observed event. Callers suppress this
    /// while an alarm is active.
    pub async fn pulse_activity(&self) {
        self.set(IndicatorChannel::Activity, true);
        sleep(self.activity_pulse).await;
        self.set(IndicatorChannel::Activity, false);
    }

    /// Applies one sweep result: alarm held on with exactly `lost` Pulse
    /// blink cycles, or everything off when healthy.
    pub async fn apply_health(&self, lost: u64) {
        if lost == 0 {
            self.all_off();
            return;
        }
        self.set(IndicatorChannel::Alarm, true);
        for _ in 0..lost {
            self.set(IndicatorChannel::Pulse, true);
            sleep(self.blink).await;
            self.set(IndicatorChannel::Pulse, false);
            sleep(self.blink).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::driver::IndicatorError;
    use std::sync::Mutex;

    /// Records every transition it is asked to perform.
    #[derive(Default)]
    struct RecordingDriver {
        transitions: Mutex<Vec<(IndicatorChannel, bool)>>,
    }

    impl IndicatorDriver for RecordingDriver {
        fn set(&self, channel: IndicatorChannel, on: bool) -> Result<(), IndicatorError> {
            self.transitions.lock().unwrap().push((channel, on));
            Ok(())
        }
    }

    fn instant_panel() -> (Arc<RecordingDriver>, IndicatorPanel) {
        let driver = Arc::new(RecordingDriver::default());
        let panel = IndicatorPanel::with_timings(
            driver.clone(),
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
        );
        (driver, panel)
    }

    fn pulses_of(driver: &RecordingDriver, channel: IndicatorChannel) -> usize {
        driver
            .transitions
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, on)| *c == channel && *on)
            .count()
    }

    #[tokio::test]
    async fn test_alarm_state_blinks_once_per_lost_key() {
        let (driver, panel) = instant_panel();
        panel.apply_health(3).await;

        let transitions = driver.transitions.lock().unwrap().clone();
        // Alarm raised first, then exactly 3 on/off pulse cycles.
        assert_eq!(transitions[0], (IndicatorChannel::Alarm, true));
        drop(transitions);
        assert_eq!(pulses_of(&driver, IndicatorChannel::Pulse), 3);
    }

    #[tokio::test]
    async fn test_healthy_state_clears_every_channel() {
        let (driver, panel) = instant_panel();
        panel.apply_health(0).await;

        let transitions = driver.transitions.lock().unwrap();
        assert_eq!(transitions.len(), 3);
        assert!(transitions.iter().all(|(_, on)| !on));
    }

    #[tokio::test]
    async fn test_confirmation_flash_ends_dark() {
        let (driver, panel) = instant_panel();
        panel.confirmation_flash().await;

        let transitions = driver.transitions.lock().unwrap();
        // Three ons followed by three offs.
        assert_eq!(transitions.len(), 6);
        assert!(transitions[..3].iter().all(|(_, on)| *on));
        assert!(transitions[3..].iter().all(|(_, on)| !on));
    }

    #[tokio::test]
    async fn test_activity_pulse_is_on_then_off() {
        let (driver, panel) = instant_panel();
        panel.pulse_activity().await;

        let transitions = driver.transitions.lock().unwrap();
        assert_eq!(
            *transitions,
            vec![
                (IndicatorChannel::Activity, true),
                (IndicatorChannel::Activity, false)
            ]
        );
    }
}
