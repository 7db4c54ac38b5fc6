//! Timing and alarm policy of the monitor loop
//!
//! Pure state machines fed with a millisecond clock, so the firmware loop stays a thin
//! shell around them. Times are `u64` milliseconds compared with wrapping arithmetic.

use crate::config::DEFAULT_ALARM_THRESHOLD;
use crate::sensor::{Co2Sensor, Sample};

/// Loop timing, alarm and redraw thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    pub sample_interval_ms: u64,
    /// How often a reading is appended to the histories
    pub history_interval_ms: u64,
    /// Full refresh at least this often against ghosting
    pub full_refresh_interval_ms: u64,
    /// Minimum time between two buzzer activations
    pub buzzer_interval_ms: u64,
    pub buzzer_on_ms: u64,
    pub alarm_threshold: u16,
    pub co2_change: u16,
    pub temperature_change: f32,
    pub humidity_change: f32,
    /// Valid readings required before the history is trusted
    pub min_valid_readings: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 30_000,
            history_interval_ms: 5 * 60_000,
            full_refresh_interval_ms: 6 * 60 * 60_000,
            buzzer_interval_ms: 10 * 60_000,
            buzzer_on_ms: 5_000,
            alarm_threshold: DEFAULT_ALARM_THRESHOLD,
            co2_change: 50,
            temperature_change: 0.5,
            humidity_change: 2.0,
            min_valid_readings: 3,
        }
    }
}

/// Milliseconds from `since` to `now`, correct across counter wrap
pub fn elapsed(now_ms: u64, since_ms: u64) -> u64 {
    now_ms.wrapping_sub(since_ms)
}

/// Whether `current` differs enough from what is on screen to redraw
pub fn significant_change(current: &Sample, last_displayed: &Sample, cfg: &MonitorConfig) -> bool {
    current.co2.abs_diff(last_displayed.co2) >= cfg.co2_change
        || (current.temperature - last_displayed.temperature).abs() >= cfg.temperature_change
        || (current.humidity - last_displayed.humidity).abs() >= cfg.humidity_change
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerAction {
    On,
    Off,
}

/// Buzzer timing
#[derive(Debug, Clone)]
pub struct AlarmState {
    threshold: u16,
    interval_ms: u64,
    on_ms: u64,
    last_activation_ms: Option<u64>,
    active: bool,
}

impl AlarmState {
    pub fn new(cfg: &MonitorConfig) -> Self {
        Self {
            threshold: cfg.alarm_threshold,
            interval_ms: cfg.buzzer_interval_ms,
            on_ms: cfg.buzzer_on_ms,
            last_activation_ms: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn the buzzer on for a high reading, at most once per interval
    pub fn check(&mut self, now_ms: u64, co2: u16) -> Option<BuzzerAction> {
        if co2 < self.threshold {
            return None;
        }
        let due = self
            .last_activation_ms
            .map_or(true, |last| elapsed(now_ms, last) >= self.interval_ms);
        if !due {
            return None;
        }
        log::warn!("ALARM: High CO2 levels detected! ({} ppm)", co2);
        self.last_activation_ms = Some(now_ms);
        self.active = true;
        Some(BuzzerAction::On)
    }

    /// Turn the buzzer off once its on-time has passed
    pub fn expire(&mut self, now_ms: u64) -> Option<BuzzerAction> {
        let last = self.last_activation_ms?;
        if self.active && elapsed(now_ms, last) >= self.on_ms {
            self.active = false;
            return Some(BuzzerAction::Off);
        }
        None
    }
}

/// When to sample, record history and redraw
#[derive(Debug, Clone)]
pub struct Schedule {
    cfg: MonitorConfig,
    last_sample_ms: u64,
    last_history_ms: u64,
    last_full_refresh_ms: u64,
    last_displayed: Sample,
}

impl Schedule {
    /// Start the clocks at `now_ms`, with `shown` already on screen
    pub fn new(cfg: MonitorConfig, now_ms: u64, shown: Sample) -> Self {
        Self {
            cfg,
            last_sample_ms: now_ms,
            last_history_ms: now_ms,
            last_full_refresh_ms: now_ms,
            last_displayed: shown,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    pub fn last_displayed(&self) -> Sample {
        self.last_displayed
    }

    pub fn sample_due(&self, now_ms: u64) -> bool {
        elapsed(now_ms, self.last_sample_ms) >= self.cfg.sample_interval_ms
    }

    /// Record a sampling round. Returns true when the screen needs a full redraw:
    /// the sensor is gone (show the help screen) or the new reading moved enough.
    pub fn on_sampled<S: Co2Sensor>(&mut self, now_ms: u64, sensor: &S, updated: bool) -> bool {
        self.last_sample_ms = now_ms;

        let redraw = if !sensor.is_connected() {
            log::info!("Sensor is not connected, showing connection instructions");
            true
        } else if updated {
            let changed = significant_change(&sensor.sample(), &self.last_displayed, &self.cfg);
            if !changed {
                log::debug!("No significant change detected");
            }
            changed
        } else {
            false
        };

        if redraw {
            self.mark_refreshed(now_ms, sensor.sample());
        }
        redraw
    }

    /// Sensor has settled and the history interval has passed
    pub fn history_due<S: Co2Sensor>(&self, now_ms: u64, sensor: &S) -> bool {
        sensor.is_connected()
            && sensor.valid_reading_count() >= self.cfg.min_valid_readings
            && elapsed(now_ms, self.last_history_ms) >= self.cfg.history_interval_ms
    }

    /// History was appended and the screen fully redrawn with `shown`
    pub fn on_history_recorded(&mut self, now_ms: u64, shown: Sample) {
        self.last_history_ms = now_ms;
        self.mark_refreshed(now_ms, shown);
    }

    /// No full refresh for too long
    pub fn refresh_due(&self, now_ms: u64) -> bool {
        elapsed(now_ms, self.last_full_refresh_ms) >= self.cfg.full_refresh_interval_ms
    }

    pub fn mark_refreshed(&mut self, now_ms: u64, shown: Sample) {
        self.last_full_refresh_ms = now_ms;
        self.last_displayed = shown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSensor {
        sample: Sample,
        connected: bool,
        valid: u8,
    }

    impl Co2Sensor for FakeSensor {
        fn sample(&self) -> Sample {
            self.sample
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn valid_reading_count(&self) -> u8 {
            self.valid
        }
    }

    fn sample(co2: u16, temperature: f32, humidity: f32) -> Sample {
        Sample {
            co2,
            temperature,
            humidity,
        }
    }

    fn sensor(co2: u16) -> FakeSensor {
        FakeSensor {
            sample: sample(co2, 21.0, 45.0),
            connected: true,
            valid: 5,
        }
    }

    #[test]
    fn test_significant_change_thresholds() {
        let cfg = MonitorConfig::default();
        let shown = sample(800, 21.0, 45.0);
        assert!(!significant_change(&sample(849, 21.4, 46.9), &shown, &cfg));
        assert!(significant_change(&sample(850, 21.0, 45.0), &shown, &cfg));
        assert!(significant_change(&sample(750, 21.0, 45.0), &shown, &cfg));
        assert!(significant_change(&sample(800, 20.5, 45.0), &shown, &cfg));
        assert!(significant_change(&sample(800, 21.0, 47.0), &shown, &cfg));
    }

    #[test]
    fn test_alarm_rate_limited() {
        let cfg = MonitorConfig::default();
        let mut alarm = AlarmState::new(&cfg);

        assert_eq!(alarm.check(1_000, 999), None);
        assert_eq!(alarm.check(2_000, 1000), Some(BuzzerAction::On));
        assert!(alarm.is_active());
        assert_eq!(alarm.expire(6_999), None);
        assert_eq!(alarm.expire(7_000), Some(BuzzerAction::Off));
        assert_eq!(alarm.expire(8_000), None);

        // still high, but within the interval
        assert_eq!(alarm.check(2_000 + 599_999, 1500), None);
        assert_eq!(alarm.check(2_000 + 600_000, 1500), Some(BuzzerAction::On));
    }

    #[test]
    fn test_alarm_across_clock_wrap() {
        let cfg = MonitorConfig::default();
        let mut alarm = AlarmState::new(&cfg);
        let start = u64::MAX - 1_000;
        assert_eq!(alarm.check(start, 1200), Some(BuzzerAction::On));
        assert_eq!(alarm.expire(start.wrapping_add(5_000)), Some(BuzzerAction::Off));
        assert_eq!(alarm.check(start.wrapping_add(10_000), 1200), None);
    }

    #[test]
    fn test_sampling_interval() {
        let schedule = Schedule::new(MonitorConfig::default(), 0, Sample::DEFAULT);
        assert!(!schedule.sample_due(29_999));
        assert!(schedule.sample_due(30_000));
    }

    #[test]
    fn test_redraw_only_on_significant_change() {
        let mut schedule = Schedule::new(MonitorConfig::default(), 0, sample(600, 21.0, 45.0));

        assert!(!schedule.on_sampled(30_000, &sensor(620), true));
        assert!(!schedule.sample_due(59_999));

        assert!(schedule.on_sampled(60_000, &sensor(700), true));
        assert_eq!(schedule.last_displayed().co2, 700);

        // no fresh data, nothing to redraw
        assert!(!schedule.on_sampled(90_000, &sensor(1500), false));
    }

    #[test]
    fn test_disconnected_sensor_always_redraws() {
        let mut schedule = Schedule::new(MonitorConfig::default(), 0, Sample::DEFAULT);
        let gone = FakeSensor {
            connected: false,
            ..sensor(400)
        };
        assert!(schedule.on_sampled(30_000, &gone, false));
        assert!(schedule.on_sampled(60_000, &gone, false));
    }

    #[test]
    fn test_history_waits_for_settled_sensor() {
        let mut schedule = Schedule::new(MonitorConfig::default(), 0, Sample::DEFAULT);
        let mut s = sensor(700);
        s.valid = 2;
        assert!(!schedule.history_due(300_000, &s));
        s.valid = 3;
        assert!(!schedule.history_due(299_999, &s));
        assert!(schedule.history_due(300_000, &s));
        s.connected = false;
        assert!(!schedule.history_due(300_000, &s));

        schedule.on_history_recorded(300_000, s.sample);
        s.connected = true;
        assert!(!schedule.history_due(599_999, &s));
        assert!(schedule.history_due(600_000, &s));
    }

    #[test]
    fn test_forced_refresh_every_six_hours() {
        let mut schedule = Schedule::new(MonitorConfig::default(), 1_000, Sample::DEFAULT);
        let six_hours = 6 * 60 * 60 * 1000;
        assert!(!schedule.refresh_due(six_hours));
        assert!(schedule.refresh_due(1_000 + six_hours));

        schedule.mark_refreshed(1_000 + six_hours, Sample::DEFAULT);
        assert!(!schedule.refresh_due(1_000 + six_hours + 1));
    }
}
