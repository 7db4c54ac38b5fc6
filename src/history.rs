//! Ring buffers of past readings
//!
//! The monitor loop owns these and hands read-only views to the display engine.

use crate::chart::scale::linear_range;
use crate::sensor::Sample;

/// Slots in the short temperature/humidity history
pub const SHORT_SLOTS: usize = 12;

const TEMPERATURE_MARGIN: f32 = 1.0;
const HUMIDITY_MARGIN: f32 = 5.0;

/// Long CO2 history. A slot holding 0 has no reading yet.
#[derive(Debug, Clone)]
pub struct Co2History {
    slots: Vec<u16>,
    write_index: usize,
}

impl Co2History {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity],
            write_index: 0,
        }
    }

    /// Store `ppm` in the next slot. 0 is the empty marker and is ignored.
    pub fn push(&mut self, ppm: u16) {
        if ppm == 0 || self.slots.is_empty() {
            return;
        }
        self.slots[self.write_index] = ppm;
        self.write_index = (self.write_index + 1) % self.slots.len();
    }

    pub fn slots(&self) -> &[u16] {
        &self.slots
    }

    /// Slot the next reading goes into
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Most recent reading, if any
    pub fn latest(&self) -> Option<u16> {
        let n = self.slots.len();
        if n == 0 {
            return None;
        }
        let value = self.slots[(self.write_index + n - 1) % n];
        (value != 0).then_some(value)
    }
}

/// Last [`SHORT_SLOTS`] temperature and humidity values, sharing one index
#[derive(Debug, Clone, PartialEq)]
pub struct ShortHistory {
    temperature: [f32; SHORT_SLOTS],
    humidity: [f32; SHORT_SLOTS],
    index: usize,
    count: usize,
}

impl ShortHistory {
    /// Every slot holds `sample`, so the first charts are flat instead of empty
    pub fn seeded(sample: &Sample) -> Self {
        Self {
            temperature: [sample.temperature; SHORT_SLOTS],
            humidity: [sample.humidity; SHORT_SLOTS],
            index: 1 % SHORT_SLOTS,
            count: 1,
        }
    }

    pub fn push(&mut self, sample: &Sample) {
        self.temperature[self.index] = sample.temperature;
        self.humidity[self.index] = sample.humidity;
        self.index = (self.index + 1) % SHORT_SLOTS;
        self.count = (self.count + 1).min(SHORT_SLOTS);
    }

    pub fn temperature(&self) -> &[f32; SHORT_SLOTS] {
        &self.temperature
    }

    pub fn humidity(&self) -> &[f32; SHORT_SLOTS] {
        &self.humidity
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn recent(values: &[f32; SHORT_SLOTS], index: usize, count: usize) -> Vec<f32> {
        let start = (index + SHORT_SLOTS - count) % SHORT_SLOTS;
        (0..count).map(|k| values[(start + k) % SHORT_SLOTS]).collect()
    }

    /// Chart range for temperature, padded by 1 °C
    pub fn temperature_range(&self) -> (f32, f32) {
        linear_range(
            &Self::recent(&self.temperature, self.index, self.count),
            TEMPERATURE_MARGIN,
        )
    }

    /// Chart range for humidity, padded by 5 %RH
    pub fn humidity_range(&self) -> (f32, f32) {
        linear_range(
            &Self::recent(&self.humidity, self.index, self.count),
            HUMIDITY_MARGIN,
        )
    }
}

impl Default for ShortHistory {
    fn default() -> Self {
        Self::seeded(&Sample::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temperature: f32, humidity: f32) -> Sample {
        Sample {
            co2: 500,
            temperature,
            humidity,
        }
    }

    #[test]
    fn test_co2_history_wraps_index() {
        let mut history = Co2History::new(3);
        for ppm in [500, 600, 700] {
            history.push(ppm);
        }
        assert_eq!(history.write_index(), 0);
        assert_eq!(history.latest(), Some(700));

        history.push(800);
        assert_eq!(history.slots(), &[800, 600, 700]);
        assert_eq!(history.write_index(), 1);
        assert_eq!(history.latest(), Some(800));
    }

    #[test]
    fn test_co2_history_ignores_sentinel() {
        let mut history = Co2History::new(4);
        assert_eq!(history.latest(), None);
        history.push(0);
        assert_eq!(history.write_index(), 0);
        assert!(history.slots().iter().all(|v| *v == 0));

        let mut empty = Co2History::new(0);
        empty.push(450);
        assert_eq!(empty.latest(), None);
    }

    #[test]
    fn test_short_history_seeded_with_first_sample() {
        let history = ShortHistory::seeded(&sample(21.5, 40.0));
        assert_eq!(history.count(), 1);
        assert_eq!(history.index(), 1);
        assert!(history.temperature().iter().all(|t| *t == 21.5));
        assert_eq!(history.temperature_range(), (20.5, 22.5));
        assert_eq!(history.humidity_range(), (35.0, 45.0));
    }

    #[test]
    fn test_short_history_count_saturates() {
        let mut history = ShortHistory::seeded(&sample(20.0, 50.0));
        for i in 0..30 {
            history.push(&sample(20.0 + i as f32, 50.0));
        }
        assert_eq!(history.count(), SHORT_SLOTS);
        assert_eq!(history.index(), (1 + 30) % SHORT_SLOTS);
    }

    #[test]
    fn test_range_uses_only_counted_values() {
        let mut history = ShortHistory::seeded(&sample(20.0, 50.0));
        history.push(&sample(24.0, 60.0));
        // the seeded copies beyond `count` do not widen the range
        assert_eq!(history.temperature_range(), (19.0, 25.0));
        assert_eq!(history.humidity_range(), (45.0, 65.0));
    }
}
