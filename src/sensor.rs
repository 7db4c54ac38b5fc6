//! What the display engine and the monitor loop need from a CO2 sensor

/// One measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// ppm
    pub co2: u16,
    /// °C
    pub temperature: f32,
    /// %RH
    pub humidity: f32,
}

impl Sample {
    /// Reported before the first successful measurement
    pub const DEFAULT: Sample = Sample {
        co2: 400,
        temperature: 20.0,
        humidity: 50.0,
    };
}

impl Default for Sample {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A CO2 sensor as seen by the rest of the firmware
pub trait Co2Sensor {
    /// Latest accepted measurement
    fn sample(&self) -> Sample;

    fn is_connected(&self) -> bool;

    /// Consecutive valid readings, saturating; used to wait for the sensor to settle
    fn valid_reading_count(&self) -> u8;
}
