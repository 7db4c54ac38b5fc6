//! Pin definitions for the e-paper display and associated peripherals
//!
//! This module contains all GPIO pin assignments used in the hardware configuration
//! (LILYGO T5 style wiring with an SCD4x sensor on the default I2C pins).

/// Pin configuration constants for the UC8179 display and peripherals
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    // SPI Display pins
    /// Busy status pin (High when display is busy)
    pub const BSY: u8 = 4;
    /// Chip Select pin for SPI display
    pub const CS: u8 = 5;
    /// Reset pin for display
    pub const RST: u8 = 16;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 17;
    /// SPI Clock pin
    pub const SCK: u8 = 18;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 23;

    // Sensor pins
    /// I2C data line for the SCD4x
    pub const SDA: u8 = 21;
    /// I2C clock line for the SCD4x
    pub const SCL: u8 = 22;

    // Other pins
    /// Alarm buzzer
    pub const BUZZER: u8 = 25;
}
