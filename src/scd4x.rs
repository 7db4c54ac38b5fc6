//! Sensirion SCD4x CO2 sensor over I2C
//!
//! Commands are 16-bit big-endian words. Every word read back is followed by a
//! CRC-8 (polynomial 0x31, init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::sensor::{Co2Sensor, Sample};

/// Fixed I2C address of the SCD40/SCD41
pub const ADDRESS: u8 = 0x62;

/// Valid readings are counted up to this value
pub const MAX_VALID_READINGS: u8 = 5;

/// SCD4x command words
pub struct Command;

impl Command {
    pub const GET_SERIAL_NUMBER: u16 = 0x3682;
    pub const STOP_PERIODIC_MEASUREMENT: u16 = 0x3F86;
    pub const START_PERIODIC_MEASUREMENT: u16 = 0x21B1;
    pub const GET_DATA_READY_STATUS: u16 = 0xE4B8;
    pub const READ_MEASUREMENT: u16 = 0xEC05;
}

const BOOT_DELAY_MS: u32 = 1000;
const STOP_DELAY_MS: u32 = 500;
const RESET_SETTLE_MS: u32 = 1000;
const COMMAND_DELAY_MS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scd4xError<E> {
    /// The bus transfer failed
    I2c(E),
    /// A word did not match its checksum
    Crc,
    /// `update` called before a successful `begin`
    NotConnected,
}

impl<E> From<E> for Scd4xError<E> {
    fn from(e: E) -> Self {
        Scd4xError::I2c(e)
    }
}

/// CRC-8 used by Sensirion sensors
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Split `N` checked words out of a `3 * N` byte response
fn decode_words<const N: usize, E>(bytes: &[u8]) -> Result<[u16; N], Scd4xError<E>> {
    let mut words = [0u16; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(Scd4xError::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

pub fn temperature_from_raw(raw: u16) -> f32 {
    -45.0 + 175.0 * f32::from(raw) / 65535.0
}

pub fn humidity_from_raw(raw: u16) -> f32 {
    100.0 * f32::from(raw) / 65535.0
}

/// SCD4x driver tracking connection state and the latest sample
pub struct Scd4x<I2C, D> {
    i2c: I2C,
    delay: D,
    sample: Sample,
    connected: bool,
    valid_readings: u8,
}

impl<I2C, D, E> Scd4x<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    E: core::fmt::Debug,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            sample: Sample::DEFAULT,
            connected: false,
            valid_readings: 0,
        }
    }

    fn write_command(&mut self, command: u16) -> Result<(), Scd4xError<E>> {
        self.i2c.write(ADDRESS, &command.to_be_bytes())?;
        Ok(())
    }

    fn read_words<const N: usize>(&mut self, command: u16) -> Result<[u16; N], Scd4xError<E>> {
        self.write_command(command)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        let mut buf = [0u8; 9];
        let len = N * 3;
        self.i2c.read(ADDRESS, &mut buf[..len])?;
        decode_words::<N, E>(&buf[..len])
    }

    /// Probe the sensor and (re)start periodic measurement
    ///
    /// The first measurement is only available about 5 s later; warming up longer is
    /// up to the caller.
    pub fn begin(&mut self) -> Result<(), Scd4xError<E>> {
        log::info!("Initializing CO2 sensor");
        self.connected = false;
        self.delay.delay_ms(BOOT_DELAY_MS);

        let serial = match self.read_words::<3>(Command::GET_SERIAL_NUMBER) {
            Ok(serial) => serial,
            Err(e) => {
                log::error!("Failed to get serial number: {:?}", e);
                let found = self.scan_bus();
                log::debug!("I2C devices answering: {:02X?}", found);
                return Err(e);
            }
        };
        log::info!(
            "Sensor serial number: {:04X}{:04X}{:04X}",
            serial[0],
            serial[1],
            serial[2]
        );

        self.write_command(Command::STOP_PERIODIC_MEASUREMENT)
            .inspect_err(|e| log::error!("Failed to stop measurement: {:?}", e))?;
        self.delay.delay_ms(STOP_DELAY_MS);

        self.write_command(Command::START_PERIODIC_MEASUREMENT)
            .inspect_err(|e| log::error!("Failed to start measurement: {:?}", e))?;

        self.connected = true;
        self.valid_readings = 0;
        log::info!("CO2 sensor initialized");
        Ok(())
    }

    /// Addresses on the bus that acknowledge an empty write, for wiring diagnostics
    pub fn scan_bus(&mut self) -> Vec<u8> {
        (0x01..0x7F)
            .filter(|&address| self.i2c.write(address, &[]).is_ok())
            .collect()
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.valid_readings = 0;
    }

    /// Poll for a new measurement
    ///
    /// `Ok(true)` when a new sample was stored, `Ok(false)` when none was ready or
    /// the reading was rejected. A bus error marks the sensor disconnected.
    pub fn update(&mut self) -> Result<bool, Scd4xError<E>> {
        if !self.connected {
            return Err(Scd4xError::NotConnected);
        }

        let ready = match self.read_words::<1>(Command::GET_DATA_READY_STATUS) {
            Ok([status]) => status & 0x07FF != 0,
            Err(e) => return Err(self.failed("check data ready flag", e)),
        };
        if !ready {
            log::debug!("Data not ready yet");
            return Ok(false);
        }

        let [co2, raw_t, raw_rh] = match self.read_words::<3>(Command::READ_MEASUREMENT) {
            Ok(words) => words,
            Err(e) => return Err(self.failed("read measurement", e)),
        };

        if co2 == 0 {
            log::warn!("Invalid CO2 reading (value = 0)");
            return Ok(false);
        }

        self.sample = Sample {
            co2,
            temperature: temperature_from_raw(raw_t),
            humidity: humidity_from_raw(raw_rh),
        };
        if self.valid_readings < MAX_VALID_READINGS {
            self.valid_readings += 1;
            log::debug!("Valid reading count: {}", self.valid_readings);
        }
        log::info!(
            "CO2: {} ppm, Temp: {:.2} C, Humidity: {:.2}%",
            self.sample.co2,
            self.sample.temperature,
            self.sample.humidity
        );
        Ok(true)
    }

    /// Log a failed transfer; bus errors drop the connection, checksum errors do not
    fn failed(&mut self, what: &str, e: Scd4xError<E>) -> Scd4xError<E> {
        match &e {
            Scd4xError::Crc => log::warn!("Checksum mismatch, failed to {}", what),
            _ => {
                log::error!("Failed to {}: {:?}", what, e);
                self.disconnect();
            }
        }
        e
    }

    /// Stop measuring, let the sensor settle, then run [`Self::begin`] again
    pub fn reset(&mut self) -> Result<(), Scd4xError<E>> {
        log::info!("Resetting CO2 sensor");
        self.write_command(Command::STOP_PERIODIC_MEASUREMENT)
            .inspect_err(|_| self.disconnect())?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.begin()
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> Co2Sensor for Scd4x<I2C, D> {
    fn sample(&self) -> Sample {
        self.sample
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn valid_reading_count(&self) -> u8 {
        self.valid_readings
    }
}
