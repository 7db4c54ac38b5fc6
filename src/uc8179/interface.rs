//! Display interface using SPI
use crate::config::{BusyTimeout, TransferPacing};
use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

const RESET_DELAY_MS: u32 = 10;

/// Outcome of polling the BUSY line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyWait {
    /// BUSY went low after `polls` busy reads
    Idle { polls: u32 },
    /// BUSY never went low, the caller carried on anyway
    TimedOut { waited_ms: u32 },
    /// Reading BUSY failed after `polls` busy reads, the caller carried on anyway
    PinError { polls: u32 },
}

impl BusyWait {
    pub fn timed_out(&self) -> bool {
        matches!(self, BusyWait::TimedOut { .. })
    }

    /// The panel actually reported ready
    pub fn is_idle(&self) -> bool {
        matches!(self, BusyWait::Idle { .. })
    }
}

/// The Connection Interface of the UC8179 panel
///
/// The SPI device owns chip select, so every `write` is one select-low, transfer,
/// select-high window.
pub struct DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    /// SPI device
    spi: SPI,
    /// High for busy, Wait until display is ready!
    busy: BSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: RST,
    delay: DELAY,
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    /// Create the interface, nothing is sent to the panel yet
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        DisplayInterface {
            spi,
            busy,
            dc,
            rst,
            delay,
        }
    }

    /// Give the peripherals back
    pub fn release(self) -> (SPI, BSY, DC, RST, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.delay)
    }
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Basic function for sending commands
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        match self.spi.write(&[command]) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    /// Send data bytes, one chip select window per byte
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        for byte in data {
            self.spi
                .write(core::slice::from_ref(byte))
                .map_err(|_| DisplayError::BusWriteError)?;
        }
        Ok(())
    }

    /// Basic function for sending a command and the data belonging to it.
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Stream a whole plane in paced chunks
    pub(crate) fn stream(
        &mut self,
        bytes: &[u8],
        pacing: TransferPacing,
    ) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;

        for chunk in bytes.chunks(pacing.chunk_len.max(1)) {
            self.spi
                .write(chunk)
                .map_err(|_| DisplayError::BusWriteError)?;
            if pacing.pause_us > 0 {
                self.delay.delay_us(pacing.pause_us);
            }
        }

        log::debug!("Completed sending {} bytes of data", bytes.len());
        Ok(())
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    /// Used for the blank red plane
    pub(crate) fn stream_repeated(
        &mut self,
        val: u8,
        repetitions: usize,
        pacing: TransferPacing,
    ) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;

        let chunk_len = pacing.chunk_len.max(1);
        let buffer = vec![val; chunk_len];

        let full_chunks = repetitions / chunk_len;
        let remainder = repetitions % chunk_len;

        for _ in 0..full_chunks {
            self.spi
                .write(&buffer)
                .map_err(|_| DisplayError::BusWriteError)?;
            if pacing.pause_us > 0 {
                self.delay.delay_us(pacing.pause_us);
            }
        }

        if remainder > 0 {
            self.spi
                .write(&buffer[..remainder])
                .map_err(|_| DisplayError::BusWriteError)?;
        }

        log::debug!("Completed sending {} repeated 0x{:02X} bytes", repetitions, val);
        Ok(())
    }

    /// Wait for busy pin to go LOW, bounded by `timeout`
    ///
    /// Never fails: a stuck BUSY line or an unreadable pin only costs one possibly stale
    /// frame, so the wait gives up and reports what happened.
    pub fn wait_until_idle(&mut self, timeout: BusyTimeout) -> BusyWait {
        let max_polls = timeout.max_polls();
        let mut polls = 0u32;

        while polls < max_polls {
            match self.busy.is_high() {
                Ok(false) => return BusyWait::Idle { polls },
                Ok(true) => {
                    polls += 1;
                    self.delay.delay_ms(timeout.poll_interval_ms);
                }
                Err(_) => {
                    log::error!("Error reading BUSY pin state - assuming not busy to continue");
                    return BusyWait::PinError { polls };
                }
            }
        }

        let waited_ms = polls.saturating_mul(timeout.poll_interval_ms);
        log::warn!(
            "TIMEOUT waiting for BUSY pin to go LOW after {} ms, continuing",
            waited_ms
        );
        BusyWait::TimedOut { waited_ms }
    }

    /// Hardware reset: pull RST low, then release it
    pub(crate) fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Plain delay on the interface's timer
    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
