//! UC8179 Display Driver Implementation
//!
//! Sequencing on top of [`DisplayInterface`]: reset, the fixed init sequence, the
//! two-plane frame transfer with refresh, and deep sleep.
//!
//! ## Panel states
//!
//! ```text
//! Unreset -> Resetting -> AwaitingPowerReady -> Configured -> Idle <-> Transferring -> Refreshing
//!                                                               \-> Sleeping
//! ```
//!
//! ## BUSY Pin Wait
//!
//! After `POWER_ON`, `DISPLAY_REFRESH` and `POWER_OFF` the driver **must** wait for the
//! BUSY pin to go LOW. The wait is bounded; on timeout the driver logs and moves on.

pub use display_interface::DisplayError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::config::{BusyTimeout, TransferPacing};
use crate::uc8179::interface::{BusyWait, DisplayInterface};
use crate::uc8179::{cmd::Cmd, flag::Flag, PLANE_BYTES};

const REFRESH_SETTLE_MS: u32 = 10;
const POWER_OFF_SETTLE_MS: u32 = 100;

/// Where the panel is in its power/refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Unreset,
    Resetting,
    AwaitingPowerReady,
    Configured,
    Idle,
    Transferring,
    Refreshing,
    Sleeping,
}

/// UC8179 E-Paper Display Driver
///
/// ## Type Parameters
///
/// - `SPI` - SPI device for communication
/// - `BSY` - BUSY input pin (HIGH when display is busy)
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `DELAY` - Delay provider for timing
pub struct Uc8179<SPI, BSY, DC, RST, DELAY> {
    /// The display interface
    pub interface: DisplayInterface<SPI, BSY, DC, RST, DELAY>,
    state: PanelState,
    busy_timeout: BusyTimeout,
    pacing: TransferPacing,
}

impl<SPI, BSY, DC, RST, DELAY> Uc8179<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Create the driver. Nothing is sent until [`Self::reset`] / [`Self::init`].
    pub fn new(
        spi: SPI,
        busy: BSY,
        dc: DC,
        rst: RST,
        delay: DELAY,
        busy_timeout: BusyTimeout,
        pacing: TransferPacing,
    ) -> Self {
        let interface = DisplayInterface::new(spi, busy, dc, rst, delay);
        Self::from_interface(interface, busy_timeout, pacing)
    }

    pub fn from_interface(
        interface: DisplayInterface<SPI, BSY, DC, RST, DELAY>,
        busy_timeout: BusyTimeout,
        pacing: TransferPacing,
    ) -> Self {
        Uc8179 {
            interface,
            state: PanelState::Unreset,
            busy_timeout,
            pacing,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Hardware reset
    pub fn reset(&mut self) -> Result<(), DisplayError> {
        log::info!("Resetting display");
        self.state = PanelState::Resetting;
        self.interface.reset()
    }

    /// Send the init sequence. The order and bytes are fixed by the panel firmware.
    ///
    /// Returns how the power-on wait ended.
    pub fn init(&mut self) -> Result<BusyWait, DisplayError> {
        log::info!("Sending init commands");

        self.interface
            .cmd_with_data(Cmd::BOOSTER_SOFT_START, &Flag::BOOSTER_SOFT_START)?;

        self.interface.cmd(Cmd::POWER_ON)?;
        self.state = PanelState::AwaitingPowerReady;
        let power = self.interface.wait_until_idle(self.busy_timeout);

        self.interface
            .cmd_with_data(Cmd::PANEL_SETTING, &[Flag::PANEL_SETTING_BW_OTP])?;
        self.interface
            .cmd_with_data(Cmd::VCOM_DATA_INTERVAL, &Flag::VCOM_DATA_INTERVAL)?;
        self.interface
            .cmd_with_data(Cmd::RESOLUTION_SETTING, &Flag::RESOLUTION_648_480)?;

        self.state = PanelState::Configured;
        log::info!("Init commands sent");
        Ok(power)
    }

    /// Reset and re-run the init sequence, needed after [`Self::sleep`]
    pub fn wake_up(&mut self) -> Result<BusyWait, DisplayError> {
        self.reset()?;
        self.init()
    }

    /// Write the black plane from `buffer`, a blank red plane of the same length,
    /// then refresh and wait for the panel.
    ///
    /// A panel that is not `Idle` or `Configured` (never set up, asleep, or left
    /// half-way by a failed call) is reset and re-initialized first. A bus error
    /// leaves the panel `Unreset`.
    pub fn transfer_frame(&mut self, buffer: &[u8]) -> Result<BusyWait, DisplayError> {
        let result = self.try_transfer_frame(buffer);
        if let Err(e) = &result {
            log::error!("Frame transfer failed in state {:?}: {:?}", self.state, e);
            self.state = PanelState::Unreset;
        }
        result
    }

    fn try_transfer_frame(&mut self, buffer: &[u8]) -> Result<BusyWait, DisplayError> {
        if !matches!(self.state, PanelState::Idle | PanelState::Configured) {
            log::info!("Display is {:?}, waking it up before transfer", self.state);
            self.wake_up()?;
        }

        if buffer.len() != PLANE_BYTES {
            log::warn!(
                "Frame is {} bytes, panel expects {}; sending as is",
                buffer.len(),
                PLANE_BYTES
            );
        }

        self.state = PanelState::Transferring;
        log::debug!("Sending black plane");
        self.interface.cmd(Cmd::WRITE_BLACK_DATA)?;
        self.interface.stream(buffer, self.pacing)?;

        log::debug!("Sending blank red plane");
        self.interface.cmd(Cmd::WRITE_RED_DATA)?;
        self.interface
            .stream_repeated(Flag::RED_PLANE_BLANK, buffer.len(), self.pacing)?;

        self.state = PanelState::Refreshing;
        self.interface.cmd(Cmd::DISPLAY_REFRESH)?;
        self.interface.delay_ms(REFRESH_SETTLE_MS);
        let wait = self.interface.wait_until_idle(self.busy_timeout);

        self.state = PanelState::Idle;
        log::info!("Display update complete ({:?})", wait);
        Ok(wait)
    }

    /// Power off and enter deep sleep
    pub fn sleep(&mut self) -> Result<BusyWait, DisplayError> {
        log::info!("Display going to sleep");
        self.interface.cmd(Cmd::POWER_OFF)?;
        let wait = self.interface.wait_until_idle(self.busy_timeout);
        self.interface.delay_ms(POWER_OFF_SETTLE_MS);
        self.interface
            .cmd_with_data(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_CHECK])?;
        self.state = PanelState::Sleeping;
        Ok(wait)
    }

    /// Give the peripherals back
    pub fn release(self) -> (SPI, BSY, DC, RST, DELAY) {
        self.interface.release()
    }
}
