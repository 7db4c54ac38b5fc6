//! Display engine
//!
//! Owns the panel driver and the one framebuffer. The monitor loop hands in samples
//! and history views per call; nothing it passes in is kept.

use anyhow::{Context, Result};
pub use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::EngineConfig;
use crate::layout::{compose_chart_only, compose_full, compose_loading, Readings};
use crate::uc8179::driver::{PanelState, Uc8179};
use crate::uc8179::interface::BusyWait;
use crate::uc8179::{HEIGHT, WIDTH};

/// What a panel refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// How the wait after the refresh command ended
    pub busy: BusyWait,
    /// Bytes written per plane
    pub plane_bytes: usize,
}

impl RefreshReport {
    pub fn timed_out(&self) -> bool {
        self.busy.timed_out()
    }

    /// The panel signalled the end of the refresh
    pub fn confirmed(&self) -> bool {
        self.busy.is_idle()
    }
}

pub struct DisplayEngine<SPI, BSY, DC, RST, DELAY> {
    panel: Uc8179<SPI, BSY, DC, RST, DELAY>,
    canvas: Canvas,
    config: EngineConfig,
}

impl<SPI, BSY, DC, RST, DELAY> DisplayEngine<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Validate `config` and allocate the framebuffer. The panel is not touched until
    /// [`Self::begin`].
    pub fn new(
        spi: SPI,
        busy: BSY,
        dc: DC,
        rst: RST,
        delay: DELAY,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate().context("invalid display engine config")?;
        let panel = Uc8179::new(spi, busy, dc, rst, delay, config.busy, config.pacing);
        Ok(Self {
            panel,
            canvas: Canvas::new(WIDTH, HEIGHT),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel.state()
    }

    /// Reset and configure the panel, then show a black screen
    pub fn begin(&mut self) -> Result<RefreshReport, DisplayError> {
        log::info!("Display: Initializing...");
        self.panel.reset()?;
        let power = self.panel.init()?;
        if !power.is_idle() {
            log::warn!("Panel did not report power-on ready ({:?}), continuing", power);
        }
        self.canvas.clear(Color::Black);
        let report = self.refresh()?;
        log::info!("Display: Initialization complete");
        Ok(report)
    }

    /// Clip a caller history to the configured capacity
    fn history_view<'h>(&self, history: &'h [u16]) -> &'h [u16] {
        if history.len() > self.config.history_capacity {
            log::debug!(
                "History has {} slots, drawing the first {}",
                history.len(),
                self.config.history_capacity
            );
            &history[..self.config.history_capacity]
        } else {
            history
        }
    }

    /// Redraw the whole screen and send it
    pub fn render_full(
        &mut self,
        readings: &Readings,
        connected: bool,
    ) -> Result<RefreshReport, DisplayError> {
        log::info!("Display: Performing full update");
        let view = Readings {
            co2_history: self.history_view(readings.co2_history),
            ..*readings
        };
        compose_full(&mut self.canvas, &view, connected, self.config.alarm_threshold);
        self.refresh()
    }

    /// Redraw only the chart region; the whole frame is still sent
    pub fn render_chart_only(
        &mut self,
        history: &[u16],
        write_index: usize,
    ) -> Result<RefreshReport, DisplayError> {
        log::info!("Display: Updating chart area");
        let history = self.history_view(history);
        compose_chart_only(
            &mut self.canvas,
            history,
            write_index,
            self.config.alarm_threshold,
        );
        self.refresh()
    }

    pub fn show_loading_screen(&mut self) -> Result<RefreshReport, DisplayError> {
        compose_loading(&mut self.canvas);
        self.refresh()
    }

    /// Deep sleep; the next render wakes the panel up again
    pub fn sleep(&mut self) -> Result<BusyWait, DisplayError> {
        self.panel.sleep()
    }

    fn refresh(&mut self) -> Result<RefreshReport, DisplayError> {
        let frame = self.canvas.framebuffer().as_bytes();
        let busy = self.panel.transfer_frame(frame)?;
        log::debug!("Sent {} bytes per plane, {:?}", frame.len(), busy);
        Ok(RefreshReport {
            busy,
            plane_bytes: frame.len(),
        })
    }

    /// Give the peripherals back
    pub fn release(self) -> (SPI, BSY, DC, RST, DELAY) {
        self.panel.release()
    }
}
