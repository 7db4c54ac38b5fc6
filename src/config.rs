//! Engine configuration
//!
//! All knobs the display engine needs at construction time. Pin numbers are not part of
//! this, they live in [`crate::uc8179::pins::Pins`].

use anyhow::{ensure, Result};

use crate::chart::bar::BarChart;

/// Default CO2 level (ppm) at which bars turn hollow and the alarm fires
pub const DEFAULT_ALARM_THRESHOLD: u16 = 1000;

/// Default long history length, 24 hours of data with 30 min samples
pub const DEFAULT_HISTORY_CAPACITY: usize = 48;

/// Bounded polling of the BUSY line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyTimeout {
    /// Delay between two reads of the BUSY pin
    pub poll_interval_ms: u32,
    /// Give up after this long and carry on with whatever the panel shows
    pub max_wait_ms: u32,
}

impl BusyTimeout {
    pub const fn new(poll_interval_ms: u32, max_wait_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            max_wait_ms,
        }
    }

    /// Number of polls before the wait is considered timed out
    pub const fn max_polls(&self) -> u32 {
        if self.poll_interval_ms == 0 {
            return 1;
        }
        let polls = self.max_wait_ms / self.poll_interval_ms;
        if polls == 0 {
            1
        } else {
            polls
        }
    }
}

impl Default for BusyTimeout {
    fn default() -> Self {
        // A full refresh of the 5.83" panel takes well under 30 seconds
        Self::new(10, 30_000)
    }
}

/// Backpressure for the plane byte streams
///
/// Plane data is written in chunks of `chunk_len` bytes with a `pause_us` pause after
/// each chunk so the controller's input buffer is never overrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPacing {
    pub chunk_len: usize,
    pub pause_us: u32,
}

impl TransferPacing {
    pub const fn new(chunk_len: usize, pause_us: u32) -> Self {
        Self {
            chunk_len,
            pause_us,
        }
    }
}

impl Default for TransferPacing {
    fn default() -> Self {
        Self::new(32, 5)
    }
}

/// Configuration for [`crate::engine::DisplayEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// CO2 level used for the threshold guide, hollow bars and the warning badge
    pub alarm_threshold: u16,
    /// Number of slots in the long CO2 history
    pub history_capacity: usize,
    pub busy: BusyTimeout,
    pub pacing: TransferPacing,
}

impl EngineConfig {
    pub const fn new(alarm_threshold: u16, history_capacity: usize) -> Self {
        Self {
            alarm_threshold,
            history_capacity,
            busy: BusyTimeout::new(10, 30_000),
            pacing: TransferPacing::new(32, 5),
        }
    }

    pub const fn with_busy_timeout(mut self, busy: BusyTimeout) -> Self {
        self.busy = busy;
        self
    }

    pub const fn with_pacing(mut self, pacing: TransferPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Check the values can actually be drawn and driven
    pub fn validate(&self) -> Result<()> {
        ensure!(self.history_capacity > 0, "history capacity must be at least 1");
        let max_slots = BarChart::default().max_slots();
        ensure!(
            self.history_capacity <= max_slots,
            "history capacity {} exceeds the {} bars the chart can draw",
            self.history_capacity,
            max_slots
        );
        ensure!(
            self.busy.poll_interval_ms > 0,
            "busy poll interval must be non-zero"
        );
        ensure!(self.pacing.chunk_len > 0, "transfer chunk length must be non-zero");
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ALARM_THRESHOLD, DEFAULT_HISTORY_CAPACITY)
    }
}
