//! CO2 monitor on a 5.83" 648x480 e-paper panel
//!
//! The display engine ([`engine::DisplayEngine`]) owns the UC8179 panel driver and a
//! packed 1-bit framebuffer, and turns a [`sensor::Sample`] plus borrowed history
//! buffers into full-screen or chart-only frames. The rest of the crate is the
//! monitor around it: the SCD4x sensor driver, the history ring buffers and the
//! timing/alarm policy of the main loop.
//!
//! Everything here only needs `embedded-hal` traits, so it runs and tests on the
//! host. The firmware binary wires it to ESP-IDF peripherals.

pub mod canvas;
pub mod chart;
pub mod color;
pub mod config;
pub mod engine;
pub mod framebuffer;
pub mod history;
pub mod layout;
pub mod monitor;
pub mod scd4x;
pub mod sensor;
pub mod uc8179;

#[cfg(test)]
mod testing;

pub use crate::color::Color;
pub use crate::config::EngineConfig;
pub use crate::engine::{DisplayEngine, RefreshReport};
pub use crate::layout::Readings;
pub use crate::sensor::{Co2Sensor, Sample};
