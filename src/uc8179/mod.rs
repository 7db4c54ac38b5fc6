//! UC8179 ePaper Display Driver
//!
//! Used in the 5.83" 648x480 black/white(/red) panels. This panel is driven as a
//! monochrome display, the red plane is always written blank.
//!
//! ### Usage
//! This driver does not hide that you're working with one buffer for black/white. To
//! display something you:
//!
//! 1. first draw into a [`crate::framebuffer::Framebuffer`], preferably through a
//!    [`crate::canvas::Canvas`]
//! 1. then hand the bytes to [`driver::Uc8179::transfer_frame`], which writes both
//!    planes and kicks off the refresh
//!
//! The controller has no acknowledgement channel. The only feedback is the BUSY line,
//! which [`interface::DisplayInterface::wait_until_idle`] polls with a bounded timeout.

pub mod cmd;
pub mod driver;
pub mod flag;
pub mod interface;
pub mod pins;

/// Display width, pixels horizontally
pub const WIDTH: u32 = 648;

/// Display height, pixels vertically
pub const HEIGHT: u32 = 480;

/// Bytes in one plane (1 bit per pixel)
pub const PLANE_BYTES: usize = (WIDTH * HEIGHT / 8) as usize;
