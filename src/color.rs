//! B/W color for the framebuffer
//!
//! The panel RAM stores a 1 for white and a 0 for black.

use embedded_graphics::pixelcolor::BinaryColor;

/// Pixel color of the monochrome panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Bit cleared, the default background
    #[default]
    Black,
    /// Bit set
    White,
}

impl Color {
    /// Byte with all eight pixels in this color
    pub const fn fill_byte(self) -> u8 {
        match self {
            Color::Black => 0x00,
            Color::White => 0xFF,
        }
    }

    pub const fn inverse(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub(crate) const fn from_bit(bit: bool) -> Color {
        if bit {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        match color {
            BinaryColor::On => Color::White,
            BinaryColor::Off => Color::Black,
        }
    }
}

impl From<Color> for BinaryColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => BinaryColor::On,
            Color::Black => BinaryColor::Off,
        }
    }
}
