//! Packed 1-bit framebuffer
//!
//! Row-major, MSB first: pixel `(x, y)` is bit `y * width + x`, stored in byte
//! `bit / 8` at position `7 - bit % 8`. Writes outside the buffer are dropped, so
//! chart code can compute coordinates near the edges without checking.

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    Pixel,
};

use crate::color::Color;

/// Display buffer used for drawing, with or without embedded-graphics
pub struct Framebuffer {
    buffer: Box<[u8]>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Allocate a buffer for `width` x `height` pixels, cleared to black
    pub fn new(width: u32, height: u32) -> Self {
        let bits = width as usize * height as usize;
        Self {
            buffer: vec![Color::Black.fill_byte(); bits.div_ceil(8)].into_boxed_slice(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// get internal buffer to use it (to send to the panel)
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Byte index and bit mask of an in-bounds pixel
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let bit = y as usize * self.width as usize + x as usize;
        Some((bit / 8, 0x80 >> (bit % 8)))
    }

    pub fn clear(&mut self, color: Color) {
        self.buffer.fill(color.fill_byte());
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some((byte, mask)) = self.locate(x, y) else {
            return;
        };
        match color {
            Color::White => self.buffer[byte] |= mask,
            Color::Black => self.buffer[byte] &= !mask,
        }
    }

    /// Read a pixel back, `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.locate(x, y)
            .map(|(byte, mask)| Color::from_bit(self.buffer[byte] & mask != 0))
    }

    pub fn hline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        for i in x..x.saturating_add(len) {
            self.set_pixel(i, y, color);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        for j in y..y.saturating_add(len) {
            self.set_pixel(x, j, color);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        // clip first, large clears of the chart area would otherwise walk offscreen rows
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for j in y0..y1 {
            for i in x0..x1 {
                self.set_pixel(i, j, color);
            }
        }
    }

    /// Outline only; corners are drawn twice
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.hline(x, y, w, color);
        self.hline(x, y + h - 1, w, color);
        self.vline(x, y, h, color);
        self.vline(x + w - 1, y, h, color);
    }

    /// Count pixels of `color` inside a rectangle, clipped to the buffer
    #[cfg(test)]
    pub(crate) fn count_in(&self, x: i32, y: i32, w: i32, h: i32, color: Color) -> usize {
        let mut n = 0;
        for j in y..y.saturating_add(h) {
            for i in x..x.saturating_add(w) {
                if self.pixel(i, j) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }
}

/// For use with embedded_graphics
impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.into());
        }
        Ok(())
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use proptest::prelude::*;

    const W: u32 = 648;
    const H: u32 = 480;

    #[test]
    fn test_new_buffer_is_black_and_sized() {
        let fb = Framebuffer::new(W, H);
        assert_eq!(fb.as_bytes().len(), 38880);
        assert!(fb.as_bytes().iter().all(|b| *b == 0));

        // partial trailing byte is rounded up
        assert_eq!(Framebuffer::new(3, 3).as_bytes().len(), 2);
    }

    #[test]
    fn test_bit_addressing_msb_first() {
        let mut fb = Framebuffer::new(W, H);
        fb.set_pixel(0, 0, Color::White);
        assert_eq!(fb.as_bytes()[0], 0x80);
        fb.set_pixel(7, 0, Color::White);
        assert_eq!(fb.as_bytes()[0], 0x81);

        // second row starts at bit 648 = byte 81
        fb.set_pixel(0, 1, Color::White);
        assert_eq!(fb.as_bytes()[81], 0x80);
        fb.set_pixel(W as i32 - 1, H as i32 - 1, Color::White);
        assert_eq!(*fb.as_bytes().last().unwrap(), 0x01);
    }

    #[test]
    fn test_hline_negative_length_is_noop() {
        let mut fb = Framebuffer::new(16, 16);
        fb.hline(5, 5, -3, Color::White);
        fb.vline(5, 5, 0, Color::White);
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_stroke_rect_draws_only_edges() {
        let mut fb = Framebuffer::new(32, 32);
        fb.stroke_rect(2, 3, 10, 6, Color::White);
        assert_eq!(fb.count_in(0, 0, 32, 32, Color::White), 2 * 10 + 2 * 4);
        assert_eq!(fb.pixel(2, 3), Some(Color::White));
        assert_eq!(fb.pixel(11, 8), Some(Color::White));
        assert_eq!(fb.pixel(5, 5), Some(Color::Black));
    }

    #[test]
    fn test_fill_rect_clips_at_edges() {
        let mut fb = Framebuffer::new(16, 16);
        fb.fill_rect(-4, -4, 8, 8, Color::White);
        assert_eq!(fb.count_in(0, 0, 16, 16, Color::White), 16);
        fb.fill_rect(12, 12, 100, 100, Color::White);
        assert_eq!(fb.count_in(0, 0, 16, 16, Color::White), 32);
    }

    #[test]
    fn test_embedded_graphics_draws_through_set_pixel() {
        let mut fb = Framebuffer::new(16, 16);
        Line::new(Point::new(-5, 2), Point::new(20, 2))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_in(0, 2, 16, 1, Color::White), 16);
        assert_eq!(fb.size(), Size::new(16, 16));
    }

    proptest! {
        #[test]
        fn prop_set_then_read(x in 0..W as i32, y in 0..H as i32, white in any::<bool>()) {
            let mut fb = Framebuffer::new(W, H);
            fb.clear(Color::from_bit(!white));
            let color = Color::from_bit(white);
            fb.set_pixel(x, y, color);
            prop_assert_eq!(fb.pixel(x, y), Some(color));

            // neighbours, including across byte boundaries, are untouched
            for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                if let Some(c) = fb.pixel(nx, ny) {
                    prop_assert_eq!(c, color.inverse());
                }
            }
        }

        #[test]
        fn prop_out_of_bounds_never_writes(
            x in -2000i32..2000,
            y in -2000i32..2000,
            white in any::<bool>(),
        ) {
            prop_assume!(x < 0 || y < 0 || x >= W as i32 || y >= H as i32);
            let mut fb = Framebuffer::new(W, H);
            fb.clear(Color::Black);
            fb.set_pixel(x, y, Color::from_bit(white));
            fb.set_pixel(x, y, Color::White);
            prop_assert!(fb.as_bytes().iter().all(|b| *b == 0));
            prop_assert_eq!(fb.pixel(x, y), None);
        }

        #[test]
        fn prop_clear_sets_every_pixel(x in 0..W as i32, y in 0..H as i32, white in any::<bool>()) {
            let mut fb = Framebuffer::new(W, H);
            let color = Color::from_bit(white);
            fb.set_pixel(x, y, color.inverse());
            fb.clear(color);
            prop_assert_eq!(fb.pixel(x, y), Some(color));
        }
    }
}
