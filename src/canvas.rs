//! Drawing surface with a text cursor
//!
//! [`Canvas`] owns the [`Framebuffer`] and the text state (cursor, font, color). Every
//! `print` reads that state and moves the cursor along, the same way a terminal would.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use profont::{PROFONT_12_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

use crate::color::Color;
use crate::framebuffer::Framebuffer;

/// Fonts available to the layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    /// Headline values
    Large,
    /// Secondary values
    Medium,
    /// Labels, axes and footers
    #[default]
    Small,
}

impl FontSize {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            FontSize::Large => &PROFONT_24_POINT,
            FontSize::Medium => &PROFONT_18_POINT,
            FontSize::Small => &PROFONT_12_POINT,
        }
    }

    /// Horizontal advance per character
    pub fn advance(self) -> i32 {
        let font = self.font();
        (font.character_size.width + font.character_spacing) as i32
    }

    pub fn line_height(self) -> i32 {
        self.font().character_size.height as i32
    }

    /// Width of `text` rendered in this font
    pub fn text_width(self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance()
    }
}

/// Text state consulted by every print call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextContext {
    /// Left end of the baseline for the next glyph
    pub cursor: Point,
    pub font: FontSize,
    pub color: Color,
}

impl Default for TextContext {
    fn default() -> Self {
        Self {
            cursor: Point::zero(),
            font: FontSize::default(),
            color: Color::White,
        }
    }
}

/// Format `value` with `precision` decimals, never printing a negative zero
pub fn format_float(value: f32, precision: usize) -> String {
    let text = format!("{:.*}", precision, value);
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

/// Framebuffer plus text state
pub struct Canvas {
    fb: Framebuffer,
    text: TextContext,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fb: Framebuffer::new(width, height),
            text: TextContext::default(),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    pub fn width(&self) -> i32 {
        self.fb.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.fb.height() as i32
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.text.cursor = Point::new(x, y);
    }

    pub fn cursor(&self) -> Point {
        self.text.cursor
    }

    pub fn set_font(&mut self, font: FontSize) {
        self.text.font = font;
    }

    pub fn set_color(&mut self, color: Color) {
        self.text.color = color;
    }

    /// Draw `text` at the cursor and advance the cursor past it
    pub fn print(&mut self, text: &str) {
        let style = MonoTextStyle::new(self.text.font.font(), BinaryColor::from(self.text.color));
        // The point embedded-graphics returns drops the trailing character spacing
        let _ = Text::with_baseline(text, self.text.cursor, style, Baseline::Alphabetic)
            .draw(&mut self.fb);
        self.text.cursor.x += self.text.font.text_width(text);
    }

    pub fn print_int(&mut self, value: i32) {
        self.print(&value.to_string());
    }

    pub fn print_float(&mut self, value: f32, precision: usize) {
        self.print(&format_float(value, precision));
    }

    /// Convenience: move the cursor, then print
    pub fn print_at(&mut self, x: i32, y: i32, text: &str) {
        self.set_cursor(x, y);
        self.print(text);
    }

    pub fn clear(&mut self, color: Color) {
        self.fb.clear(color);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.fb.set_pixel(x, y, color);
    }

    pub fn hline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.fb.hline(x, y, len, color);
    }

    pub fn vline(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.fb.vline(x, y, len, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.fb.fill_rect(x, y, w, h, color);
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.fb.stroke_rect(x, y, w, h, color);
    }
}
