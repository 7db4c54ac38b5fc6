//! Small framed charts shown under the values in the top panels

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
};

use crate::canvas::Canvas;
use crate::chart::scale::{autoscale, ScaleRules};
use crate::color::Color;
use crate::history::SHORT_SLOTS;

/// How many of the newest long history slots the CO2 mini chart shows
pub const MINI_SLOTS: usize = 12;

/// Corners of `area` as `(x, y, width, height)`
fn bounds(area: &Rectangle) -> (i32, i32, i32, i32) {
    (
        area.top_left.x,
        area.top_left.y,
        area.size.width as i32,
        area.size.height as i32,
    )
}

/// Pixel height range used inside a mini chart of height `h`
fn height_range(h: i32) -> (i32, i32) {
    (2, (h - 4).max(2))
}

/// Bars for the newest [`MINI_SLOTS`] readings of the long CO2 history, oldest left
pub fn draw_co2_mini_chart(
    canvas: &mut Canvas,
    area: Rectangle,
    history: &[u16],
    write_index: usize,
) {
    let (x, y, w, h) = bounds(&area);
    canvas.stroke_rect(x, y, w, h, Color::White);

    let n = history.len();
    if n == 0 {
        return;
    }
    let shown = MINI_SLOTS.min(n);
    let start = (write_index % n + n - shown) % n;
    let recent: Vec<u16> = (0..shown).map(|k| history[(start + k) % n]).collect();

    let scale = autoscale(&recent, ScaleRules::MINI);
    let (lo, hi) = height_range(h);
    let bar_width = ((w - 4 - (shown as i32 - 1)) / shown as i32).max(1);
    let bottom = y + h - 2;

    for (k, value) in recent.iter().enumerate() {
        if *value == 0 {
            continue;
        }
        let height = scale.map(u32::from(*value), lo, hi);
        let bx = x + 2 + k as i32 * (bar_width + 1);
        canvas.fill_rect(bx, bottom - height + 1, bar_width, height, Color::White);
    }
}

/// Polyline through the `count` newest values of a short history ring, oldest left
///
/// `index` is the next slot to be written. Values are normalized against
/// `[min, max]`; a span that is not positive is treated as 1.0.
pub fn draw_mini_line_chart(
    canvas: &mut Canvas,
    area: Rectangle,
    history: &[f32; SHORT_SLOTS],
    count: usize,
    index: usize,
    min: f32,
    max: f32,
) {
    let (x, y, w, h) = bounds(&area);
    canvas.stroke_rect(x, y, w, h, Color::White);

    let count = count.min(SHORT_SLOTS);
    if count == 0 {
        return;
    }

    let span = if max - min > 0.0 { max - min } else { 1.0 };
    let (lo, hi) = height_range(h);
    let row_of = |value: f32| -> i32 {
        let norm = ((value - min) / span).clamp(0.0, 1.0);
        let px = (lo as f32 + norm * (hi - lo) as f32).round() as i32;
        y + h - 1 - px.clamp(lo, hi)
    };

    let start = (index % SHORT_SLOTS + SHORT_SLOTS - count) % SHORT_SLOTS;
    let left = x + 2;
    let usable = w - 5;

    if count == 1 {
        let value = history[start];
        if value.is_finite() {
            canvas.fill_rect(left, row_of(value), 2, 2, Color::White);
        }
        return;
    }

    let style = PrimitiveStyle::with_stroke(BinaryColor::from(Color::White), 1);
    let mut previous: Option<Point> = None;
    for k in 0..count {
        let value = history[(start + k) % SHORT_SLOTS];
        if !value.is_finite() {
            continue;
        }
        let point = Point::new(left + usable * k as i32 / (count as i32 - 1), row_of(value));
        if let Some(from) = previous {
            // drawing into the framebuffer cannot fail
            let _ = Line::new(from, point)
                .into_styled(style)
                .draw(canvas.framebuffer_mut());
        }
        previous = Some(point);
    }
}
