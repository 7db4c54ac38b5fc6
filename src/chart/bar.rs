//! Long history bar chart
//!
//! Bars are laid out from the write index backwards around the ring. Readings at or
//! above the alarm threshold are drawn hollow, empty slots as a small outlined stub.

use crate::canvas::{Canvas, FontSize};
use crate::chart::scale::{autoscale, Co2Scale, ScaleRules};
use crate::color::Color;
use crate::uc8179::WIDTH;

/// Height of the outline drawn for a slot without a reading
pub const PLACEHOLDER_HEIGHT: i32 = 5;

/// Left edge of the axis labels, relative to the chart
const LABEL_OFFSET: i32 = 60;

/// Position and size of the bar chart frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarChart {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for BarChart {
    fn default() -> Self {
        Self {
            x: 70,
            y: 220,
            width: WIDTH as i32 - 100,
            height: 160,
        }
    }
}

impl BarChart {
    /// Most slots that still get one pixel column each
    pub fn max_slots(&self) -> usize {
        (self.width - 10).max(1) as usize
    }

    pub fn bar_width(&self, slots: usize) -> i32 {
        if slots == 0 {
            return 1;
        }
        ((self.width - 10) / slots as i32).max(1)
    }

    /// Row the bars stand on
    pub fn baseline(&self) -> i32 {
        self.y + self.height - 5
    }

    /// Smallest and largest bar height
    pub fn bar_range(&self) -> (i32, i32) {
        (5, self.height - 10)
    }

    /// Pixel row of a ppm value on this chart's axis
    pub fn row_of(&self, scale: &Co2Scale, value: u32) -> i32 {
        scale.map(value, self.y + self.height - 5, self.y + 5)
    }

    pub fn bar_x(&self, position: usize, bar_width: i32) -> i32 {
        self.x + 5 + position as i32 * bar_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    /// Slot has no reading yet
    Placeholder,
    Filled { height: i32 },
    /// Reading at or above the alarm threshold
    Hollow { height: i32 },
}

/// One bar of the chart: where it goes, which history slot it shows, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedBar {
    /// Left-to-right position on the chart
    pub position: usize,
    /// Index into the history ring
    pub slot: usize,
    pub value: u16,
    pub kind: BarKind,
}

/// Decide every bar without touching pixels
pub fn plan_bars(
    history: &[u16],
    write_index: usize,
    scale: &Co2Scale,
    threshold: u16,
    chart: &BarChart,
) -> Vec<PlannedBar> {
    let n = history.len();
    if n == 0 {
        return Vec::new();
    }
    let anchor = write_index % n;
    let (lo, hi) = chart.bar_range();

    (0..n)
        .map(|position| {
            let slot = (anchor + n - position) % n;
            let value = history[slot];
            let kind = if value == 0 {
                BarKind::Placeholder
            } else {
                let height = scale.map(u32::from(value), lo, hi);
                if value >= threshold {
                    BarKind::Hollow { height }
                } else {
                    BarKind::Filled { height }
                }
            };
            PlannedBar {
                position,
                slot,
                value,
                kind,
            }
        })
        .collect()
}

/// Draw the frame, axis, labels, threshold guide and bars for `history`
///
/// Returns the scale the chart was drawn with.
pub fn draw_bar_chart(
    canvas: &mut Canvas,
    chart: &BarChart,
    history: &[u16],
    write_index: usize,
    threshold: u16,
) -> Co2Scale {
    let BarChart {
        x,
        y,
        width,
        height,
    } = *chart;

    // Chart border
    canvas.hline(x, y, width, Color::White);
    canvas.hline(x, y + height, width, Color::White);
    canvas.vline(x, y, height, Color::White);
    canvas.vline(x + width, y, height, Color::White);

    let scale = autoscale(history, ScaleRules::LONG);

    canvas.set_font(FontSize::Small);
    canvas.set_color(Color::White);
    canvas.print_at(x, y - 5, "CO2 History");

    // Y axis and labels
    canvas.vline(x - 5, y, height, Color::White);
    canvas.print_at(x - LABEL_OFFSET, y + 15, &format!("{:4}", scale.max));
    canvas.print_at(x - LABEL_OFFSET, y + height - 5, &format!("{:4}", scale.min));
    // autoscale keeps max above min, so the midpoint label is always distinct
    canvas.print_at(x - LABEL_OFFSET, y + height / 2 + 5, &format!("{:4}", scale.mid()));

    if scale.contains(u32::from(threshold)) {
        let row = chart.row_of(&scale, u32::from(threshold));
        let mut dash = x + 2;
        while dash < x + width - 4 {
            canvas.hline(dash, row, 3, Color::White);
            dash += 6;
        }
    }

    let bar_width = chart.bar_width(history.len());
    let base = chart.baseline();
    for bar in plan_bars(history, write_index, &scale, threshold, chart) {
        let bx = chart.bar_x(bar.position, bar_width);
        match bar.kind {
            BarKind::Hollow { height: h } => {
                canvas.vline(bx, base - h + 1, h, Color::White);
                canvas.vline(bx + bar_width - 1, base - h + 1, h, Color::White);
                canvas.hline(bx, base - h, bar_width, Color::White);
                canvas.hline(bx, base, bar_width, Color::White);
            }
            BarKind::Filled { height: h } => {
                canvas.fill_rect(bx, base - h, bar_width, h, Color::White);
            }
            BarKind::Placeholder => {
                canvas.stroke_rect(
                    bx,
                    base - PLACEHOLDER_HEIGHT,
                    bar_width,
                    PLACEHOLDER_HEIGHT,
                    Color::White,
                );
            }
        }
    }

    // Reference line
    canvas.hline(x, y + height / 2, width, Color::White);

    scale
}
