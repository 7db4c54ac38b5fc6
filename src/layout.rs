//! Screen layouts for the 648x480 panel
//!
//! ```text
//! +-------------+-------------+-------------+  y 0
//! | CO2     [!] | Temperature | Humidity    |
//! | 1234        | 21.5 C      | 48.0 %      |
//! | [mini bars] | [mini line] | [mini line] |
//! +-------------+-------------+-------------+  y 192
//! |        CO2 History bar chart            |
//! +-----------------------------------------+  y 392
//! | Last update: 12 min ago   Alarm at 1000 |  baseline y 440
//! ```
//!
//! Every `compose_*` function only draws into the canvas; sending the frame is up to
//! the engine.

use core::time::Duration;

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};

use crate::canvas::{Canvas, FontSize};
use crate::chart::bar::{draw_bar_chart, BarChart};
use crate::chart::mini::{draw_co2_mini_chart, draw_mini_line_chart};
use crate::color::Color;
use crate::history::ShortHistory;
use crate::sensor::Sample;
use crate::uc8179::{HEIGHT, WIDTH};

pub const PANEL_WIDTH: i32 = 216;
pub const PANEL_HEIGHT: i32 = 186;
const MINI_CHART_SIZE: Size = Size::new(180, 60);

/// Area cleared and redrawn by a chart-only refresh
pub const CHART_REGION: Rectangle = Rectangle::new(Point::new(0, 192), Size::new(WIDTH, 200));

pub const FOOTER_BASELINE: i32 = 440;

/// CO2 level bands shown under the CO2 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unhealthy,
}

impl AirQuality {
    pub fn classify(co2: u16) -> AirQuality {
        match co2 {
            0..=599 => AirQuality::Excellent,
            600..=799 => AirQuality::Good,
            800..=999 => AirQuality::Fair,
            1000..=1499 => AirQuality::Poor,
            _ => AirQuality::Unhealthy,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AirQuality::Excellent => "Excellent",
            AirQuality::Good => "Good",
            AirQuality::Fair => "Fair",
            AirQuality::Poor => "Poor - ventilate",
            AirQuality::Unhealthy => "Unhealthy!",
        }
    }
}

/// Everything a full screen shows, borrowed from the monitor loop for one render
#[derive(Debug, Clone, Copy)]
pub struct Readings<'a> {
    pub sample: Sample,
    pub co2_history: &'a [u16],
    /// Next slot to be written in `co2_history`
    pub write_index: usize,
    pub short_history: &'a ShortHistory,
    /// Time since boot, shown in the footer
    pub uptime: Duration,
}

fn panel_x(column: i32) -> i32 {
    column * PANEL_WIDTH
}

fn mini_chart_area(column: i32) -> Rectangle {
    let x = panel_x(column) + (PANEL_WIDTH - MINI_CHART_SIZE.width as i32) / 2;
    Rectangle::new(Point::new(x, 116), MINI_CHART_SIZE)
}

fn draw_panel_title(canvas: &mut Canvas, column: i32, title: &str) {
    canvas.set_font(FontSize::Small);
    canvas.set_color(Color::White);
    canvas.print_at(panel_x(column) + 10, 22, title);
}

fn draw_warning_badge(canvas: &mut Canvas) {
    let x = panel_x(1) - 40;
    canvas.fill_rect(x, 10, 30, 50, Color::White);
    canvas.set_font(FontSize::Medium);
    canvas.set_color(Color::Black);
    let inset = (30 - FontSize::Medium.advance()) / 2;
    canvas.print_at(x + inset, 45, "!");
    canvas.set_color(Color::White);
}

fn draw_co2_panel(canvas: &mut Canvas, readings: &Readings, threshold: u16) {
    let co2 = readings.sample.co2;
    draw_panel_title(canvas, 0, "CO2 (ppm)");

    canvas.set_font(FontSize::Large);
    canvas.set_cursor(panel_x(0) + 10, 70);
    canvas.print_int(i32::from(co2));

    canvas.set_font(FontSize::Small);
    canvas.print_at(panel_x(0) + 10, 98, AirQuality::classify(co2).message());

    if co2 >= threshold {
        draw_warning_badge(canvas);
    }

    draw_co2_mini_chart(
        canvas,
        mini_chart_area(0),
        readings.co2_history,
        readings.write_index,
    );
}

/// Temperature or humidity panel
#[derive(Debug, Clone, Copy)]
enum Series {
    Temperature,
    Humidity,
}

impl Series {
    fn column(self) -> i32 {
        match self {
            Series::Temperature => 1,
            Series::Humidity => 2,
        }
    }
}

fn draw_value_panel(canvas: &mut Canvas, readings: &Readings, series: Series) {
    let short = readings.short_history;
    let (title, unit, value, history, (min, max)) = match series {
        Series::Temperature => (
            "Temperature",
            " C",
            readings.sample.temperature,
            short.temperature(),
            short.temperature_range(),
        ),
        Series::Humidity => (
            "Humidity",
            " %",
            readings.sample.humidity,
            short.humidity(),
            short.humidity_range(),
        ),
    };
    let column = series.column();
    draw_panel_title(canvas, column, title);

    canvas.set_font(FontSize::Large);
    canvas.set_cursor(panel_x(column) + 10, 70);
    canvas.print_float(value, 1);
    canvas.set_font(FontSize::Medium);
    canvas.print(unit);

    draw_mini_line_chart(
        canvas,
        mini_chart_area(column),
        history,
        short.count(),
        short.index(),
        min,
        max,
    );
}

fn draw_footer(canvas: &mut Canvas, uptime: Duration, threshold: u16) {
    canvas.set_font(FontSize::Small);
    canvas.set_color(Color::White);
    canvas.print_at(
        20,
        FOOTER_BASELINE,
        &format!("Last update: {} min ago", uptime.as_secs() / 60),
    );

    let alarm = format!("Alarm at {} ppm", threshold);
    let x = WIDTH as i32 - 20 - FontSize::Small.text_width(&alarm);
    canvas.print_at(x, FOOTER_BASELINE, &alarm);
}

/// Full screen: value panels, history chart and footer, or the connection help
/// when the sensor is missing
pub fn compose_full(canvas: &mut Canvas, readings: &Readings, connected: bool, threshold: u16) {
    canvas.clear(Color::Black);

    if !connected {
        compose_connection_instructions(canvas);
        return;
    }

    draw_co2_panel(canvas, readings, threshold);
    draw_value_panel(canvas, readings, Series::Temperature);
    draw_value_panel(canvas, readings, Series::Humidity);

    // Panel separators
    canvas.vline(panel_x(1), 10, PANEL_HEIGHT - 20, Color::White);
    canvas.vline(panel_x(2), 10, PANEL_HEIGHT - 20, Color::White);
    canvas.hline(10, 188, WIDTH as i32 - 20, Color::White);

    draw_bar_chart(
        canvas,
        &BarChart::default(),
        readings.co2_history,
        readings.write_index,
        threshold,
    );
    draw_footer(canvas, readings.uptime, threshold);
}

/// Help screen shown while no sensor answers
pub fn compose_connection_instructions(canvas: &mut Canvas) {
    canvas.set_color(Color::White);
    canvas.set_font(FontSize::Medium);
    canvas.print_at(20, 60, "CO2 Sensor Not Connected");

    canvas.set_font(FontSize::Small);
    canvas.print_at(20, 100, "Please check:");
    canvas.print_at(30, 130, "1. Power connection to sensor");
    canvas.print_at(30, 160, "2. I2C wiring (SDA/SCL)");
    canvas.print_at(30, 190, "3. Sensor address (0x62)");
    canvas.print_at(20, 230, "The system will automatically");
    canvas.print_at(20, 260, "reconnect when sensor is available");
}

/// Redraw only [`CHART_REGION`], the rest of the frame is kept
pub fn compose_chart_only(canvas: &mut Canvas, history: &[u16], write_index: usize, threshold: u16) {
    let Rectangle { top_left, size } = CHART_REGION;
    canvas.fill_rect(
        top_left.x,
        top_left.y,
        size.width as i32,
        size.height as i32,
        Color::Black,
    );
    draw_bar_chart(canvas, &BarChart::default(), history, write_index, threshold);
}

/// Start-up screen shown while the sensor warms up
pub fn compose_loading(canvas: &mut Canvas) {
    canvas.clear(Color::Black);
    canvas.set_color(Color::White);

    let title = "CO2 Monitor";
    canvas.set_font(FontSize::Large);
    let x = (WIDTH as i32 - FontSize::Large.text_width(title)) / 2;
    canvas.print_at(x, HEIGHT as i32 / 2 - 20, title);

    let status = "Starting up, warming up sensor...";
    canvas.set_font(FontSize::Small);
    let x = (WIDTH as i32 - FontSize::Small.text_width(status)) / 2;
    canvas.print_at(x, HEIGHT as i32 / 2 + 20, status);
}
