//! Firmware entry point
//!
//! Wires the display engine and the SCD4x to the ESP32 peripherals and runs the
//! monitor loop. Built for any other target it only reports that and exits.

#[cfg(target_os = "espidf")]
mod firmware {
    use std::time::{Duration, Instant};

    use anyhow::Context;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{InputPin, OutputPin};
    use embedded_hal::spi::SpiDevice;

    use co2_epaper_monitor::config::EngineConfig;
    use co2_epaper_monitor::engine::DisplayEngine;
    use co2_epaper_monitor::history::{Co2History, ShortHistory};
    use co2_epaper_monitor::layout::Readings;
    use co2_epaper_monitor::monitor::{AlarmState, BuzzerAction, MonitorConfig, Schedule};
    use co2_epaper_monitor::scd4x::Scd4x;
    use co2_epaper_monitor::sensor::Co2Sensor;
    use co2_epaper_monitor::uc8179::pins::Pins;

    use esp_idf_svc::hal::delay::Delay;
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::i2c;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::hal::spi;

    /// Seconds the SCD4x needs before its first measurement is trustworthy
    const SENSOR_WARM_UP_S: u32 = 15;
    const LOOP_DELAY_MS: u32 = 1000;

    fn millis(boot: Instant) -> u64 {
        boot.elapsed().as_millis() as u64
    }

    fn warm_up(delay: &mut Delay) {
        log::info!("Waiting for sensor to initialize ({} seconds)...", SENSOR_WARM_UP_S);
        for _ in 0..SENSOR_WARM_UP_S {
            DelayNs::delay_ms(delay, 1000);
        }
    }

    /// Full redraw, panel errors are logged and the loop carries on
    fn show<SPI, BSY, DC, RST, DELAY, S>(
        engine: &mut DisplayEngine<SPI, BSY, DC, RST, DELAY>,
        sensor: &S,
        history: &Co2History,
        short: &ShortHistory,
        uptime: Duration,
    ) where
        SPI: SpiDevice,
        BSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
        DELAY: DelayNs,
        S: Co2Sensor,
    {
        let readings = Readings {
            sample: sensor.sample(),
            co2_history: history.slots(),
            write_index: history.write_index(),
            short_history: short,
            uptime,
        };
        match engine.render_full(&readings, sensor.is_connected()) {
            Ok(report) if !report.confirmed() => {
                log::warn!("Display refresh was not confirmed: {:?}", report.busy)
            }
            Ok(_) => log::info!("Full display update completed"),
            Err(e) => log::error!("Display update failed: {:?}", e),
        }
    }

    fn set_buzzer<P: OutputPin>(buzzer: &mut P, action: BuzzerAction) {
        let result = match action {
            BuzzerAction::On => buzzer.set_high(),
            BuzzerAction::Off => buzzer.set_low(),
        };
        if let Err(e) = result {
            log::error!("Failed to switch buzzer {:?}: {:?}", action, e);
        }
    }

    pub fn run() -> anyhow::Result<()> {
        // It is necessary to call this function once. Otherwise some patches to the runtime
        // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
        esp_idf_svc::sys::link_patches();

        // Bind the log crate to the ESP Logging facilities
        esp_idf_svc::log::EspLogger::initialize_default();

        log::info!("=== Starting CO2 Monitor with SCD40 sensor ===");
        let boot = Instant::now();
        let engine_config = EngineConfig::default();
        let monitor_config = MonitorConfig {
            alarm_threshold: engine_config.alarm_threshold,
            ..MonitorConfig::default()
        };

        let peripherals = Peripherals::take().context("could not take peripherals")?;
        let pins = peripherals.pins;

        let mut buzzer = gpio::PinDriver::output(pins.gpio25)?; // Pins::BUZZER
        buzzer.set_low()?;
        log::info!("Buzzer pin {} initialized", Pins::BUZZER);

        log::info!(
            "Configuring SPI (SCK {}, MOSI {}, CS {})",
            Pins::SCK,
            Pins::MOSI,
            Pins::CS
        );
        let spi = spi::SpiDeviceDriver::new_single(
            peripherals.spi2,
            pins.gpio18,                    // SCK - Pins::SCK
            pins.gpio23,                    // MOSI - Pins::MOSI
            Option::<gpio::AnyIOPin>::None, // No MISO needed for display
            Some(pins.gpio5),               // CS - Pins::CS
            &spi::SpiDriverConfig::new(),
            &spi::SpiConfig::new().baudrate(4.MHz().into()),
        )
        .context("could not create SPI device driver")?;

        log::info!("Configuring I2C (SDA {}, SCL {})", Pins::SDA, Pins::SCL);
        let i2c = i2c::I2cDriver::new(
            peripherals.i2c0,
            pins.gpio21, // Pins::SDA
            pins.gpio22, // Pins::SCL
            &i2c::config::Config::new().baudrate(100.kHz().into()),
        )
        .context("could not create I2C driver")?;

        let mut delay = Delay::default();

        let mut engine = DisplayEngine::new(
            spi,
            gpio::PinDriver::input(pins.gpio4)?,  // Pins::BSY
            gpio::PinDriver::output(pins.gpio17)?, // Pins::DC
            gpio::PinDriver::output(pins.gpio16)?, // Pins::RST
            Delay::default(),
            engine_config,
        )?;

        if let Err(e) = engine.begin() {
            log::error!("Display initialization failed: {:?}", e);
            // Nothing to show it on, beep instead
            loop {
                set_buzzer(&mut buzzer, BuzzerAction::On);
                DelayNs::delay_ms(&mut delay, 200);
                set_buzzer(&mut buzzer, BuzzerAction::Off);
                DelayNs::delay_ms(&mut delay, 200);
            }
        }

        if let Err(e) = engine.show_loading_screen() {
            log::error!("Failed to show loading screen: {:?}", e);
        }

        let mut sensor = Scd4x::new(i2c, Delay::default());
        match sensor.begin() {
            Ok(()) => warm_up(&mut delay),
            Err(e) => log::error!("Failed to connect to SCD4x sensor: {:?}", e),
        }
        log::info!(
            "Sensor initialization complete. Connected: {}",
            if sensor.is_connected() { "YES" } else { "NO" }
        );

        let mut history = Co2History::new(engine_config.history_capacity);
        let mut short = ShortHistory::seeded(&sensor.sample());

        show(&mut engine, &sensor, &history, &short, boot.elapsed());
        let mut schedule = Schedule::new(monitor_config, millis(boot), sensor.sample());
        let mut alarm = AlarmState::new(&monitor_config);
        log::info!("Setup complete");

        loop {
            let now = millis(boot);

            if schedule.sample_due(now) {
                log::info!("=== Updating sensor data ===");
                if !sensor.is_connected() {
                    log::info!("Sensor not connected, attempting to reconnect...");
                    match sensor.reset() {
                        Ok(()) => warm_up(&mut delay),
                        Err(e) => log::warn!("Failed to reconnect CO2 sensor: {:?}", e),
                    }
                }

                let updated = if sensor.is_connected() {
                    sensor.update().unwrap_or_else(|e| {
                        log::warn!("Sensor update failed: {:?}", e);
                        false
                    })
                } else {
                    false
                };

                if sensor.is_connected() {
                    if let Some(action) = alarm.check(now, sensor.sample().co2) {
                        set_buzzer(&mut buzzer, action);
                    }
                }

                if schedule.on_sampled(now, &sensor, updated) {
                    show(&mut engine, &sensor, &history, &short, boot.elapsed());
                }
            }

            if schedule.history_due(now, &sensor) {
                let sample = sensor.sample();
                history.push(sample.co2);
                short.push(&sample);
                log::info!("Updated CO2 history, next index {}", history.write_index());

                show(&mut engine, &sensor, &history, &short, boot.elapsed());
                schedule.on_history_recorded(now, sample);
            }

            if schedule.refresh_due(now) {
                log::info!("Periodic full refresh");
                show(&mut engine, &sensor, &history, &short, boot.elapsed());
                schedule.mark_refreshed(now, sensor.sample());
            }

            if let Some(action) = alarm.expire(now) {
                set_buzzer(&mut buzzer, action);
            }

            DelayNs::delay_ms(&mut delay, LOOP_DELAY_MS);
        }
    }
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "co2-epaper-monitor is ESP32 firmware; build it for an ESP-IDF target \
         (e.g. xtensa-esp32-espidf). The display engine is available as a library."
    );
}
