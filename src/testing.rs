//! Recording mocks for the embedded-hal traits used by the panel interface

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c};
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::scd4x::crc8;

use crate::uc8179::interface::DisplayInterface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Dc(bool),
    Rst(bool),
    Write(Vec<u8>),
}

/// A byte as the panel sees it, after applying the DC line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Command(u8),
    Data(u8),
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<BusEvent>,
    delay_ms: u64,
    pause_us: u64,
    busy_reads: u32,
    spi_fails: bool,
}

/// Shared event log, cloned into every mock peripheral
#[derive(Debug, Clone, Default)]
pub struct BusLog(Rc<RefCell<LogInner>>);

impl BusLog {
    pub fn events(&self) -> Vec<BusEvent> {
        self.0.borrow().events.clone()
    }

    pub fn delay_ms_total(&self) -> u64 {
        self.0.borrow().delay_ms
    }

    pub fn pause_us_total(&self) -> u64 {
        self.0.borrow().pause_us
    }

    pub fn busy_reads(&self) -> u32 {
        self.0.borrow().busy_reads
    }

    pub fn clear(&self) {
        let mut inner = self.0.borrow_mut();
        inner.events.clear();
        inner.delay_ms = 0;
        inner.pause_us = 0;
        inner.busy_reads = 0;
    }

    /// Make every following SPI transaction fail
    pub fn fail_spi(&self, fail: bool) {
        self.0.borrow_mut().spi_fails = fail;
    }

    pub fn wire(&self) -> Vec<Wire> {
        decode_bus(&self.events())
    }

    fn push(&self, event: BusEvent) {
        self.0.borrow_mut().events.push(event);
    }
}

/// Turn the raw event log into command/data bytes
pub fn decode_bus(events: &[BusEvent]) -> Vec<Wire> {
    let mut dc_high = false;
    let mut out = Vec::new();
    for event in events {
        match event {
            BusEvent::Dc(level) => dc_high = *level,
            BusEvent::Write(bytes) => {
                out.extend(bytes.iter().map(|b| {
                    if dc_high {
                        Wire::Data(*b)
                    } else {
                        Wire::Command(*b)
                    }
                }));
            }
            BusEvent::Rst(_) => {}
        }
    }
    out
}

/// Group decoded bytes into (command, data) pairs
pub fn command_pairs(wire: &[Wire]) -> Vec<(u8, Vec<u8>)> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    for w in wire {
        match w {
            Wire::Command(c) => out.push((*c, Vec::new())),
            Wire::Data(d) => {
                if let Some(last) = out.last_mut() {
                    last.1.push(*d);
                }
            }
        }
    }
    out
}

pub struct MockSpi(BusLog);

impl spi::ErrorType for MockSpi {
    type Error = spi::ErrorKind;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), spi::ErrorKind> {
        if self.0 .0.borrow().spi_fails {
            return Err(spi::ErrorKind::Other);
        }
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                self.0.push(BusEvent::Write(bytes.to_vec()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PinRole {
    Dc,
    Rst,
}

pub struct MockPin {
    log: BusLog,
    role: PinRole,
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.push(match self.role {
            PinRole::Dc => BusEvent::Dc(false),
            PinRole::Rst => BusEvent::Rst(false),
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.push(match self.role {
            PinRole::Dc => BusEvent::Dc(true),
            PinRole::Rst => BusEvent::Rst(true),
        });
        Ok(())
    }
}

/// BUSY pin: `Some(n)` reads high `n` times before every low, `None` is stuck high
pub struct MockBusy {
    log: BusLog,
    busy_for: Option<u32>,
    streak: u32,
}

impl digital::ErrorType for MockBusy {
    type Error = Infallible;
}

impl InputPin for MockBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.log.0.borrow_mut().busy_reads += 1;
        match self.busy_for {
            None => Ok(true),
            Some(n) if self.streak < n => {
                self.streak += 1;
                Ok(true)
            }
            Some(_) => {
                self.streak = 0;
                Ok(false)
            }
        }
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// BUSY pin whose reads always fail
pub struct BrokenBusy;

impl digital::ErrorType for BrokenBusy {
    type Error = digital::ErrorKind;
}

impl InputPin for BrokenBusy {
    fn is_high(&mut self) -> Result<bool, digital::ErrorKind> {
        Err(digital::ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, digital::ErrorKind> {
        Err(digital::ErrorKind::Other)
    }
}

pub struct MockDelay(BusLog);

impl MockDelay {
    pub fn new(log: &BusLog) -> Self {
        MockDelay(log.clone())
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, us: u32) {
        self.0 .0.borrow_mut().pause_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0 .0.borrow_mut().delay_ms += u64::from(ms);
    }
}

pub type MockInterface = DisplayInterface<MockSpi, MockBusy, MockPin, MockPin, MockDelay>;

pub fn mock_parts(
    log: &BusLog,
    busy_for: Option<u32>,
) -> (MockSpi, MockBusy, MockPin, MockPin, MockDelay) {
    (
        MockSpi(log.clone()),
        MockBusy {
            log: log.clone(),
            busy_for,
            streak: 0,
        },
        MockPin {
            log: log.clone(),
            role: PinRole::Dc,
        },
        MockPin {
            log: log.clone(),
            role: PinRole::Rst,
        },
        MockDelay(log.clone()),
    )
}

pub fn mock_interface(log: &BusLog, busy_for: Option<u32>) -> MockInterface {
    let (spi, busy, dc, rst, delay) = mock_parts(log, busy_for);
    DisplayInterface::new(spi, busy, dc, rst, delay)
}

#[derive(Debug, Default)]
struct I2cInner {
    writes: Vec<(u8, Vec<u8>)>,
    reads: VecDeque<Vec<u8>>,
    failing: bool,
    present: Vec<u8>,
}

/// Scripted I2C bus: queued read responses, recorded writes
#[derive(Debug, Clone, Default)]
pub struct I2cScript(Rc<RefCell<I2cInner>>);

impl I2cScript {
    /// Queue raw bytes for the next read
    pub fn respond(&self, bytes: &[u8]) {
        self.0.borrow_mut().reads.push_back(bytes.to_vec());
    }

    /// Queue big-endian words, each followed by its CRC
    pub fn respond_words(&self, words: &[u16]) {
        let mut bytes = Vec::with_capacity(words.len() * 3);
        for word in words {
            let pair = word.to_be_bytes();
            bytes.extend_from_slice(&pair);
            bytes.push(crc8(&pair));
        }
        self.respond(&bytes);
    }

    /// Make every following transfer fail
    pub fn fail(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    /// Addresses that acknowledge an empty probe write
    pub fn present(&self, addresses: &[u8]) {
        self.0.borrow_mut().present = addresses.to_vec();
    }

    /// 16-bit commands written so far
    pub fn commands(&self) -> Vec<u16> {
        self.0
            .borrow()
            .writes
            .iter()
            .filter(|(_, bytes)| bytes.len() >= 2)
            .map(|(_, bytes)| u16::from_be_bytes([bytes[0], bytes[1]]))
            .collect()
    }

    pub fn addresses(&self) -> Vec<u8> {
        self.0.borrow().writes.iter().map(|(addr, _)| *addr).collect()
    }

    pub fn clear(&self) {
        let mut inner = self.0.borrow_mut();
        inner.writes.clear();
        inner.reads.clear();
    }

    pub fn bus(&self) -> MockI2c {
        MockI2c(self.clone())
    }
}

pub struct MockI2c(I2cScript);

impl i2c::ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), ErrorKind> {
        let mut inner = self.0 .0.borrow_mut();
        if inner.failing {
            return Err(ErrorKind::Bus);
        }
        if let [i2c::Operation::Write(bytes)] = operations {
            if bytes.is_empty() {
                return if inner.present.contains(&address) {
                    Ok(())
                } else {
                    Err(ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address))
                };
            }
        }
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => inner.writes.push((address, bytes.to_vec())),
                i2c::Operation::Read(buf) => {
                    let Some(response) = inner.reads.pop_front() else {
                        return Err(ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address));
                    };
                    let n = buf.len().min(response.len());
                    buf[..n].copy_from_slice(&response[..n]);
                }
            }
        }
        Ok(())
    }
}
