//! Linux GPIO LPC bus device implementation
//!
//! This module provides the `LinuxGpioLpc` struct that implements the
//! `DigitalIo` trait using Linux's GPIO character device interface
//! (gpiocdev). All eight bus lines are held in a single line request;
//! direction changes reconfigure the whole request.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use lpcflasher_core::gpio::{DigitalIo, Direction, Level, Pin};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "lpcflasher";

/// Reference Raspberry Pi wiring (BCM numbering, header pin in comments)
const DEFAULT_RESET: Offset = 17; // hd 11
const DEFAULT_LAD: [Offset; 4] = [22, 23, 24, 25]; // hd 15, 16, 18, 22
const DEFAULT_FRAME: Offset = 27; // hd 13
const DEFAULT_CLOCK: Offset = 18; // hd 12
const DEFAULT_WRITE_ENABLE: Offset = 4; // hd 7

/// Configuration for opening a Linux GPIO LPC bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxGpioLpcConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// RST# line offset
    pub reset: Offset,
    /// LAD[3:0] line offsets, LAD0 first
    pub lad: [Offset; 4],
    /// LFRAME# line offset
    pub frame: Offset,
    /// LCLK line offset
    pub clock: Offset,
    /// Write-enable (WP#) line offset
    pub write_enable: Offset,
}

impl Default for LinuxGpioLpcConfig {
    fn default() -> Self {
        Self {
            device: "/dev/gpiochip0".to_string(),
            reset: DEFAULT_RESET,
            lad: DEFAULT_LAD,
            frame: DEFAULT_FRAME,
            clock: DEFAULT_CLOCK,
            write_enable: DEFAULT_WRITE_ENABLE,
        }
    }
}

impl LinuxGpioLpcConfig {
    /// Create a configuration with the default wiring on the given chip
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Line offset for a bus pin
    pub fn offset(&self, pin: Pin) -> Offset {
        match pin {
            Pin::Reset => self.reset,
            Pin::Lad0 => self.lad[0],
            Pin::Lad1 => self.lad[1],
            Pin::Lad2 => self.lad[2],
            Pin::Lad3 => self.lad[3],
            Pin::Frame => self.frame,
            Pin::Clock => self.clock,
            Pin::WriteEnable => self.write_enable,
        }
    }

    /// Check that a device is set and every pin has its own line
    pub fn validate(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }
        for (i, &first) in Pin::ALL.iter().enumerate() {
            for &second in &Pin::ALL[i + 1..] {
                if self.offset(first) == self.offset(second) {
                    return Err(LinuxGpioError::DuplicateLine {
                        first: first.name(),
                        second: second.name(),
                        offset: self.offset(first),
                    });
                }
            }
        }
        Ok(())
    }
}

fn to_value(level: Level) -> Value {
    if level.is_high() {
        Value::Active
    } else {
        Value::Inactive
    }
}

/// LPC bus lines on a Linux GPIO chip
///
/// Levels written to a line that is currently an input are latched and
/// applied when the line becomes an output.
pub struct LinuxGpioLpc {
    /// GPIO line request handle
    request: Request,
    /// Line offsets indexed by `Pin::index`
    offsets: [Offset; Pin::COUNT],
    /// Current direction per pin
    directions: [Direction; Pin::COUNT],
    /// Output latch per pin
    levels: [Level; Pin::COUNT],
}

impl LinuxGpioLpc {
    /// Open the GPIO chip and request all bus lines as inputs
    ///
    /// Nothing is driven until the bus is prepared.
    pub fn open(config: &LinuxGpioLpcConfig) -> Result<Self> {
        config.validate()?;

        log::debug!("linux_gpio: Opening device {}", config.device);

        let offsets = Pin::ALL.map(|pin| config.offset(pin));
        let directions = [Direction::Input; Pin::COUNT];
        let levels = [Level::Low; Pin::COUNT];

        let req_config = build_config(&offsets, &directions, &levels);
        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: config.device.clone(),
                source,
            })?;

        log::info!(
            "linux_gpio: Opened {} (rst={}, lad={:?}, lframe={}, lclk={}, wr={})",
            config.device,
            config.reset,
            config.lad,
            config.frame,
            config.clock,
            config.write_enable
        );

        Ok(Self {
            request,
            offsets,
            directions,
            levels,
        })
    }

    fn reconfigure(&mut self) {
        let cfg = build_config(&self.offsets, &self.directions, &self.levels);
        if let Err(e) = self.request.reconfigure(&cfg) {
            log::error!("Failed to reconfigure GPIO lines: {}", e);
        }
    }
}

/// Line configuration for the full request
///
/// Outputs start at their latched level so a direction switch never
/// glitches.
fn build_config(
    offsets: &[Offset; Pin::COUNT],
    directions: &[Direction; Pin::COUNT],
    levels: &[Level; Pin::COUNT],
) -> Config {
    let mut cfg = Config::default();
    for pin in Pin::ALL {
        let i = pin.index();
        match directions[i] {
            Direction::Output => {
                cfg.with_line(offsets[i]).as_output(to_value(levels[i]));
            }
            Direction::Input => {
                cfg.with_line(offsets[i]).as_input();
            }
        }
    }
    cfg
}

impl DigitalIo for LinuxGpioLpc {
    fn set_direction(&mut self, pin: Pin, direction: Direction) {
        self.set_directions(&[pin], direction);
    }

    fn set_directions(&mut self, pins: &[Pin], direction: Direction) {
        for &pin in pins {
            self.directions[pin.index()] = direction;
        }
        self.reconfigure();
    }

    fn write_level(&mut self, pin: Pin, level: Level) {
        let i = pin.index();
        self.levels[i] = level;
        if self.directions[i] == Direction::Output {
            if let Err(e) = self.request.set_value(self.offsets[i], to_value(level)) {
                log::error!("Failed to set {}: {}", pin.name(), e);
            }
        }
    }

    fn read_level(&mut self, pin: Pin) -> Level {
        let i = pin.index();
        if self.directions[i] == Direction::Output {
            return self.levels[i];
        }
        match self.request.value(self.offsets[i]) {
            Ok(Value::Active) => Level::High,
            Ok(Value::Inactive) => Level::Low,
            Err(e) => {
                log::error!("Failed to get {}: {}", pin.name(), e);
                Level::Low
            }
        }
    }
}

fn parse_line(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidLineNumber {
            name,
            value: value.to_string(),
        })
}

/// Parse programmer options from a list of key-value pairs
///
/// Every option is optional; anything not given keeps the reference
/// Raspberry Pi wiring on `/dev/gpiochip0`.
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `rst=N` - RST# line offset
/// - `lad0=N` .. `lad3=N` - LAD[3:0] line offsets
/// - `lframe=N` - LFRAME# line offset
/// - `lclk=N` - LCLK line offset
/// - `wr=N` - write-enable line offset
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioLpcConfig> {
    let mut config = LinuxGpioLpcConfig::default();
    let mut device: Option<String> = None;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => device = Some(value.to_string()),
            "gpiochip" => {
                gpiochip = Some(value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("gpiochip={}", value))
                })?);
            }
            "rst" => config.reset = parse_line("rst", value)?,
            "lad0" => config.lad[0] = parse_line("lad0", value)?,
            "lad1" => config.lad[1] = parse_line("lad1", value)?,
            "lad2" => config.lad[2] = parse_line("lad2", value)?,
            "lad3" => config.lad[3] = parse_line("lad3", value)?,
            "lframe" => config.frame = parse_line("lframe", value)?,
            "lclk" => config.clock = parse_line("lclk", value)?,
            "wr" => config.write_enable = parse_line("wr", value)?,
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    match (device, gpiochip) {
        (Some(_), Some(_)) => return Err(LinuxGpioError::ConflictingDevice),
        (Some(dev), None) => config.device = dev,
        (None, Some(n)) if n > 9 => return Err(LinuxGpioError::GpiochipOutOfRange(n)),
        (None, Some(n)) => config.device = format!("/dev/gpiochip{}", n),
        (None, None) => {}
    }

    config.validate()?;
    Ok(config)
}
