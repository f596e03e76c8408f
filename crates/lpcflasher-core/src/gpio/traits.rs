//! Digital I/O trait definitions
//!
//! The bus engine only needs three primitives per pin: set its direction,
//! write its output level and read its input level. Backends report
//! hardware failures through the `log` facade rather than through return
//! values, since a bit-banged cycle cannot be abandoned half way.

/// A named logical pin of the LPC/FWH bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pin {
    /// RST# - chip reset, active low
    Reset = 0,
    /// LAD0 - address/data bit 0
    Lad0 = 1,
    /// LAD1 - address/data bit 1
    Lad1 = 2,
    /// LAD2 - address/data bit 2
    Lad2 = 3,
    /// LAD3 - address/data bit 3
    Lad3 = 4,
    /// LFRAME# - cycle framing, active low
    Frame = 5,
    /// LCLK - bus clock
    Clock = 6,
    /// WP#/write-enable - low keeps the chip write protected
    WriteEnable = 7,
}

impl Pin {
    /// Number of pins on the bus
    pub const COUNT: usize = 8;

    /// All pins, in index order
    pub const ALL: [Pin; Pin::COUNT] = [
        Pin::Reset,
        Pin::Lad0,
        Pin::Lad1,
        Pin::Lad2,
        Pin::Lad3,
        Pin::Frame,
        Pin::Clock,
        Pin::WriteEnable,
    ];

    /// The four shared address/data lines, LAD0 first
    pub const LAD: [Pin; 4] = [Pin::Lad0, Pin::Lad1, Pin::Lad2, Pin::Lad3];

    /// Index of this pin into per-pin tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short signal name as printed on schematics
    pub const fn name(self) -> &'static str {
        match self {
            Pin::Reset => "RST#",
            Pin::Lad0 => "LAD0",
            Pin::Lad1 => "LAD1",
            Pin::Lad2 => "LAD2",
            Pin::Lad3 => "LAD3",
            Pin::Frame => "LFRAME#",
            Pin::Clock => "LCLK",
            Pin::WriteEnable => "WP#",
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Pin is sampled by the host
    Input,
    /// Pin is driven by the host
    Output,
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Returns true for `High`
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital I/O capability consumed by the bus engine
///
/// Implementations must have sub-microsecond latency relative to the
/// protocol delays; they are called several times per clock edge.
///
/// Writing the level of a pin that is currently an input must not fail:
/// the level is latched and takes effect once the pin becomes an output,
/// like the output latch of most GPIO controllers.
pub trait DigitalIo {
    /// Set the direction of a single pin
    fn set_direction(&mut self, pin: Pin, direction: Direction);

    /// Drive a pin to the given level
    fn write_level(&mut self, pin: Pin, level: Level);

    /// Sample the current level of a pin
    fn read_level(&mut self, pin: Pin) -> Level;

    /// Optional: Set the direction of several pins at once (optimization)
    ///
    /// Default implementation calls `set_direction` for every pin in order.
    fn set_directions(&mut self, pins: &[Pin], direction: Direction) {
        for &pin in pins {
            self.set_direction(pin, direction);
        }
    }
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn set_direction(&mut self, pin: Pin, direction: Direction) {
        (**self).set_direction(pin, direction)
    }

    fn write_level(&mut self, pin: Pin, level: Level) {
        (**self).write_level(pin, level)
    }

    fn read_level(&mut self, pin: Pin) -> Level {
        (**self).read_level(pin)
    }

    fn set_directions(&mut self, pins: &[Pin], direction: Direction) {
        (**self).set_directions(pins, direction)
    }
}

// Blanket impl for boxed backends so the CLI can pick one at runtime
#[cfg(feature = "alloc")]
impl<T: DigitalIo + ?Sized> DigitalIo for alloc::boxed::Box<T> {
    fn set_direction(&mut self, pin: Pin, direction: Direction) {
        (**self).set_direction(pin, direction)
    }

    fn write_level(&mut self, pin: Pin, level: Level) {
        (**self).write_level(pin, level)
    }

    fn read_level(&mut self, pin: Pin) -> Level {
        (**self).read_level(pin)
    }

    fn set_directions(&mut self, pins: &[Pin], direction: Direction) {
        (**self).set_directions(pins, direction)
    }
}
