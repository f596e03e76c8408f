//! Bus signal layer
//!
//! Maps the logical LPC signals onto [`DigitalIo`] pins. LFRAME# and RST#
//! are active low; the helpers here take "asserted" flags so callers never
//! deal with polarity.

use crate::gpio::{DigitalIo, Direction, Level, Pin};

/// Named bus lines on top of a digital I/O backend
pub(crate) struct BusLines<IO> {
    io: IO,
    /// Current direction of LAD[3:0]
    lad: Direction,
}

impl<IO: DigitalIo> BusLines<IO> {
    pub(crate) fn new(io: IO) -> Self {
        Self {
            io,
            lad: Direction::Input,
        }
    }

    pub(crate) fn io(&self) -> &IO {
        &self.io
    }

    pub(crate) fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub(crate) fn into_inner(self) -> IO {
        self.io
    }

    /// Current direction of the shared address/data lines
    #[cfg(test)]
    pub(crate) fn lad_direction(&self) -> Direction {
        self.lad
    }

    /// Drive every line to its idle level with RST# asserted
    ///
    /// Levels are written before the directions change so no line glitches
    /// high when it becomes an output.
    pub(crate) fn park(&mut self) {
        self.io.write_level(Pin::Reset, Level::Low);
        self.io.write_level(Pin::Clock, Level::Low);
        self.io.write_level(Pin::Frame, Level::High);
        self.io.write_level(Pin::WriteEnable, Level::Low);
        for pin in Pin::LAD {
            self.io.write_level(pin, Level::Low);
        }

        self.set_lines_input(false);
        self.io.set_directions(
            &[Pin::Reset, Pin::WriteEnable, Pin::Frame, Pin::Clock],
            Direction::Output,
        );
    }

    /// Switch LAD[3:0] to host-driven
    ///
    /// Always performs the switch, even if the lines are already outputs:
    /// every cycle boundary does a full direction handshake.
    pub(crate) fn set_lines_output(&mut self) {
        self.io.set_directions(&Pin::LAD, Direction::Output);
        self.lad = Direction::Output;
        log::trace!("LAD switched to output");
    }

    /// Release LAD[3:0] to the device
    ///
    /// With `zero_first` the lines are driven low right before the switch so
    /// they do not float high.
    pub(crate) fn set_lines_input(&mut self, zero_first: bool) {
        if zero_first {
            for pin in Pin::LAD {
                self.io.write_level(pin, Level::Low);
            }
        }
        self.io.set_directions(&Pin::LAD, Direction::Input);
        self.lad = Direction::Input;
        log::trace!("LAD switched to input");
    }

    /// Assert (drive low) or release (drive high) LFRAME#
    pub(crate) fn assert_frame(&mut self, active: bool) {
        self.io.write_level(Pin::Frame, Level::from(!active));
    }

    pub(crate) fn set_clock(&mut self, high: bool) {
        self.io.write_level(Pin::Clock, Level::from(high));
    }

    /// Drive the low 4 bits of `value` onto LAD[3:0], LAD0 = bit 0
    pub(crate) fn drive_nibble(&mut self, value: u8) {
        debug_assert_eq!(self.lad, Direction::Output, "LAD driven while input");
        for (bit, pin) in Pin::LAD.into_iter().enumerate() {
            self.io.write_level(pin, Level::from(value & (1 << bit) != 0));
        }
    }

    /// Sample LAD[3:0] into the low 4 bits of the result
    pub(crate) fn sample_nibble(&mut self) -> u8 {
        debug_assert_eq!(self.lad, Direction::Input, "LAD sampled while output");
        let mut value = 0u8;
        for (bit, pin) in Pin::LAD.into_iter().enumerate() {
            if self.io.read_level(pin).is_high() {
                value |= 1 << bit;
            }
        }
        value
    }

    /// Assert (drive low) or release (drive high) RST#
    pub(crate) fn set_reset(&mut self, asserted: bool) {
        self.io.write_level(Pin::Reset, Level::from(!asserted));
    }

    pub(crate) fn set_write_enable(&mut self, enabled: bool) {
        self.io.write_level(Pin::WriteEnable, Level::from(enabled));
    }
}
