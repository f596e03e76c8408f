//! Nibble transport
//!
//! One nibble is one LCLK period. Both operations block for two settle
//! delays and never fail.

use super::LpcBus;
use crate::gpio::DigitalIo;
use crate::timing::Delay;

impl<IO: DigitalIo, D: Delay> LpcBus<IO, D> {
    /// Clock one host-driven nibble onto LAD[3:0]
    ///
    /// The clock is raised *before* the nibble is driven. The device latches
    /// on the rising edge and the host cannot produce a pulse shorter than
    /// the settle time, so reversing the order shifts the whole stream by
    /// one nibble.
    pub(crate) fn write_nibble(&mut self, value: u8, frame_start: bool) {
        let settle = self.config.timings.settle_us;

        self.lines.set_clock(true);
        self.lines.drive_nibble(value);
        self.lines.assert_frame(frame_start);
        self.delay_us(settle);
        self.lines.set_clock(false);
        self.delay_us(settle);

        log::trace!(
            "wrote nibble 0x{:X}{}",
            value & 0xF,
            if frame_start { " (LFRAME#)" } else { "" }
        );
    }

    /// Clock one device-driven nibble off LAD[3:0]
    pub(crate) fn read_nibble(&mut self) -> u8 {
        let settle = self.config.timings.settle_us;

        self.delay_us(settle);
        self.lines.set_clock(true);
        self.delay_us(settle);
        let value = self.lines.sample_nibble();
        self.lines.set_clock(false);

        log::trace!("read nibble 0x{:X}", value);
        value
    }
}
