//! LPC/FWH bus engine
//!
//! [`LpcBus`] is the bus context object: it owns the digital I/O backend,
//! the delay provider and the bus configuration, and every bus operation
//! borrows it mutably. The layers below it are
//!
//! - `lines` - named bus lines and direction switching
//! - `nibble` - clocked single-nibble write and read
//! - [`cycle`] - memory read and memory write cycles
//!
//! ## Usage
//!
//! ```ignore
//! let mut bus = LpcBus::new(io, StdDelay, BusConfig::default());
//! bus.prepare();
//!
//! let mut id = [0u8; 1];
//! bus.read_cycle(0xFFBC_0000, &mut id)?;
//! ```

pub mod cycle;
mod lines;
mod nibble;

use core::fmt;

use crate::gpio::DigitalIo;
use crate::timing::{Delay, Timings};

pub use cycle::{msize, TurnaroundWarning, MAX_BLOCK_LEN};
use lines::BusLines;

/// Kind of LPC memory cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusCycleKind {
    /// Memory read (START nibble `0xD`)
    MemoryRead,
    /// Memory write (START nibble `0xE`)
    MemoryWrite,
}

impl BusCycleKind {
    /// START nibble sent with LFRAME# asserted
    pub const fn start_code(self) -> u8 {
        match self {
            BusCycleKind::MemoryRead => 0xD,
            BusCycleKind::MemoryWrite => 0xE,
        }
    }
}

impl fmt::Display for BusCycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusCycleKind::MemoryRead => write!(f, "memory read"),
            BusCycleKind::MemoryWrite => write!(f, "memory write"),
        }
    }
}

/// Bus configuration carried by the bus context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusConfig {
    /// Protocol delays
    pub timings: Timings,
    /// Diagnostic mode: a bad RSYNC on a read cycle is logged instead of
    /// aborting the cycle
    pub diagnostic: bool,
}

impl BusConfig {
    /// Replace the timing table
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Enable or disable diagnostic mode
    pub fn with_diagnostic(mut self, diagnostic: bool) -> Self {
        self.diagnostic = diagnostic;
        self
    }
}

/// Bus context: exclusive owner of the bus lines
///
/// The context is not `Sync` in any useful sense: direction and level
/// changes are not atomic with respect to each other, so all operations
/// take `&mut self` and run to completion before returning.
pub struct LpcBus<IO, D> {
    lines: BusLines<IO>,
    delay: D,
    config: BusConfig,
}

impl<IO: DigitalIo, D: Delay> LpcBus<IO, D> {
    /// Create a bus context around an I/O backend and a delay provider
    ///
    /// No pin is touched until [`prepare`](Self::prepare) is called.
    pub fn new(io: IO, delay: D, config: BusConfig) -> Self {
        Self {
            lines: BusLines::new(io),
            delay,
            config,
        }
    }

    /// Get the bus configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Enable or disable diagnostic mode
    pub fn set_diagnostic(&mut self, diagnostic: bool) {
        self.config.diagnostic = diagnostic;
    }

    /// Get a reference to the I/O backend
    pub fn io(&self) -> &IO {
        self.lines.io()
    }

    /// Get a mutable reference to the I/O backend
    pub fn io_mut(&mut self) -> &mut IO {
        self.lines.io_mut()
    }

    /// Consume the context and return the I/O backend and delay provider
    pub fn into_inner(self) -> (IO, D) {
        (self.lines.into_inner(), self.delay)
    }

    /// Bring all pins into a known state and pulse the chip reset
    ///
    /// Also the recovery procedure after a [`SyncError`](crate::Error::SyncError):
    /// the device must be reset before any further cycle is trusted.
    pub fn prepare(&mut self) {
        log::debug!("Preparing bus pins");
        self.lines.park();
        self.delay_us(self.config.timings.reset_assert_us);
        self.lines.set_reset(false);
        self.delay_us(self.config.timings.reset_recovery_us);
        log::debug!("Bus prepared, reset released");
    }

    /// Drive the write-enable line
    ///
    /// The chip ignores program commands while this line is low.
    pub fn set_write_enable(&mut self, enabled: bool) {
        log::debug!(
            "Write enable {}",
            if enabled { "raised" } else { "lowered" }
        );
        self.lines.set_write_enable(enabled);
    }

    /// Block for the given number of microseconds using the delay provider
    pub fn delay_us(&mut self, us: u32) {
        if us > 0 {
            self.delay.delay_us(us);
        }
    }
}
