//! Memory read and memory write bus cycles
//!
//! Host-driven phase of both cycles:
//!
//! ```text
//! START | IDSEL | ADDR x7 | MSIZE | [DATA lo,hi]... | TAR0
//! ```
//!
//! after which LAD is released and the device answers with
//!
//! ```text
//! TAR1 | RSYNC | [DATA lo,hi]... | TAR | (regain)
//! ```
//!
//! Data bytes travel low nibble first.

use super::{BusCycleKind, LpcBus};
use crate::error::{Error, Result, SyncPhase};
use crate::gpio::DigitalIo;
use crate::timing::Delay;

/// IDSEL nibble; the chip's ID pins are strapped low
pub const IDSEL: u8 = 0x0;
/// Turnaround nibble
pub const TAR: u8 = 0xF;
/// RSYNC value signalling "ready, no wait states"
pub const SYNC_READY: u8 = 0x0;
/// Number of address nibbles sent after IDSEL
pub const ADDRESS_NIBBLES: u32 = 7;
/// Largest block a single read cycle can transfer
pub const MAX_BLOCK_LEN: usize = 128;

/// Non-fatal trailing turnaround mismatch on a read cycle
///
/// The device only drives the bus for a few nanoseconds during this
/// nibble, so the sampled value depends on bus capacitance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnaroundWarning {
    /// Address of the read cycle
    pub addr: u32,
    /// Sampled turnaround nibble
    pub nibble: u8,
}

/// MSIZE nibble for a transfer of `len` bytes
///
/// Reads accept 1, 2, 4, 16 and 128 bytes; writes accept 1, 2 and 4.
pub fn msize(kind: BusCycleKind, len: usize) -> Result<u8> {
    match (kind, len) {
        (_, 1) => Ok(0x0),
        (_, 2) => Ok(0x1),
        (_, 4) => Ok(0x2),
        (BusCycleKind::MemoryRead, 16) => Ok(0x4),
        (BusCycleKind::MemoryRead, 128) => Ok(0x7),
        _ => Err(Error::BadBlockLength { kind, len }),
    }
}

/// Combine two data nibbles, low nibble received first
#[inline]
pub const fn combine_nibbles(low: u8, high: u8) -> u8 {
    ((high & 0xF) << 4) | (low & 0xF)
}

impl<IO: DigitalIo, D: Delay> LpcBus<IO, D> {
    /// Run one memory read cycle, filling `buf`
    ///
    /// `buf.len()` selects the block length. A bad RSYNC aborts with
    /// [`Error::SyncError`] unless diagnostic mode is on. A bad trailing
    /// turnaround is returned as a [`TurnaroundWarning`].
    pub fn read_cycle(&mut self, addr: u32, buf: &mut [u8]) -> Result<Option<TurnaroundWarning>> {
        let size = msize(BusCycleKind::MemoryRead, buf.len())?;
        log::trace!("read cycle: addr=0x{:08X} len={}", addr, buf.len());

        self.lines.set_lines_output();
        self.write_header(BusCycleKind::MemoryRead, addr, size);
        self.write_nibble(TAR, false);
        self.lines.set_lines_input(true);

        // TAR1: the bus floats to 1111, do not sample
        let gap = self.config.timings.tar_gap_us;
        self.delay_us(gap);
        self.read_nibble();
        self.delay_us(gap);

        let sync = self.read_nibble();
        if sync != SYNC_READY {
            let err = Error::SyncError {
                addr,
                phase: SyncPhase::Rsync,
                nibble: sync,
            };
            if !self.config.diagnostic {
                return Err(err);
            }
            log::warn!("{} (diagnostic mode, continuing)", err);
        }

        for byte in buf.iter_mut() {
            let low = self.read_nibble();
            let high = self.read_nibble();
            *byte = combine_nibbles(low, high);
        }

        let tar = self.read_nibble();
        // Regain control of the bus
        self.read_nibble();

        if tar != TAR {
            return Ok(Some(TurnaroundWarning { addr, nibble: tar }));
        }
        Ok(None)
    }

    /// Run one memory write cycle carrying `data`
    ///
    /// Both RSYNC and the trailing turnaround must match; a failed write
    /// cannot be confirmed any other way.
    pub fn write_cycle(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let size = msize(BusCycleKind::MemoryWrite, data.len())?;
        log::trace!("write cycle: addr=0x{:08X} data={:02X?}", addr, data);

        self.lines.set_lines_output();
        self.write_header(BusCycleKind::MemoryWrite, addr, size);
        for &byte in data {
            self.write_nibble(byte & 0xF, false);
            self.write_nibble(byte >> 4, false);
        }
        self.write_nibble(TAR, false);
        self.lines.set_lines_input(false);
        self.delay_us(self.config.timings.write_sync_us);

        // Regain pulse, not sampled
        self.read_nibble();

        let sync = self.read_nibble();
        if sync != SYNC_READY {
            return Err(Error::SyncError {
                addr,
                phase: SyncPhase::Rsync,
                nibble: sync,
            });
        }

        let tar = self.read_nibble();
        self.read_nibble();

        if tar != TAR {
            return Err(Error::SyncError {
                addr,
                phase: SyncPhase::Turnaround,
                nibble: tar,
            });
        }
        Ok(())
    }

    /// START, IDSEL, address and MSIZE nibbles
    fn write_header(&mut self, kind: BusCycleKind, addr: u32, size: u8) {
        self.write_nibble(kind.start_code(), true);
        self.write_nibble(IDSEL, false);
        for shift in (0..ADDRESS_NIBBLES).rev() {
            self.write_nibble(((addr >> (shift * 4)) & 0xF) as u8, false);
        }
        self.write_nibble(size, false);
    }
}
