//! Flash operations implementation
//!
//! All offsets are relative to the start of the chip. Reads are issued in
//! flash space (`offset | FLASH_SPACE`); byte programs go to the plain
//! offset.

use super::context::FlashContext;
use crate::bus::{msize, BusCycleKind, LpcBus, TurnaroundWarning, MAX_BLOCK_LEN};
use crate::error::{Error, Result};
use crate::gpio::DigitalIo;
use crate::protocol::{self, OptionalMaxPolls, FLASH_SPACE};
use crate::timing::Delay;

/// Callback for progress reporting during flash operations
pub trait Progress {
    /// Called when starting to read (also used by verify)
    fn reading(&mut self, total_bytes: usize);

    /// Called after each block is read
    fn read_progress(&mut self, bytes_read: usize);

    /// Called when starting to program
    fn writing(&mut self, total_bytes: usize);

    /// Called after each byte is programmed
    fn write_progress(&mut self, bytes_written: usize);

    /// Called for every read cycle that ended with a turnaround mismatch
    fn turnaround_warning(&mut self, _warning: &TurnaroundWarning) {}
}

impl<T: Progress + ?Sized> Progress for &mut T {
    fn reading(&mut self, total_bytes: usize) {
        (**self).reading(total_bytes)
    }
    fn read_progress(&mut self, bytes_read: usize) {
        (**self).read_progress(bytes_read)
    }
    fn writing(&mut self, total_bytes: usize) {
        (**self).writing(total_bytes)
    }
    fn write_progress(&mut self, bytes_written: usize) {
        (**self).write_progress(bytes_written)
    }
    fn turnaround_warning(&mut self, warning: &TurnaroundWarning) {
        (**self).turnaround_warning(warning)
    }
}

/// A no-op progress reporter
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn reading(&mut self, _total_bytes: usize) {}
    fn read_progress(&mut self, _bytes_read: usize) {}
    fn writing(&mut self, _total_bytes: usize) {}
    fn write_progress(&mut self, _bytes_written: usize) {}
}

/// Statistics from a read or verify operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Number of bytes read
    pub bytes_read: usize,
    /// Number of read cycles that ended with a turnaround mismatch
    pub turnaround_warnings: usize,
    /// First turnaround mismatch, if any
    pub first_warning: Option<TurnaroundWarning>,
}

impl ReadStats {
    fn record(&mut self, warning: TurnaroundWarning) {
        self.turnaround_warnings += 1;
        if self.first_warning.is_none() {
            self.first_warning = Some(warning);
        }
    }
}

/// Statistics from a write operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Number of bytes programmed
    pub bytes_written: usize,
    /// Number of unlock sequences issued
    pub sequences_issued: usize,
    /// Total status register readings taken
    pub status_polls: u64,
}

/// Options for [`write`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Give up on a byte after this many busy status readings
    ///
    /// `None` polls until the device reports ready.
    pub max_polls: Option<u32>,
}

impl WriteOptions {
    /// Set the status poll limit
    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }
}

/// Identify the chip and look it up in the registry
pub fn probe<IO: DigitalIo, D: Delay>(bus: &mut LpcBus<IO, D>) -> Result<FlashContext> {
    let chip = protocol::identify(bus)?;

    log::info!(
        "Found {} {} ({} KiB)",
        chip.vendor,
        chip.name,
        chip.total_size / 1024
    );
    Ok(FlashContext::new(chip))
}

/// Check block length, alignment and range before touching the bus
fn check_transfer(ctx: &FlashContext, offset: u32, len: usize, block_len: usize) -> Result<()> {
    msize(BusCycleKind::MemoryRead, block_len)?;
    if len % block_len != 0 {
        return Err(Error::UnalignedLength { len, block_len });
    }
    if !ctx.is_valid_range(offset, len) {
        return Err(Error::AddressOutOfBounds);
    }
    Ok(())
}

/// Read flash contents into `buf`, `block_len` bytes per read cycle
///
/// `buf.len()` must be a multiple of `block_len`. Turnaround mismatches do
/// not stop the read; they are counted in the returned [`ReadStats`] and
/// reported to `progress`.
pub fn read<IO, D, P>(
    bus: &mut LpcBus<IO, D>,
    ctx: &FlashContext,
    offset: u32,
    buf: &mut [u8],
    block_len: usize,
    progress: &mut P,
) -> Result<ReadStats>
where
    IO: DigitalIo,
    D: Delay,
    P: Progress + ?Sized,
{
    check_transfer(ctx, offset, buf.len(), block_len)?;
    log::debug!(
        "Reading {} bytes at 0x{:06X} in {}-byte blocks",
        buf.len(),
        offset,
        block_len
    );

    let sequence = ctx.chip.read_sequence;
    if !sequence.oneshot {
        protocol::execute_sequence(bus, &sequence)?;
    }

    let mut stats = ReadStats::default();
    progress.reading(buf.len());

    let mut addr = offset;
    for block in buf.chunks_mut(block_len) {
        if sequence.oneshot {
            protocol::execute_sequence(bus, &sequence)?;
        }
        if let Some(warning) = protocol::read_block(bus, addr | FLASH_SPACE, block)? {
            stats.record(warning);
            progress.turnaround_warning(&warning);
        }
        addr += block_len as u32;
        stats.bytes_read += block.len();
        progress.read_progress(stats.bytes_read);
    }

    Ok(stats)
}

/// Compare flash contents against `expected`
///
/// Every mismatching byte is logged; the first one is returned as
/// [`Error::VerifyError`] with its chip offset.
pub fn verify<IO, D, P>(
    bus: &mut LpcBus<IO, D>,
    ctx: &FlashContext,
    offset: u32,
    expected: &[u8],
    block_len: usize,
    progress: &mut P,
) -> Result<ReadStats>
where
    IO: DigitalIo,
    D: Delay,
    P: Progress + ?Sized,
{
    check_transfer(ctx, offset, expected.len(), block_len)?;
    log::debug!("Verifying {} bytes at 0x{:06X}", expected.len(), offset);

    let mut buf = [0u8; MAX_BLOCK_LEN];
    let mut stats = ReadStats::default();
    let mut first_mismatch = None;
    progress.reading(expected.len());

    let sequence = ctx.chip.read_sequence;
    if !sequence.oneshot {
        protocol::execute_sequence(bus, &sequence)?;
    }

    let mut addr = offset;
    for want in expected.chunks(block_len) {
        if sequence.oneshot {
            protocol::execute_sequence(bus, &sequence)?;
        }
        let have = &mut buf[..want.len()];
        if let Some(warning) = protocol::read_block(bus, addr | FLASH_SPACE, have)? {
            stats.record(warning);
            progress.turnaround_warning(&warning);
        }

        for (i, (&found, &wanted)) in have.iter().zip(want).enumerate() {
            if found != wanted {
                let addr = addr + i as u32;
                log::error!(
                    "Verify error at 0x{:06X}: read 0x{:02X}, expected 0x{:02X}",
                    addr,
                    found,
                    wanted
                );
                first_mismatch.get_or_insert(Error::VerifyError {
                    addr,
                    expected: wanted,
                    found,
                });
            }
        }

        addr += block_len as u32;
        stats.bytes_read += want.len();
        progress.read_progress(stats.bytes_read);
    }

    match first_mismatch {
        Some(err) => Err(err),
        None => Ok(stats),
    }
}

/// Program `data` at `offset`, one byte per write cycle
///
/// The write-enable line is raised for the duration of the operation and
/// lowered again on every exit path. For each byte the device's write
/// sequence is issued (every byte if it is oneshot), the byte is written
/// and the status register is polled until the device is ready.
///
/// The target range must already be erased; programming can only clear
/// bits.
pub fn write<IO, D, P>(
    bus: &mut LpcBus<IO, D>,
    ctx: &FlashContext,
    offset: u32,
    data: &[u8],
    options: WriteOptions,
    progress: &mut P,
) -> Result<WriteStats>
where
    IO: DigitalIo,
    D: Delay,
    P: Progress + ?Sized,
{
    if !ctx.is_valid_range(offset, data.len()) {
        return Err(Error::AddressOutOfBounds);
    }
    log::debug!("Programming {} bytes at 0x{:06X}", data.len(), offset);

    bus.set_write_enable(true);
    let result = program_bytes(bus, ctx, offset, data, options, progress);
    bus.set_write_enable(false);
    result
}

fn program_bytes<IO, D, P>(
    bus: &mut LpcBus<IO, D>,
    ctx: &FlashContext,
    offset: u32,
    data: &[u8],
    options: WriteOptions,
    progress: &mut P,
) -> Result<WriteStats>
where
    IO: DigitalIo,
    D: Delay,
    P: Progress + ?Sized,
{
    let sequence = ctx.chip.write_sequence;
    let mut stats = WriteStats::default();
    progress.writing(data.len());

    if !sequence.oneshot && !sequence.is_empty() {
        protocol::execute_sequence(bus, &sequence)?;
        stats.sequences_issued += 1;
    }

    for (i, &byte) in data.iter().enumerate() {
        let addr = offset + i as u32;
        if sequence.oneshot && !sequence.is_empty() {
            protocol::execute_sequence(bus, &sequence)?;
            stats.sequences_issued += 1;
        }
        protocol::write_block(bus, addr, &[byte])?;

        let limit = OptionalMaxPolls::from(options.max_polls);
        stats.status_polls += protocol::wait_for_write_complete(bus, limit).map_err(|e| {
            if e == Error::Timeout {
                log::error!("Device stayed busy after programming 0x{:06X}", addr);
            }
            e
        })? as u64;

        stats.bytes_written += 1;
        progress.write_progress(stats.bytes_written);
    }

    Ok(stats)
}
