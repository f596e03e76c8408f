//! Verify command

use super::{file_range, print_flash_size, CmdResult, IndicatifProgress};
use crate::cli::RangeArgs;
use crate::programmers::Bus;
use lpcflasher_core::flash::{self, FlashContext};
use std::path::Path;

/// Compare a flash range against the contents of `input`
pub fn run_verify(bus: &mut Bus, input: &Path, offset: u32, range: &RangeArgs) -> CmdResult {
    let ctx = flash::probe(bus)?;
    print_flash_size(&ctx);

    let (start, expected) = file_range(&ctx, range, input, offset)?;
    verify_range(bus, &ctx, start, &expected, range.block_size)
}

/// Shared by verify and write
pub(super) fn verify_range(
    bus: &mut Bus,
    ctx: &FlashContext,
    start: u32,
    expected: &[u8],
    block_size: usize,
) -> CmdResult {
    let stats = {
        let mut progress = IndicatifProgress::verifying();
        flash::verify(bus, ctx, start, expected, block_size, &mut progress)?
    };
    println!(
        "Verified {} bytes at 0x{:06X}: contents match",
        stats.bytes_read, start
    );
    Ok(())
}
