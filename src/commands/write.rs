//! Write command

use super::verify::verify_range;
use super::{file_range, print_flash_size, CmdResult, IndicatifProgress};
use crate::cli::RangeArgs;
use crate::programmers::Bus;
use lpcflasher_core::flash::{self, WriteOptions};
use std::path::Path;

/// Program the contents of `input` into an erased flash range
///
/// The written range is read back afterwards unless `no_verify` is set.
pub fn run_write(
    bus: &mut Bus,
    input: &Path,
    offset: u32,
    range: &RangeArgs,
    no_verify: bool,
    max_polls: Option<u32>,
) -> CmdResult {
    let ctx = flash::probe(bus)?;
    print_flash_size(&ctx);

    let (start, data) = file_range(&ctx, range, input, offset)?;
    let options = WriteOptions::default().with_max_polls(max_polls);

    let stats = {
        let mut progress = IndicatifProgress::new();
        flash::write(bus, &ctx, start, &data, options, &mut progress)?
    };
    println!(
        "Wrote {} bytes at 0x{:06X} ({} status polls)",
        stats.bytes_written, start, stats.status_polls
    );

    if no_verify {
        return Ok(());
    }
    verify_range(bus, &ctx, start, &data, range.block_size)
}
