//! Read command

use super::{print_flash_size, resolve_range, CmdResult, IndicatifProgress};
use crate::cli::RangeArgs;
use crate::programmers::Bus;
use lpcflasher_core::flash;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read a flash range into `output`
pub fn run_read(bus: &mut Bus, output: &Path, range: &RangeArgs) -> CmdResult {
    let ctx = flash::probe(bus)?;
    print_flash_size(&ctx);

    let (start, len) = resolve_range(&ctx, range)?;
    let mut data = vec![0u8; len];

    let stats = {
        let mut progress = IndicatifProgress::new();
        flash::read(bus, &ctx, start, &mut data, range.block_size, &mut progress)?
    };

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!(
        "Read {} bytes from 0x{:06X} to {:?}",
        stats.bytes_read, start, output
    );
    if stats.turnaround_warnings > 0 {
        println!(
            "{} read cycle(s) ended with an unexpected turnaround nibble",
            stats.turnaround_warnings
        );
    }
    Ok(())
}
