//! CLI command implementations
//!
//! Every command that touches the chip probes it first; an unknown ID
//! pair aborts before any flash access.

mod ident;
mod list;
mod progress;
mod read;
mod verify;
mod write;

pub use ident::run_id;
pub use list::{list_chips, list_programmers};
pub use progress::IndicatifProgress;
pub use read::run_read;
pub use verify::run_verify;
pub use write::run_write;

use crate::cli::RangeArgs;
use lpcflasher_core::flash::FlashContext;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Result type shared by the commands
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Print flash size information
fn print_flash_size(ctx: &FlashContext) {
    println!(
        "Flash: {} {} ({} bytes, {} KiB)",
        ctx.chip.vendor,
        ctx.chip.name,
        ctx.total_size(),
        ctx.total_size() / 1024
    );
}

/// Resolve the range arguments against the chip size
///
/// A missing length means "to the end of the chip". The range must lie
/// inside the chip and be a whole number of blocks.
fn resolve_range(ctx: &FlashContext, range: &RangeArgs) -> Result<(u32, usize), String> {
    let size = ctx.total_size();
    let start = range.start as usize;
    if start >= size {
        return Err(format!(
            "Start address 0x{:X} is beyond the chip (size 0x{:X})",
            start, size
        ));
    }

    let len = match range.length {
        Some(len) => len as usize,
        None => size - start,
    };
    if len == 0 {
        return Err("Length must not be zero".into());
    }
    if !ctx.is_valid_range(range.start, len) {
        return Err(format!(
            "Range 0x{:X}+0x{:X} exceeds the chip (size 0x{:X})",
            start, len, size
        ));
    }
    if len % range.block_size != 0 {
        return Err(format!(
            "Length 0x{:X} is not a multiple of the block size {}",
            len, range.block_size
        ));
    }
    Ok((range.start, len))
}

/// Read `len` bytes of `path` starting at `offset`
///
/// With no length, everything from `offset` to the end of the file is
/// returned.
fn read_file_slice(
    path: &Path,
    offset: u32,
    len: Option<usize>,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let offset = offset as usize;
    if offset > data.len() {
        return Err(format!(
            "Offset 0x{:X} is beyond the end of {:?} ({} bytes)",
            offset,
            path,
            data.len()
        )
        .into());
    }
    let end = match len {
        Some(len) if offset + len > data.len() => {
            return Err(format!(
                "{:?} holds {} bytes; 0x{:X} bytes needed from offset 0x{:X}",
                path,
                data.len(),
                len,
                offset
            )
            .into());
        }
        Some(len) => offset + len,
        None => data.len(),
    };

    let slice = data[offset..end].to_vec();
    println!("Read {} bytes from {:?}", slice.len(), path);
    Ok(slice)
}

/// Length for a file-driven command: explicit, or whatever the file holds
/// from `offset` up to the end of the chip
fn file_range(
    ctx: &FlashContext,
    range: &RangeArgs,
    path: &Path,
    offset: u32,
) -> Result<(u32, Vec<u8>), Box<dyn std::error::Error>> {
    let data = match range.length {
        Some(len) => read_file_slice(path, offset, Some(len as usize))?,
        None => {
            let mut data = read_file_slice(path, offset, None)?;
            let room = ctx.total_size().saturating_sub(range.start as usize);
            if data.len() > room {
                log::warn!(
                    "Input is {} bytes; only the first {} fit after 0x{:X}",
                    data.len(),
                    room,
                    range.start
                );
                data.truncate(room);
            }
            data
        }
    };

    let resolved = RangeArgs {
        length: Some(data.len() as u32),
        ..*range
    };
    let (start, _) = resolve_range(ctx, &resolved)?;
    Ok((start, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpcflasher_core::chip::SST49LF004B;

    fn range(start: u32, length: Option<u32>, block_size: usize) -> RangeArgs {
        RangeArgs {
            start,
            length,
            block_size,
        }
    }

    #[test]
    fn test_resolve_whole_chip() {
        let ctx = FlashContext::new(&SST49LF004B);
        assert_eq!(
            resolve_range(&ctx, &range(0, None, 128)).unwrap(),
            (0, 0x8_0000)
        );
        assert_eq!(
            resolve_range(&ctx, &range(0x7_0000, None, 16)).unwrap(),
            (0x7_0000, 0x1_0000)
        );
    }

    #[test]
    fn test_resolve_rejects_bad_ranges() {
        let ctx = FlashContext::new(&SST49LF004B);
        assert!(resolve_range(&ctx, &range(0x8_0000, None, 1)).is_err());
        assert!(resolve_range(&ctx, &range(0x7_FFFF, Some(2), 1)).is_err());
        assert!(resolve_range(&ctx, &range(0, Some(0), 1)).is_err());
        assert!(resolve_range(&ctx, &range(0, Some(6), 4)).is_err());
    }

    #[test]
    fn test_file_range_truncates_to_chip() {
        let ctx = FlashContext::new(&SST49LF004B);
        let path = std::env::temp_dir().join(format!("lpcflasher-range-{}", std::process::id()));
        std::fs::write(&path, vec![0x5A; 0x20]).unwrap();

        let (start, data) = file_range(&ctx, &range(0x7_FFF0, None, 1), &path, 4).unwrap();
        assert_eq!(start, 0x7_FFF0);
        assert_eq!(data.len(), 0x10);

        assert!(file_range(&ctx, &range(0, Some(0x40), 1), &path, 0).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
