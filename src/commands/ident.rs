//! Chip identification command

use super::CmdResult;
use crate::programmers::Bus;
use lpcflasher_core::chip::find_device;
use lpcflasher_core::protocol;

/// Read and print the manufacturer and chip IDs
///
/// Unknown IDs are printed too; only the registry lookup fails.
pub fn run_id(bus: &mut Bus) -> CmdResult {
    let (manufacturer_id, chip_id) = protocol::read_ids(bus)?;

    println!("Manufacturer ID: 0x{:02X}", manufacturer_id);
    println!("Chip ID:         0x{:02X}", chip_id);

    match find_device(manufacturer_id, chip_id) {
        Some(chip) => {
            println!("Chip:            {} {}", chip.vendor, chip.name);
            println!(
                "Size:            {} bytes ({} KiB)",
                chip.total_size,
                chip.total_size / 1024
            );
            Ok(())
        }
        None => Err(lpcflasher_core::Error::UnsupportedDevice {
            manufacturer_id,
            chip_id,
        }
        .into()),
    }
}
