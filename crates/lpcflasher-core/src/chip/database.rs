//! Built-in device registry
//!
//! The registry is a static slice searched linearly. Entries are matched on
//! the (manufacturer, chip) pair read from the identification registers.

use super::types::{CommandCycle, CommandSequence, DeviceDescriptor};

/// SST49LF004B byte-program unlock (JEDEC three-cycle sequence)
const SST49LF004B_WRITE: &[CommandCycle] = &[
    CommandCycle::new(0xAA, 0x7_5555),
    CommandCycle::new(0x55, 0x7_2AAA),
    CommandCycle::new(0xA0, 0x7_5555),
];

/// SST49LF004B, 4 Mbit FWH/LPC flash
pub const SST49LF004B: DeviceDescriptor = DeviceDescriptor {
    name: "SST49LF004B",
    vendor: "SST",
    manufacturer_id: 0xBF,
    chip_id: 0x60,
    total_size: 512 * 1024,
    write_sequence: CommandSequence::oneshot(SST49LF004B_WRITE),
    read_sequence: CommandSequence::EMPTY,
};

/// All supported devices
pub static REGISTRY: &[DeviceDescriptor] = &[SST49LF004B];

/// Look up a device by its identification bytes
pub fn find_device(manufacturer_id: u8, chip_id: u8) -> Option<&'static DeviceDescriptor> {
    REGISTRY
        .iter()
        .find(|dev| dev.matches(manufacturer_id, chip_id))
}
