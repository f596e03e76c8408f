//! FWH command layer
//!
//! Identification, software command sequences and status polling, all
//! expressed as single-byte bus cycles on top of [`LpcBus`].

use bitflags::bitflags;

use super::poll::PollLimit;
use crate::bus::{LpcBus, TurnaroundWarning};
use crate::chip::{find_device, CommandSequence, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::gpio::DigitalIo;
use crate::timing::Delay;

/// Manufacturer ID register (register space)
pub const MANUFACTURER_ID_ADDR: u32 = 0xFFBC_0000;
/// Chip ID register (register space)
pub const CHIP_ID_ADDR: u32 = 0xFFBC_0001;
/// Address the status command and status read go to
pub const STATUS_REGISTER_ADDR: u32 = 0x0FFC_0000;
/// Address bit selecting flash memory space for reads
pub const FLASH_SPACE: u32 = 0x40_0000;
/// Read Status Register command
pub const CMD_READ_STATUS: u8 = 0x70;

bitflags! {
    /// Status register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusRegister: u8 {
        /// Program or erase operation in progress
        const BUSY = 1 << 0;
    }
}

impl StatusRegister {
    /// Check if the device is still busy
    pub const fn is_busy(self) -> bool {
        self.contains(Self::BUSY)
    }
}

/// Read one block at a raw bus address
///
/// OR [`FLASH_SPACE`] into `addr` to read the memory array; without it the
/// read targets register space. A turnaround mismatch is logged and
/// returned to the caller.
pub fn read_block<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
    addr: u32,
    buf: &mut [u8],
) -> Result<Option<TurnaroundWarning>> {
    let warning = bus.read_cycle(addr, buf)?;
    if let Some(w) = warning {
        log::warn!(
            "TAR mismatch at 0x{:08X}: sampled 0x{:X} (data kept)",
            w.addr,
            w.nibble
        );
    }
    Ok(warning)
}

/// Write one block at a raw bus address
pub fn write_block<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    bus.write_cycle(addr, data)
}

/// Read the manufacturer and chip IDs
///
/// Returns (manufacturer_id, chip_id).
pub fn read_ids<IO: DigitalIo, D: Delay>(bus: &mut LpcBus<IO, D>) -> Result<(u8, u8)> {
    let mut manufacturer = [0u8; 1];
    let mut chip = [0u8; 1];
    read_block(bus, MANUFACTURER_ID_ADDR, &mut manufacturer)?;
    read_block(bus, CHIP_ID_ADDR, &mut chip)?;

    log::debug!(
        "Read IDs: manufacturer=0x{:02X} chip=0x{:02X}",
        manufacturer[0],
        chip[0]
    );
    Ok((manufacturer[0], chip[0]))
}

/// Read the IDs and look the device up in the registry
///
/// An ID pair with no registry entry is [`Error::UnsupportedDevice`];
/// callers that only want the raw IDs use [`read_ids`].
pub fn identify<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
) -> Result<&'static DeviceDescriptor> {
    let (manufacturer_id, chip_id) = read_ids(bus)?;
    find_device(manufacturer_id, chip_id).ok_or(Error::UnsupportedDevice {
        manufacturer_id,
        chip_id,
    })
}

/// Issue a software command sequence
///
/// Every step is a single-byte write cycle, in order, with no extra delay
/// in between. An empty sequence does nothing.
pub fn execute_sequence<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
    sequence: &CommandSequence,
) -> Result<()> {
    for cycle in sequence.cycles {
        log::trace!(
            "Command 0x{:02X} -> 0x{:08X}",
            cycle.command,
            cycle.addr
        );
        bus.write_cycle(cycle.addr, &[cycle.command])?;
    }
    Ok(())
}

/// Issue the device's pre-program sequence
pub fn unlock_for_write<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
    device: &DeviceDescriptor,
) -> Result<()> {
    execute_sequence(bus, &device.write_sequence)
}

/// Issue the device's pre-read sequence
pub fn unlock_for_read<IO: DigitalIo, D: Delay>(
    bus: &mut LpcBus<IO, D>,
    device: &DeviceDescriptor,
) -> Result<()> {
    execute_sequence(bus, &device.read_sequence)
}

/// Read the status register
///
/// Writes [`CMD_READ_STATUS`] to [`STATUS_REGISTER_ADDR`] and reads one
/// byte back from the same address.
pub fn read_status<IO: DigitalIo, D: Delay>(bus: &mut LpcBus<IO, D>) -> Result<StatusRegister> {
    bus.write_cycle(STATUS_REGISTER_ADDR, &[CMD_READ_STATUS])?;
    let mut buf = [0u8; 1];
    read_block(bus, STATUS_REGISTER_ADDR, &mut buf)?;
    Ok(StatusRegister::from_bits_retain(buf[0]))
}

/// Poll the status register until the device is no longer busy
///
/// Sleeps `status_poll_us` between readings. Returns the number of status
/// readings taken, or [`Error::Timeout`] once `limit`
/// expires.
pub fn wait_for_write_complete<IO: DigitalIo, D: Delay, L: PollLimit>(
    bus: &mut LpcBus<IO, D>,
    mut limit: L,
) -> Result<u32> {
    let poll_us = bus.config().timings.status_poll_us;
    let mut polls = 0u32;
    loop {
        let status = read_status(bus)?;
        polls += 1;
        if !status.is_busy() {
            log::trace!("Device ready after {} status poll(s)", polls);
            return Ok(polls);
        }
        if limit.expired() {
            log::debug!("Device still busy after {} status poll(s)", polls);
            return Err(Error::Timeout);
        }
        bus.delay_us(poll_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{CommandCycle, SST49LF004B};
    use crate::protocol::{MaxPolls, Unbounded};
    use crate::testing::{read_response, scripted_bus, write_response};
    use crate::Error;
    use std::vec;
    use std::vec::Vec;

    /// Split a latched nibble stream into (start, address, payload) per write cycle
    fn decode_writes(nibbles: &[u8]) -> Vec<(u8, u32, u8)> {
        // START, IDSEL, 7 address, MSIZE, 2 data, TAR
        nibbles
            .chunks(13)
            .map(|c| {
                let addr = c[2..9].iter().fold(0u32, |acc, &n| (acc << 4) | n as u32);
                (c[0], addr, (c[11] << 4) | c[10])
            })
            .collect()
    }

    #[test]
    fn test_read_ids() {
        let mut responses = read_response(&[0xBF]);
        responses.extend(read_response(&[0x60]));
        let mut bus = scripted_bus(&responses);

        assert_eq!(read_ids(&mut bus).unwrap(), (0xBF, 0x60));

        let nibbles = bus.io().nibbles();
        assert_eq!(&nibbles[..10], &[0xD, 0x0, 0xF, 0xB, 0xC, 0x0, 0x0, 0x0, 0x0, 0x0]);
        assert_eq!(&nibbles[11..21], &[0xD, 0x0, 0xF, 0xB, 0xC, 0x0, 0x0, 0x0, 0x1, 0x0]);
    }

    #[test]
    fn test_identify() {
        let mut responses = read_response(&[0xBF]);
        responses.extend(read_response(&[0x60]));
        let mut bus = scripted_bus(&responses);
        assert_eq!(identify(&mut bus).unwrap().name, "SST49LF004B");

        let mut responses = read_response(&[0x00]);
        responses.extend(read_response(&[0x00]));
        let mut bus = scripted_bus(&responses);
        assert_eq!(
            identify(&mut bus).unwrap_err(),
            Error::UnsupportedDevice {
                manufacturer_id: 0,
                chip_id: 0
            }
        );
    }

    #[test]
    fn test_unlock_sequence_is_emitted_in_order() {
        let mut responses = Vec::new();
        for _ in 0..3 {
            responses.extend(write_response());
        }
        let mut bus = scripted_bus(&responses);

        unlock_for_write(&mut bus, &SST49LF004B).unwrap();

        let writes = decode_writes(&bus.io().nibbles());
        assert_eq!(
            writes,
            vec![
                (0xE, 0x7_5555, 0xAA),
                (0xE, 0x7_2AAA, 0x55),
                (0xE, 0x7_5555, 0xA0),
            ]
        );
    }

    #[test]
    fn test_empty_sequence_is_noop() {
        let mut bus = scripted_bus(&[]);

        unlock_for_read(&mut bus, &SST49LF004B).unwrap();

        assert!(bus.io().ops.is_empty());
    }

    #[test]
    fn test_sequence_stops_on_sync_error() {
        static CYCLES: [CommandCycle; 2] =
            [CommandCycle::new(0x01, 0x10), CommandCycle::new(0x02, 0x20)];
        let mut bus = scripted_bus(&[0xF, 0x9, 0xF, 0xF]);

        let err = execute_sequence(&mut bus, &CommandSequence::persistent(&CYCLES)).unwrap_err();

        assert!(matches!(err, Error::SyncError { addr: 0x10, .. }));
        assert_eq!(decode_writes(&bus.io().nibbles()).len(), 1);
    }

    #[test]
    fn test_read_status() {
        let mut responses = write_response();
        responses.extend(read_response(&[0x81]));
        let mut bus = scripted_bus(&responses);

        let status = read_status(&mut bus).unwrap();

        assert!(status.is_busy());
        assert_eq!(status.bits(), 0x81);
        let writes = decode_writes(&bus.io().nibbles()[..13]);
        assert_eq!(writes, vec![(0xE, STATUS_REGISTER_ADDR, CMD_READ_STATUS)]);
    }

    fn status_responses(busy_polls: usize) -> Vec<u8> {
        let mut responses = Vec::new();
        for _ in 0..busy_polls {
            responses.extend(write_response());
            responses.extend(read_response(&[0x01]));
        }
        responses.extend(write_response());
        responses.extend(read_response(&[0x00]));
        responses
    }

    #[test]
    fn test_wait_for_write_complete() {
        let mut bus = scripted_bus(&status_responses(2));

        assert_eq!(wait_for_write_complete(&mut bus, Unbounded).unwrap(), 3);
        assert_eq!(bus.io().remaining_responses(), 0);
    }

    #[test]
    fn test_wait_for_write_complete_times_out() {
        let mut bus = scripted_bus(&status_responses(5));

        let err = wait_for_write_complete(&mut bus, MaxPolls::new(2)).unwrap_err();

        assert_eq!(err, Error::Timeout);
        // Two busy readings of ten nibbles each, then gave up
        assert_eq!(bus.io().remaining_responses(), 4 * 10);
    }
}
