//! lpcflasher-dummy - Pin-level FWH flash chip simulator
//!
//! This crate provides a [`DigitalIo`] implementation that behaves like an
//! SST49LF004B sitting on the LPC bus. It decodes the host's nibbles on
//! falling clock edges, answers on rising clock edges and keeps the flash
//! array in memory. It's useful for testing and development without real
//! hardware.
//!
//! The simulated chip understands
//!
//! - memory read cycles in flash space and the two ID registers
//! - the JEDEC byte-program sequence, gated by the write-enable line
//! - the read-status command with a configurable number of busy readings
//! - RST#: while asserted the chip ignores the bus
//!
//! Sync and turnaround faults can be injected to exercise error paths.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use heapless::Deque;

use lpcflasher_core::bus::{msize, BusCycleKind, MAX_BLOCK_LEN};
use lpcflasher_core::chip::SST49LF004B;
use lpcflasher_core::gpio::{DigitalIo, Direction, Level, Pin};
use lpcflasher_core::protocol::{StatusRegister, CMD_READ_STATUS, FLASH_SPACE, STATUS_REGISTER_ADDR};

/// Response nibbles for the longest read: TAR, RSYNC, data, TAR
const RESPONSE_CAPACITY: usize = 2 * MAX_BLOCK_LEN + 4;

/// Host nibbles after START for the longest write: IDSEL, address, MSIZE,
/// 4 data bytes, TAR
const HEADER_CAPACITY: usize = 1 + 7 + 1 + 8 + 1;

/// Nibbles between START and the data phase
const HEADER_NIBBLES: usize = 9;

/// Configuration for the simulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Manufacturer ID returned from the ID register
    pub manufacturer_id: u8,
    /// Chip ID returned from the ID register
    pub chip_id: u8,
    /// Flash size in bytes; flash-space addresses wrap modulo this size
    pub size: usize,
    /// IDSEL value the chip is strapped to
    pub idsel: u8,
    /// Status readings that report busy after each byte program
    pub busy_polls: u32,
    /// Keep a record of every decoded cycle
    pub record_cycles: bool,
    /// Injected faults
    pub faults: Faults,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: SST49LF004B.manufacturer_id,
            chip_id: SST49LF004B.chip_id,
            size: SST49LF004B.total_size as usize,
            idsel: 0,
            busy_polls: 2,
            record_cycles: false,
            faults: Faults::default(),
        }
    }
}

/// Faults injected into the chip's responses
///
/// Each field, when set, replaces the corresponding nibble in every
/// following cycle of that kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// RSYNC nibble for read and write cycles
    pub rsync: Option<u8>,
    /// Trailing TAR nibble for read cycles
    pub read_turnaround: Option<u8>,
    /// Trailing TAR nibble for write cycles
    pub write_turnaround: Option<u8>,
}

/// A decoded bus cycle
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRecord {
    /// Cycle kind
    pub kind: BusCycleKind,
    /// 28-bit bus address
    pub addr: u32,
    /// Bytes written by the host or returned by the chip
    pub data: Vec<u8>,
}

/// JEDEC software command state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Idle,
    /// 0xAA seen at 0x5555
    Unlock1,
    /// 0x55 seen at 0x2AAA
    Unlock2,
    /// 0xA0 seen at 0x5555: next write programs a byte
    Program,
}

/// Host-side cycle decoder
#[derive(Debug)]
struct Decoder {
    kind: Option<BusCycleKind>,
    nibbles: heapless::Vec<u8, HEADER_CAPACITY>,
    len: usize,
}

impl Decoder {
    const fn new() -> Self {
        Self {
            kind: None,
            nibbles: heapless::Vec::new(),
            len: 0,
        }
    }

    fn abort(&mut self) {
        self.kind = None;
        self.nibbles.clear();
    }

    fn addr(&self) -> u32 {
        self.nibbles[1..8]
            .iter()
            .fold(0u32, |acc, &n| (acc << 4) | n as u32)
    }

    /// Host nibbles expected after START for the current cycle
    fn expected(&self, kind: BusCycleKind) -> usize {
        match kind {
            BusCycleKind::MemoryRead => HEADER_NIBBLES + 1,
            BusCycleKind::MemoryWrite => HEADER_NIBBLES + 2 * self.len + 1,
        }
    }
}

/// Block length for an MSIZE nibble
fn block_len(kind: BusCycleKind, code: u8) -> Option<usize> {
    [1, 2, 4, 16, MAX_BLOCK_LEN]
        .into_iter()
        .find(|&len| msize(kind, len) == Ok(code))
}

/// Simulated SST49LF004B on the LPC bus
#[cfg(feature = "alloc")]
pub struct DummyFwh {
    config: DummyConfig,
    data: Vec<u8>,
    levels: [Level; Pin::COUNT],
    directions: [Direction; Pin::COUNT],
    /// Nibble currently driven onto LAD by the chip
    presented: u8,
    responses: Deque<u8, RESPONSE_CAPACITY>,
    decoder: Decoder,
    command: Command,
    status_mode: bool,
    busy_remaining: u32,
    records: Vec<CycleRecord>,
}

#[cfg(feature = "alloc")]
impl DummyFwh {
    /// Create a new simulated chip with the given configuration
    ///
    /// The array starts erased (all 0xFF) and RST# is held low until the
    /// host releases it.
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            levels: [Level::Low; Pin::COUNT],
            directions: [Direction::Input; Pin::COUNT],
            presented: 0xF,
            responses: Deque::new(),
            decoder: Decoder::new(),
            command: Command::Idle,
            status_mode: false,
            busy_remaining: 0,
            records: Vec::new(),
        }
    }

    /// Create a new simulated chip with default configuration (SST49LF004B)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a simulated chip with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut chip = Self::new(config);
        let len = core::cmp::min(initial_data.len(), chip.data.len());
        chip.data[..len].copy_from_slice(&initial_data[..len]);
        chip
    }

    /// Get a reference to the flash array
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the injected faults
    pub fn set_faults(&mut self, faults: Faults) {
        self.config.faults = faults;
    }

    /// Decoded cycles, oldest first (empty unless `record_cycles` is set)
    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    /// Forget all recorded cycles
    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    /// Check if RST# is currently asserted
    pub fn in_reset(&self) -> bool {
        self.levels[Pin::Reset.index()] == Level::Low
    }

    fn lad_is_output(&self) -> bool {
        self.directions[Pin::Lad0.index()] == Direction::Output
    }

    fn lad_value(&self) -> u8 {
        Pin::LAD
            .iter()
            .enumerate()
            .filter(|(_, pin)| self.levels[pin.index()].is_high())
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    fn reset(&mut self) {
        self.decoder.abort();
        self.responses.clear();
        self.presented = 0xF;
        self.command = Command::Idle;
        self.status_mode = false;
        self.busy_remaining = 0;
    }

    /// Host drove a nibble and dropped LCLK
    fn latch(&mut self, nibble: u8, frame: bool) {
        if frame {
            self.decoder.abort();
            self.responses.clear();
            self.decoder.kind = match nibble {
                0xD => Some(BusCycleKind::MemoryRead),
                0xE => Some(BusCycleKind::MemoryWrite),
                _ => {
                    log::trace!("dummy: ignoring START 0x{:X}", nibble);
                    None
                }
            };
            return;
        }

        let Some(kind) = self.decoder.kind else {
            return;
        };
        if self.decoder.nibbles.push(nibble).is_err() {
            self.decoder.abort();
            return;
        }

        let count = self.decoder.nibbles.len();
        if count == HEADER_NIBBLES {
            match block_len(kind, nibble) {
                Some(len) => self.decoder.len = len,
                None => {
                    log::warn!("dummy: bad MSIZE 0x{:X} for {}", nibble, kind);
                    self.decoder.abort();
                    return;
                }
            }
        }
        if count > HEADER_NIBBLES && count == self.decoder.expected(kind) {
            self.complete(kind);
            self.decoder.abort();
        }
    }

    fn complete(&mut self, kind: BusCycleKind) {
        let idsel = self.decoder.nibbles[0];
        let addr = self.decoder.addr();
        let tar = self.decoder.nibbles[self.decoder.nibbles.len() - 1];
        if tar != 0xF {
            log::warn!("dummy: host TAR 0x{:X} at 0x{:07X}", tar, addr);
        }
        if idsel != self.config.idsel {
            log::trace!("dummy: cycle for IDSEL {} ignored", idsel);
            return;
        }

        match kind {
            BusCycleKind::MemoryRead => self.complete_read(addr),
            BusCycleKind::MemoryWrite => self.complete_write(addr),
        }
    }

    fn complete_read(&mut self, addr: u32) {
        let len = self.decoder.len;
        let mut bytes = [0u8; MAX_BLOCK_LEN];
        for (i, byte) in bytes[..len].iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(i as u32));
        }
        log::trace!("dummy: read 0x{:07X} -> {:02X?}", addr, &bytes[..len]);

        let faults = self.config.faults;
        self.respond(0xF);
        self.respond(faults.rsync.unwrap_or(0x0));
        for &byte in &bytes[..len] {
            self.respond(byte & 0xF);
            self.respond(byte >> 4);
        }
        self.respond(faults.read_turnaround.unwrap_or(0xF));
        self.record(BusCycleKind::MemoryRead, addr, &bytes[..len]);
    }

    fn complete_write(&mut self, addr: u32) {
        let len = self.decoder.len;
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes[..len].iter_mut().enumerate() {
            let low = self.decoder.nibbles[HEADER_NIBBLES + 2 * i];
            let high = self.decoder.nibbles[HEADER_NIBBLES + 2 * i + 1];
            *byte = (high << 4) | low;
        }
        log::trace!("dummy: write 0x{:07X} <- {:02X?}", addr, &bytes[..len]);

        for (i, &byte) in bytes[..len].iter().enumerate() {
            self.write_byte(addr.wrapping_add(i as u32), byte);
        }

        let faults = self.config.faults;
        self.respond(0xF);
        self.respond(faults.rsync.unwrap_or(0x0));
        self.respond(faults.write_turnaround.unwrap_or(0xF));
        self.record(BusCycleKind::MemoryWrite, addr, &bytes[..len]);
    }

    fn read_byte(&mut self, addr: u32) -> u8 {
        if self.status_mode && addr == STATUS_REGISTER_ADDR {
            self.status_mode = false;
            return if self.busy_remaining > 0 {
                self.busy_remaining -= 1;
                StatusRegister::BUSY.bits()
            } else {
                StatusRegister::empty().bits()
            };
        }
        if addr & FLASH_SPACE != 0 {
            return match self.array_offset(addr) {
                Some(offset) => self.data[offset],
                None => 0xFF,
            };
        }
        match addr & 0x1 {
            0 => self.config.manufacturer_id,
            _ => self.config.chip_id,
        }
    }

    fn write_byte(&mut self, addr: u32, byte: u8) {
        if addr == STATUS_REGISTER_ADDR && byte == CMD_READ_STATUS {
            self.status_mode = true;
            return;
        }

        let jedec = addr & 0x7FFF;
        self.command = match (self.command, byte, jedec) {
            (Command::Program, _, _) => {
                self.program(addr, byte);
                Command::Idle
            }
            (Command::Idle, 0xAA, 0x5555) => Command::Unlock1,
            (Command::Unlock1, 0x55, 0x2AAA) => Command::Unlock2,
            (Command::Unlock2, 0xA0, 0x5555) => Command::Program,
            (state, _, _) => {
                if state != Command::Idle {
                    log::debug!(
                        "dummy: command sequence broken by 0x{:02X} at 0x{:07X}",
                        byte,
                        addr
                    );
                }
                Command::Idle
            }
        };
    }

    /// Offset into the array for a bus address, `None` for an empty array
    fn array_offset(&self, addr: u32) -> Option<usize> {
        (addr as usize & !(FLASH_SPACE as usize)).checked_rem(self.data.len())
    }

    fn program(&mut self, addr: u32, byte: u8) {
        if !self.levels[Pin::WriteEnable.index()].is_high() {
            log::debug!("dummy: program at 0x{:07X} ignored, WP# low", addr);
            return;
        }
        let Some(offset) = self.array_offset(addr) else {
            log::debug!("dummy: program at 0x{:07X} ignored, empty array", addr);
            return;
        };
        // Programming can only clear bits
        self.data[offset] &= byte;
        self.busy_remaining = self.config.busy_polls;
        log::debug!("dummy: programmed 0x{:02X} at 0x{:06X}", byte, offset);
    }

    fn respond(&mut self, nibble: u8) {
        if self.responses.push_back(nibble & 0xF).is_err() {
            log::error!("dummy: response queue overflow");
        }
    }

    fn record(&mut self, kind: BusCycleKind, addr: u32, data: &[u8]) {
        if self.config.record_cycles {
            self.records.push(CycleRecord {
                kind,
                addr,
                data: data.to_vec(),
            });
        }
    }
}

#[cfg(feature = "alloc")]
impl DigitalIo for DummyFwh {
    fn set_direction(&mut self, pin: Pin, direction: Direction) {
        self.directions[pin.index()] = direction;
    }

    fn write_level(&mut self, pin: Pin, level: Level) {
        let previous = self.levels[pin.index()];
        self.levels[pin.index()] = level;

        match pin {
            Pin::Reset if level == Level::Low && previous == Level::High => {
                log::trace!("dummy: reset asserted");
                self.reset();
            }
            Pin::Clock if !self.in_reset() => match (previous, level) {
                (Level::Low, Level::High) if !self.lad_is_output() => {
                    self.presented = self.responses.pop_front().unwrap_or(0xF);
                }
                (Level::High, Level::Low) if self.lad_is_output() => {
                    let frame = self.levels[Pin::Frame.index()] == Level::Low;
                    self.latch(self.lad_value(), frame);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn read_level(&mut self, pin: Pin) -> Level {
        match Pin::LAD.iter().position(|&p| p == pin) {
            Some(bit) if self.directions[pin.index()] == Direction::Input => {
                Level::from(self.presented & (1 << bit) != 0)
            }
            _ => self.levels[pin.index()],
        }
    }
}

/// Parse dummy programmer options
///
/// # Supported Options
///
/// - `busy=N` - busy status readings after each byte program
/// - `mfr=0xNN` - manufacturer ID to report
/// - `chip=0xNN` - chip ID to report
#[cfg(feature = "std")]
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    fn parse_u8(key: &str, value: &str) -> Result<u8, String> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        u8::from_str_radix(digits, 16).map_err(|_| format!("Invalid {} value: {}", key, value))
    }

    let mut config = DummyConfig::default();
    for (key, value) in options {
        match *key {
            "busy" => {
                config.busy_polls = value
                    .parse()
                    .map_err(|_| format!("Invalid busy value: {}", value))?;
            }
            "mfr" => config.manufacturer_id = parse_u8(key, value)?,
            "chip" => config.chip_id = parse_u8(key, value)?,
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }
    Ok(config)
}

/// Create a boxed simulated chip for the CLI programmer dispatch
#[cfg(feature = "std")]
pub fn open_dummy(
    options: &[(&str, &str)],
) -> Result<Box<dyn DigitalIo>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    log::info!(
        "dummy: Simulating chip 0x{:02X}/0x{:02X} ({} KiB)",
        config.manufacturer_id,
        config.chip_id,
        config.size / 1024
    );
    Ok(Box::new(DummyFwh::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpcflasher_core::bus::{BusConfig, LpcBus, TurnaroundWarning};
    use lpcflasher_core::error::{Error, SyncPhase};
    use lpcflasher_core::flash::{self, NoProgress, WriteOptions};
    use lpcflasher_core::protocol;
    use lpcflasher_core::timing::NoDelay;

    fn recording() -> DummyConfig {
        DummyConfig {
            record_cycles: true,
            ..Default::default()
        }
    }

    fn bus(chip: DummyFwh) -> LpcBus<DummyFwh, NoDelay> {
        let mut bus = LpcBus::new(chip, NoDelay, BusConfig::default());
        bus.prepare();
        bus
    }

    #[test]
    fn test_probe() {
        let mut bus = bus(DummyFwh::new_default());

        let ctx = flash::probe(&mut bus).unwrap();

        assert_eq!(ctx.chip.name, "SST49LF004B");
        assert_eq!(ctx.total_size(), 512 * 1024);
    }

    #[test]
    fn test_probe_unknown_chip() {
        let config = DummyConfig {
            manufacturer_id: 0x12,
            chip_id: 0x34,
            ..Default::default()
        };
        let mut bus = bus(DummyFwh::new(config));

        assert_eq!(
            flash::probe(&mut bus).unwrap_err(),
            Error::UnsupportedDevice {
                manufacturer_id: 0x12,
                chip_id: 0x34
            }
        );
    }

    #[test]
    fn test_held_in_reset() {
        let mut bus = LpcBus::new(DummyFwh::new_default(), NoDelay, BusConfig::default());
        let mut buf = [0u8; 1];

        let err = bus.read_cycle(protocol::MANUFACTURER_ID_ADDR, &mut buf).unwrap_err();

        assert!(matches!(
            err,
            Error::SyncError {
                phase: SyncPhase::Rsync,
                nibble: 0xF,
                ..
            }
        ));
    }

    #[test]
    fn test_read_block_sizes() {
        let image: Vec<u8> = (0..256u32).map(|i| (i * 7 + 3) as u8).collect();
        let mut bus = bus(DummyFwh::with_data(DummyConfig::default(), &image));
        let ctx = flash::probe(&mut bus).unwrap();

        for block_len in [1, 2, 4, 16, 128] {
            let mut buf = vec![0u8; 256];
            let stats =
                flash::read(&mut bus, &ctx, 0, &mut buf, block_len, &mut NoProgress).unwrap();
            assert_eq!(buf, image, "block length {}", block_len);
            assert_eq!(stats.turnaround_warnings, 0);
        }
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut bus = bus(DummyFwh::new_default());
        let ctx = flash::probe(&mut bus).unwrap();
        let payload = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];

        let stats = flash::write(
            &mut bus,
            &ctx,
            0x1000,
            &payload,
            WriteOptions::default(),
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(stats.bytes_written, payload.len());
        // Two busy readings and one ready reading per byte
        assert_eq!(stats.status_polls, 3 * payload.len() as u64);

        let mut buf = [0u8; 8];
        flash::read(&mut bus, &ctx, 0x1000, &mut buf, 4, &mut NoProgress).unwrap();
        assert_eq!(buf, payload);
        flash::verify(&mut bus, &ctx, 0x1000, &payload, 2, &mut NoProgress).unwrap();
        assert_eq!(&bus.io().data()[0x1000..0x1008], &payload);
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut image = vec![0xFF; 4];
        image[0] = 0x0F;
        let mut bus = bus(DummyFwh::with_data(DummyConfig::default(), &image));
        let ctx = flash::probe(&mut bus).unwrap();

        flash::write(&mut bus, &ctx, 0, &[0xF0], WriteOptions::default(), &mut NoProgress)
            .unwrap();

        assert_eq!(bus.io().data()[0], 0x00);
        let err = flash::verify(&mut bus, &ctx, 0, &[0xF0], 1, &mut NoProgress).unwrap_err();
        assert_eq!(
            err,
            Error::VerifyError {
                addr: 0,
                expected: 0xF0,
                found: 0x00
            }
        );
    }

    #[test]
    fn test_array_wraps_for_any_size() {
        let config = DummyConfig {
            size: 3,
            ..Default::default()
        };
        let mut wrapped = bus(DummyFwh::with_data(config, &[0x11, 0x22, 0x33]));
        let mut buf = [0u8; 1];

        protocol::read_block(&mut wrapped, FLASH_SPACE | 4, &mut buf).unwrap();
        assert_eq!(buf, [0x22]);

        let config = DummyConfig {
            size: 0,
            ..Default::default()
        };
        let mut empty = bus(DummyFwh::new(config));
        protocol::read_block(&mut empty, FLASH_SPACE, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
    }

    #[test]
    fn test_unlock_sequence_recorded() {
        let mut bus = bus(DummyFwh::new(recording()));
        let ctx = flash::probe(&mut bus).unwrap();
        bus.io_mut().clear_records();

        flash::write(&mut bus, &ctx, 0x20, &[0xA5], WriteOptions::default(), &mut NoProgress)
            .unwrap();

        let writes: Vec<(u32, u8)> = bus
            .io()
            .records()
            .iter()
            .filter(|r| r.kind == BusCycleKind::MemoryWrite && r.addr != STATUS_REGISTER_ADDR)
            .map(|r| (r.addr, r.data[0]))
            .collect();
        assert_eq!(
            writes,
            [(0x7_5555, 0xAA), (0x7_2AAA, 0x55), (0x7_5555, 0xA0), (0x20, 0xA5)]
        );
        let status_reads = bus
            .io()
            .records()
            .iter()
            .filter(|r| r.kind == BusCycleKind::MemoryRead && r.addr == STATUS_REGISTER_ADDR)
            .count();
        assert_eq!(status_reads, 3);
    }

    #[test]
    fn test_write_protect_line_blocks_program() {
        let mut bus = bus(DummyFwh::new_default());
        let ctx = flash::probe(&mut bus).unwrap();

        // Program without raising the write-enable line
        protocol::unlock_for_write(&mut bus, ctx.chip).unwrap();
        protocol::write_block(&mut bus, 0x10, &[0x00]).unwrap();
        protocol::wait_for_write_complete(&mut bus, protocol::Unbounded).unwrap();

        assert_eq!(bus.io().data()[0x10], 0xFF);
    }

    #[test]
    fn test_broken_sequence_does_not_program() {
        let mut bus = bus(DummyFwh::new_default());
        bus.set_write_enable(true);

        protocol::write_block(&mut bus, 0x7_5555, &[0xAA]).unwrap();
        protocol::write_block(&mut bus, 0x7_5555, &[0x55]).unwrap();
        protocol::write_block(&mut bus, 0x7_5555, &[0xA0]).unwrap();
        protocol::write_block(&mut bus, 0x30, &[0x00]).unwrap();

        assert_eq!(bus.io().data()[0x30], 0xFF);
    }

    #[test]
    fn test_status_timeout() {
        let config = DummyConfig {
            busy_polls: 100,
            ..Default::default()
        };
        let mut bus = bus(DummyFwh::new(config));
        let ctx = flash::probe(&mut bus).unwrap();
        let options = WriteOptions::default().with_max_polls(Some(5));

        let err = flash::write(&mut bus, &ctx, 0, &[0x00], options, &mut NoProgress).unwrap_err();

        assert_eq!(err, Error::Timeout);
    }

    #[test]
    fn test_rsync_fault() {
        let mut bus = bus(DummyFwh::new_default());
        bus.io_mut().set_faults(Faults {
            rsync: Some(0x6),
            ..Default::default()
        });

        let mut buf = [0u8; 1];
        let err = bus.read_cycle(FLASH_SPACE, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::SyncError {
                phase: SyncPhase::Rsync,
                nibble: 0x6,
                ..
            }
        ));

        bus.prepare();
        let err = bus.write_cycle(0x0, &[0x00]).unwrap_err();
        assert!(matches!(err, Error::SyncError { phase: SyncPhase::Rsync, .. }));
    }

    #[test]
    fn test_rsync_fault_tolerated_in_diagnostic_mode() {
        let image = [0x42u8; 4];
        let mut bus = bus(DummyFwh::with_data(DummyConfig::default(), &image));
        bus.set_diagnostic(true);
        bus.io_mut().set_faults(Faults {
            rsync: Some(0x6),
            ..Default::default()
        });

        let mut buf = [0u8; 4];
        bus.read_cycle(FLASH_SPACE, &mut buf).unwrap();

        assert_eq!(buf, image);
    }

    #[test]
    fn test_read_turnaround_fault_is_a_warning() {
        let mut bus = bus(DummyFwh::with_data(DummyConfig::default(), &[0x5A]));
        let ctx = flash::probe(&mut bus).unwrap();
        bus.io_mut().set_faults(Faults {
            read_turnaround: Some(0x0),
            ..Default::default()
        });

        let mut buf = [0u8; 2];
        let stats = flash::read(&mut bus, &ctx, 0, &mut buf, 1, &mut NoProgress).unwrap();

        assert_eq!(buf, [0x5A, 0xFF]);
        assert_eq!(stats.turnaround_warnings, 2);
        assert_eq!(
            stats.first_warning,
            Some(TurnaroundWarning {
                addr: FLASH_SPACE,
                nibble: 0x0
            })
        );
    }

    #[test]
    fn test_write_turnaround_fault_is_fatal() {
        let mut bus = bus(DummyFwh::new_default());
        bus.io_mut().set_faults(Faults {
            write_turnaround: Some(0x3),
            ..Default::default()
        });

        let err = bus.write_cycle(0x7_5555, &[0xAA]).unwrap_err();

        assert_eq!(
            err,
            Error::SyncError {
                addr: 0x7_5555,
                phase: SyncPhase::Turnaround,
                nibble: 0x3
            }
        );
    }

    #[test]
    fn test_ignores_other_idsel() {
        let config = DummyConfig {
            idsel: 1,
            ..Default::default()
        };
        let mut bus = bus(DummyFwh::new(config));

        let err = protocol::read_ids(&mut bus).unwrap_err();

        assert!(matches!(err, Error::SyncError { .. }));
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("busy", "7"), ("mfr", "0x12"), ("chip", "34")]).unwrap();
        assert_eq!(config.busy_polls, 7);
        assert_eq!(config.manufacturer_id, 0x12);
        assert_eq!(config.chip_id, 0x34);
        assert!(parse_options(&[("mfr", "0x123")]).is_err());
        assert!(parse_options(&[("busy", "-1")]).is_err());
    }
}
