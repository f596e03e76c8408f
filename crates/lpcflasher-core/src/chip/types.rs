//! Device descriptor types

/// One step of a software command sequence: a single-byte write cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandCycle {
    /// Command byte written to the bus
    pub command: u8,
    /// Bus address the command is written to
    pub addr: u32,
}

impl CommandCycle {
    /// Create a new command cycle
    pub const fn new(command: u8, addr: u32) -> Self {
        Self { command, addr }
    }
}

/// Ordered list of command cycles issued before an operation
///
/// A `oneshot` sequence arms only the next operation and has to be issued
/// again before each one (e.g. the JEDEC byte-program unlock). A persistent
/// sequence is issued once per transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSequence {
    /// Cycles in the order they are issued
    pub cycles: &'static [CommandCycle],
    /// Sequence must be replayed before every operation
    pub oneshot: bool,
}

impl CommandSequence {
    /// Sequence with no cycles
    pub const EMPTY: CommandSequence = CommandSequence {
        cycles: &[],
        oneshot: false,
    };

    /// Create a sequence that is issued once per transfer
    pub const fn persistent(cycles: &'static [CommandCycle]) -> Self {
        Self {
            cycles,
            oneshot: false,
        }
    }

    /// Create a sequence that is replayed before every operation
    pub const fn oneshot(cycles: &'static [CommandCycle]) -> Self {
        Self {
            cycles,
            oneshot: true,
        }
    }

    /// Check if the sequence has no cycles
    pub const fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Number of cycles in the sequence
    pub const fn len(&self) -> usize {
        self.cycles.len()
    }
}

impl Default for CommandSequence {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Immutable description of a supported device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Chip name
    pub name: &'static str,
    /// Vendor name
    pub vendor: &'static str,
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// Device ID
    pub chip_id: u8,
    /// Total flash size in bytes
    pub total_size: u32,
    /// Sequence issued before program operations
    pub write_sequence: CommandSequence,
    /// Sequence issued before read operations
    pub read_sequence: CommandSequence,
}

impl DeviceDescriptor {
    /// Check if this descriptor matches the given identification bytes
    pub const fn matches(&self, manufacturer_id: u8, chip_id: u8) -> bool {
        self.manufacturer_id == manufacturer_id && self.chip_id == chip_id
    }

    /// Check if the range `[offset, offset + len)` lies within the chip
    pub fn contains(&self, offset: u32, len: usize) -> bool {
        (offset as u64) + (len as u64) <= self.total_size as u64
    }
}
