//! Error types for lpcflasher-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::bus::BusCycleKind;

/// Which device-driven nibble of a cycle failed to synchronize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// RSYNC nibble was not `0x0`
    Rsync,
    /// Trailing turnaround nibble was not `0xF` (write cycles only)
    Turnaround,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Protocol errors
    /// Transfer size not supported by the protocol for this cycle kind
    BadBlockLength {
        /// Cycle kind the length was requested for
        kind: BusCycleKind,
        /// Requested length in bytes
        len: usize,
    },
    /// Device did not answer with the expected sync/turnaround nibble
    ///
    /// The bus state is no longer trustworthy; the caller must run
    /// [`LpcBus::prepare`](crate::bus::LpcBus::prepare) before retrying.
    SyncError {
        /// Address of the failed cycle
        addr: u32,
        /// Which nibble was wrong
        phase: SyncPhase,
        /// The nibble that was sampled
        nibble: u8,
    },

    // Chip errors
    /// Identification does not match any registry entry
    UnsupportedDevice {
        /// JEDEC manufacturer ID that was read
        manufacturer_id: u8,
        /// Chip ID that was read
        chip_id: u8,
    },

    // Operation errors
    /// Status polling exceeded its poll limit
    Timeout,
    /// Verify operation failed (data mismatch)
    VerifyError {
        /// Chip offset of the first mismatching byte
        addr: u32,
        /// Expected byte value
        expected: u8,
        /// Byte value read back from the chip
        found: u8,
    },

    // Address/size errors
    /// Address range is beyond the flash chip size
    AddressOutOfBounds,
    /// Transfer length is not a multiple of the block length
    UnalignedLength {
        /// Total transfer length
        len: usize,
        /// Block length in use
        block_len: usize,
    },
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsync => write!(f, "RSYNC"),
            Self::Turnaround => write!(f, "TAR"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadBlockLength { kind, len } => {
                write!(f, "bad block length {} for {}", len, kind)
            }
            Self::SyncError {
                addr,
                phase,
                nibble,
            } => write!(
                f,
                "{} failed at address 0x{:08X}: sampled 0x{:X}",
                phase, addr, nibble
            ),
            Self::UnsupportedDevice {
                manufacturer_id,
                chip_id,
            } => write!(
                f,
                "unsupported device (manufacturer 0x{:02X}, chip 0x{:02X})",
                manufacturer_id, chip_id
            ),
            Self::Timeout => write!(f, "operation timed out"),
            Self::VerifyError {
                addr,
                expected,
                found,
            } => write!(
                f,
                "verify failed at 0x{:08X}: expected 0x{:02X}, found 0x{:02X}",
                addr, expected, found
            ),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::UnalignedLength { len, block_len } => write!(
                f,
                "length {} is not a multiple of the block length {}",
                len, block_len
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
