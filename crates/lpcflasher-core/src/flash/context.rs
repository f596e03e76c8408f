//! Flash context - the identified chip operations run against

use crate::chip::DeviceDescriptor;

/// Runtime context for flash operations
#[derive(Debug, Clone, Copy)]
pub struct FlashContext {
    /// The identified device
    pub chip: &'static DeviceDescriptor,
}

impl FlashContext {
    /// Create a new flash context for the given device
    pub fn new(chip: &'static DeviceDescriptor) -> Self {
        Self { chip }
    }

    /// Get the total size of this chip
    pub fn total_size(&self) -> usize {
        self.chip.total_size as usize
    }

    /// Check if an address range is valid for this chip
    pub fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        if addr >= self.chip.total_size {
            return false;
        }
        self.chip.contains(addr, len)
    }
}
