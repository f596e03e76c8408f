//! Digital I/O abstraction
//!
//! This module defines the pin-level capability every backend must provide
//! before the bus engine can drive an LPC/FWH chip.

mod traits;

pub use traits::*;
