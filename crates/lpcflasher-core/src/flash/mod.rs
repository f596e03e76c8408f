//! High-level flash operations
//!
//! This module provides probe, ranged read, verify and byte-program
//! operations on top of the block API in [`protocol`](crate::protocol).

mod context;
mod operations;

pub use context::FlashContext;
pub use operations::*;
