//! Protocol implementations
//!
//! This module contains the FWH command layer built on top of the bus
//! cycle engine: identification, software command sequences and status
//! polling.

mod fwh;
mod poll;

pub use fwh::*;
pub use poll::*;
