//! lpcflasher-core - Core library for LPC/FWH flash chip programming
//!
//! This crate drives a Firmware Hub / Low Pin Count flash chip by
//! bit-banging the LPC bus protocol on general-purpose I/O pins. It is
//! designed to be `no_std` compatible so the same engine can run on a
//! microcontroller or on a Linux host.
//!
//! The crate is layered bottom-up:
//!
//! - [`gpio`] - the digital I/O capability a backend must provide
//! - [`timing`] - the delay strategy and the protocol timing table
//! - [`bus`] - bus lines, nibble transport and the read/write cycle engine
//! - [`chip`] - the static registry of supported devices
//! - [`protocol`] - identification, software command sequences and status polling
//! - [`flash`] - ranged read/verify/write built on the block API
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed `DigitalIo`/`Delay` trait objects
//!
//! # Example
//!
//! ```ignore
//! use lpcflasher_core::bus::{BusConfig, LpcBus};
//! use lpcflasher_core::flash;
//!
//! let mut bus = LpcBus::new(io, StdDelay, BusConfig::default());
//! bus.prepare();
//! let ctx = flash::probe(&mut bus)?;
//! println!("Found: {} ({} bytes)", ctx.chip.name, ctx.chip.total_size);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod flash;
pub mod gpio;
pub mod protocol;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
