//! Device descriptors and registry
//!
//! This module provides the static description of every supported FWH
//! flash chip: identification bytes, size and the software command
//! sequences that unlock program or read operations.

mod database;
mod types;

pub use database::*;
pub use types::*;
