//! lpcflasher-linux-gpio - Linux GPIO backend for the LPC/FWH bus
//!
//! This crate drives the LPC bus lines through the Linux GPIO character
//! device interface (gpiocdev), the modern replacement for the deprecated
//! sysfs interface.
//!
//! # Example
//!
//! ```no_run
//! use lpcflasher_core::bus::{BusConfig, LpcBus};
//! use lpcflasher_core::timing::StdDelay;
//! use lpcflasher_linux_gpio::{LinuxGpioLpc, LinuxGpioLpcConfig};
//!
//! let io = LinuxGpioLpc::open(&LinuxGpioLpcConfig::new("/dev/gpiochip0"))?;
//! let mut bus = LpcBus::new(io, StdDelay, BusConfig::default());
//! bus.prepare();
//! let (manufacturer, chip) = lpcflasher_core::protocol::read_ids(&mut bus)?;
//! println!("IDs: {:02X} {:02X}", manufacturer, chip);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with lpcflasher CLI
//!
//! ```bash
//! # Reference Raspberry Pi wiring on /dev/gpiochip0
//! lpcflasher -p linux_gpio id
//!
//! # Custom wiring
//! lpcflasher -p linux_gpio:gpiochip=0,rst=17,lad0=22,lad1=23,lad2=24,lad3=25,lframe=27,lclk=18,wr=4 read -o dump.bin
//! ```
//!
//! # GPIO Pin Wiring
//!
//! | Flash Pin | Default GPIO | Header pin | Description |
//! |-----------|--------------|------------|-------------|
//! | RST#      | 17           | 11         | Reset (output) |
//! | LAD0      | 22           | 15         | Address/data bit 0 (bidirectional) |
//! | LAD1      | 23           | 16         | Address/data bit 1 (bidirectional) |
//! | LAD2      | 24           | 18         | Address/data bit 2 (bidirectional) |
//! | LAD3      | 25           | 22         | Address/data bit 3 (bidirectional) |
//! | LFRAME#   | 27           | 13         | Cycle framing (output) |
//! | LCLK      | 18           | 12         | Clock (output) |
//! | WP#       | 4            | 7          | Write enable (output) |
//! | ID[3:0]   | GND          |            | Chip ID strap, must match IDSEL 0 |
//! | VCC       | 3.3V         |            | Power supply |
//!
//! # System Requirements
//!
//! - Linux kernel 5.5+ (GPIO character device v2 API; v1 is used as fallback)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioLpc, LinuxGpioLpcConfig};
pub use error::{LinuxGpioError, Result};

use lpcflasher_core::gpio::DigitalIo;

/// Open a Linux GPIO LPC bus and return a boxed DigitalIo
///
/// This is a convenience function for use in the CLI programmer dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from programmer string parsing
pub fn open_linux_gpio_lpc(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn DigitalIo>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let io = LinuxGpioLpc::open(&config)?;
    Ok(Box::new(io))
}
