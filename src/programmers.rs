//! Programmer lookup and dispatch
//!
//! The list of compiled-in programmers lives next to the CLI definition;
//! this module resolves names against it and opens the matching backend.

use crate::cli::{available_programmers, programmer_help};
use lpcflasher_core::bus::{BusConfig, LpcBus};
use lpcflasher_core::gpio::DigitalIo;
use lpcflasher_core::timing::Delay;

/// Bus type handed to the commands
pub type Bus = LpcBus<Box<dyn DigitalIo>, Box<dyn Delay>>;

/// Errors from opening a programmer
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// No compiled-in programmer has this name
    #[error("Unknown programmer: {name}\n\n{help}\nUse 'lpcflasher list-programmers' for more details")]
    UnknownProgrammer { name: String, help: String },

    /// The backend refused its options or could not reach the hardware
    #[error("Failed to open {name}: {source}")]
    Backend {
        name: &'static str,
        source: Box<dyn std::error::Error>,
    },
}

/// Resolve a name or alias to the canonical programmer name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Split "name:key=value,key=value" into the name and its options
///
/// Options without an `=` are ignored.
pub fn parse_programmer_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the programmer named by `programmer` and prepare the bus
///
/// The simulated chip runs without delays; real hardware gets
/// `thread::sleep` based timing.
#[allow(unused_variables)]
pub fn open_bus(programmer: &str, config: BusConfig) -> Result<Bus, OpenError> {
    let (name, options) = parse_programmer_string(programmer);

    let canonical = find_programmer(name).ok_or_else(|| OpenError::UnknownProgrammer {
        name: name.to_string(),
        help: programmer_help(),
    })?;

    let mut bus: Bus = match canonical {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let io = lpcflasher_dummy::open_dummy(&options).map_err(|source| {
                OpenError::Backend {
                    name: "dummy",
                    source,
                }
            })?;
            LpcBus::new(
                io,
                Box::new(lpcflasher_core::timing::NoDelay),
                config,
            )
        }

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" => {
            log::info!("Opening Linux GPIO programmer...");
            let io = lpcflasher_linux_gpio::open_linux_gpio_lpc(&options).map_err(|source| {
                OpenError::Backend {
                    name: "linux_gpio",
                    source,
                }
            })?;
            LpcBus::new(
                io,
                Box::new(lpcflasher_core::timing::StdDelay),
                config,
            )
        }

        _ => {
            return Err(OpenError::UnknownProgrammer {
                name: name.to_string(),
                help: programmer_help(),
            })
        }
    };

    bus.prepare();
    Ok(bus)
}
