//! lpcflasher - LPC/FWH flash chip programmer
//!
//! Drives a parallel firmware-hub flash chip by bit-banging the LPC bus
//! over GPIO lines. Every transfer is a sequence of bus cycles built from
//! single nibbles clocked by hand.
//!
//! # Architecture
//!
//! - `lpcflasher-core` holds the bus-cycle engine, the FWH command layer
//!   and the chip registry
//! - backends (`linux_gpio`, `dummy`) implement the pin access trait
//! - this binary opens a backend, probes the chip and runs one command

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use lpcflasher_core::bus::BusConfig;
use lpcflasher_core::timing::Timings;

/// Default log filter for a `-v` count; `RUST_LOG` still overrides it
fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.verbose)),
    )
    .init();

    let mut timings = Timings::default();
    if let Some(settle) = cli.settle_us {
        timings = timings.with_settle_us(settle);
    }
    let config = BusConfig::default()
        .with_timings(timings)
        .with_diagnostic(cli.diagnostic);

    match cli.command {
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListChips { vendor } => {
            commands::list_chips(vendor.as_deref());
            Ok(())
        }
        Commands::Id => {
            let mut bus = programmers::open_bus(&cli.programmer, config)?;
            commands::run_id(&mut bus)
        }
        Commands::Read { output, range } => {
            let mut bus = programmers::open_bus(&cli.programmer, config)?;
            commands::run_read(&mut bus, &output, &range)
        }
        Commands::Verify {
            input,
            offset,
            range,
        } => {
            let mut bus = programmers::open_bus(&cli.programmer, config)?;
            commands::run_verify(&mut bus, &input, offset, &range)
        }
        Commands::Write {
            input,
            offset,
            no_verify,
            max_polls,
            range,
        } => {
            let mut bus = programmers::open_bus(&cli.programmer, config)?;
            commands::run_write(&mut bus, &input, offset, &range, no_verify, max_polls)
        }
    }
}
