//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a block size accepted by read cycles
fn parse_block_size(s: &str) -> Result<usize, String> {
    let size = parse_hex_u32(s)? as usize;
    match size {
        1 | 2 | 4 | 16 | 128 => Ok(size),
        _ => Err(format!(
            "Invalid block size {}: allowed sizes are 1, 2, 4, 16 and 128",
            size
        )),
    }
}

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["sim"],
        description: "Simulated SST49LF004B (busy=<polls>,mfr=<id>,chip=<id>)",
    });

    #[cfg(feature = "linux-gpio")]
    programmers.push(ProgrammerInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpio"],
        description: "Bit-banged bus on a GPIO chip (dev=,gpiochip=,rst=,lad0..lad3=,lframe=,lclk=,wr=)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");
    for p in &programmers {
        help.push_str(&format!("  {:12} - {}", p.name, p.description));
        if !p.aliases.is_empty() {
            help.push_str(&format!(" (aliases: {})", p.aliases.join(", ")));
        }
        help.push('\n');
    }
    help
}

/// Short help for the programmer argument
fn programmer_arg_help() -> String {
    let names: Vec<&str> = available_programmers().iter().map(|p| p.name).collect();
    format!("Programmer to use [available: {}]", names.join(", "))
}

#[derive(Parser)]
#[command(name = "lpcflasher")]
#[command(author, version, about = "LPC/FWH flash chip programmer over GPIO", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        default_value = "linux_gpio",
        help = programmer_arg_help(),
        long_help = programmer_help()
    )]
    pub programmer: String,

    /// Log bad RSYNC nibbles on reads instead of aborting
    #[arg(long, global = true)]
    pub diagnostic: bool,

    /// Settle time around each clock edge in microseconds
    #[arg(long, global = true, value_parser = parse_hex_u32)]
    pub settle_us: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Address range options shared across commands
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// Start address in the chip (hex, e.g., 0x10000)
    #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
    pub start: u32,

    /// Length of the range (hex or decimal, defaults to the rest of the chip)
    #[arg(short, long, value_parser = parse_hex_u32)]
    pub length: Option<u32>,

    /// Bytes per read cycle (1, 2, 4, 16 or 128)
    #[arg(short, long, default_value = "1", value_parser = parse_block_size)]
    pub block_size: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the manufacturer and chip IDs
    Id,

    /// Read flash contents to file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Verify flash contents against file
    Verify {
        /// Input file path to verify against
        #[arg(short, long)]
        input: PathBuf,

        /// Offset in the input file
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        offset: u32,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Program file contents into an erased flash range
    Write {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Offset in the input file
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        offset: u32,

        /// Skip verification after writing
        #[arg(long)]
        no_verify: bool,

        /// Give up on a byte after this many busy status readings
        #[arg(long)]
        max_polls: Option<u32>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// List supported programmers
    ListProgrammers,

    /// List supported chips
    ListChips {
        /// Filter by vendor
        #[arg(long)]
        vendor: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_programmer_help_lists_aliases() {
        let help = programmer_help();
        assert!(help.contains("dummy"));
        assert!(help.contains("(aliases: sim)"));
        assert!(programmer_arg_help().starts_with("Programmer to use [available: dummy"));
    }

    #[test]
    fn test_block_size_values() {
        assert_eq!(parse_block_size("0x80"), Ok(128));
        assert!(parse_block_size("8").is_err());
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
    }
}
