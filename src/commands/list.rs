//! List commands implementation

use crate::cli::available_programmers;
use lpcflasher_core::chip::REGISTRY;

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in available_programmers() {
        let aliases = if p.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", p.aliases.join(", "))
        };
        println!("  {:10} - {}{}", p.name, p.description, aliases);
    }
}

/// List all supported chips
pub fn list_chips(vendor_filter: Option<&str>) {
    println!("Supported flash chips:");
    println!();
    println!(
        "{:<12} {:<16} {:>10} {:>8}  {}",
        "Vendor", "Name", "Size", "ID", "Unlock"
    );
    println!("{}", "-".repeat(60));

    for chip in REGISTRY {
        if let Some(vendor) = vendor_filter {
            if !chip.vendor.to_lowercase().contains(&vendor.to_lowercase()) {
                continue;
            }
        }

        let id = format!("{:02X} {:02X}", chip.manufacturer_id, chip.chip_id);
        let unlock = match (chip.write_sequence.len(), chip.write_sequence.oneshot) {
            (0, _) => "none".to_string(),
            (n, true) => format!("{} cycles/byte", n),
            (n, false) => format!("{} cycles", n),
        };

        println!(
            "{:<12} {:<16} {:>10} {:>8}  {}",
            chip.vendor,
            chip.name,
            format_size(chip.total_size),
            id,
            unlock
        );
    }
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
