use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use linkwatch_core::{Band, ChannelScanner, IwBackend, ScanSnapshot};

pub struct ScanCommandConfig<'a> {
    pub interface: Option<&'a str>,
    pub band: Option<Band>,
    pub refresh: bool,
    pub save: bool,
    pub json: bool,
    pub scan_dir: Option<PathBuf>,
}

pub fn run(cmd: ScanCommandConfig<'_>) {
    let interface = super::require_interface(cmd.interface);
    let backend = Arc::new(IwBackend::new(interface.as_str()));
    let scanner = ChannelScanner::new(backend, super::scan_store(cmd.scan_dir));

    if cmd.refresh && !cmd.json {
        eprintln!("Scanning on {interface}...");
    }
    let snapshot = match scanner.scan(cmd.band, cmd.refresh) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Scan failed: {e}");
            std::process::exit(1);
        }
    };

    if cmd.save {
        match scanner.store().append(&snapshot) {
            Ok(path) => {
                if !cmd.json {
                    println!("Saved to {}", path.display());
                }
            }
            Err(e) => eprintln!("Warning: could not save scan: {e}"),
        }
    }

    if cmd.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize scan: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", format_snapshot(&snapshot));
    }
}

/// Human-readable table: busiest channels first, empty channels last.
fn format_snapshot(snapshot: &ScanSnapshot) -> String {
    let mut out = String::new();
    let band = snapshot.band.unwrap_or_default();
    let _ = writeln!(
        out,
        "{} networks on {band} ({} access points)",
        snapshot.network_count(),
        snapshot.total()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:>4}  {:>5}  Networks", "Ch", "Count");

    let mut empty = Vec::new();
    for (channel, occupancy) in snapshot.busiest() {
        if occupancy.count == 0 {
            empty.push(channel.to_string());
            continue;
        }
        let _ = writeln!(
            out,
            "  {channel:>4}  {:>5}  {}",
            occupancy.count,
            occupancy.networks.join(", ")
        );
    }
    if !empty.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Clear: {}", empty.join(" "));
    }
    out
}
