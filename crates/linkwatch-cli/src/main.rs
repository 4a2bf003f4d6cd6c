//! CLI for linkwatch: a live terminal dashboard for one wireless link.

mod commands;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkwatch_core::Band;
use linkwatch_core::scan_store::DEFAULT_KEEP_DAYS;

#[derive(Parser)]
#[command(name = "linkwatch")]
#[command(about = "linkwatch: signal, rates, latency and channel congestion for your Wi-Fi link")]
#[command(version = linkwatch_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard: signal, latency per host, rx/tx rates and the
    /// channel heatmap
    Monitor {
        /// Wireless interface (default: first one `iw dev` lists)
        #[arg(short, long)]
        interface: Option<String>,

        /// Sampling interval in seconds
        #[arg(long, default_value = "1.0")]
        refresh: f64,

        /// Extra host to ping (repeatable)
        #[arg(long = "ping", value_name = "HOST")]
        ping: Vec<String>,

        /// Skip the default gateway and internet ping hosts
        #[arg(long)]
        no_default_hosts: bool,

        /// Directory holding the per-day scan files
        #[arg(long)]
        scan_dir: Option<PathBuf>,

        /// Log file while the dashboard owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Run one channel scan and print the occupancy per channel
    Scan {
        /// Wireless interface (default: first one `iw dev` lists)
        #[arg(short, long)]
        interface: Option<String>,

        /// Band to report: 2.4 or 5 (default: band of the current association)
        #[arg(long)]
        band: Option<Band>,

        /// Use the cached scan results instead of requesting a rescan
        #[arg(long)]
        no_refresh: bool,

        /// Append the snapshot to today's scan file
        #[arg(long)]
        save: bool,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Directory holding the per-day scan files
        #[arg(long)]
        scan_dir: Option<PathBuf>,
    },

    /// Print the channel congestion heatmap from saved scans
    Heatmap {
        /// Number of days to show, ending today
        #[arg(long, default_value = "7")]
        days: u32,

        /// Band: 2.4 or 5 (default: band of the current association)
        #[arg(long)]
        band: Option<Band>,

        /// Directory holding the per-day scan files
        #[arg(long)]
        scan_dir: Option<PathBuf>,
    },

    /// List wireless interfaces
    Interfaces,

    /// Delete scan files older than the retention period
    Cleanup {
        /// Days of scan files to keep
        #[arg(long, default_value_t = DEFAULT_KEEP_DAYS)]
        keep_days: u64,

        /// Directory holding the per-day scan files
        #[arg(long)]
        scan_dir: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor {
            interface,
            refresh,
            ping,
            no_default_hosts,
            scan_dir,
            log_file,
        } => commands::monitor::run(commands::monitor::MonitorCommandConfig {
            interface: interface.as_deref(),
            refresh_secs: refresh,
            extra_hosts: ping,
            default_hosts: !no_default_hosts,
            scan_dir,
            log_file,
        }),
        Commands::Scan {
            interface,
            band,
            no_refresh,
            save,
            json,
            scan_dir,
        } => {
            commands::init_logging(None);
            commands::scan::run(commands::scan::ScanCommandConfig {
                interface: interface.as_deref(),
                band,
                refresh: !no_refresh,
                save,
                json,
                scan_dir,
            })
        }
        Commands::Heatmap {
            days,
            band,
            scan_dir,
        } => {
            commands::init_logging(None);
            commands::heatmap::run(days, band, scan_dir)
        }
        Commands::Interfaces => {
            commands::init_logging(None);
            commands::interfaces::run()
        }
        Commands::Cleanup {
            keep_days,
            scan_dir,
        } => {
            commands::init_logging(None);
            commands::cleanup::run(keep_days, scan_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn monitor_collects_repeated_ping_hosts() {
        let cli = Cli::try_parse_from([
            "linkwatch", "monitor", "-i", "wlan1", "--ping", "8.8.8.8", "--ping", "nas.lan",
        ])
        .unwrap();
        match cli.command {
            Commands::Monitor {
                interface, ping, ..
            } => {
                assert_eq!(interface.as_deref(), Some("wlan1"));
                assert_eq!(ping, vec!["8.8.8.8", "nas.lan"]);
            }
            _ => panic!("expected monitor"),
        }
    }

    #[test]
    fn band_flag_parses_both_spellings() {
        for (arg, want) in [("2.4", Band::TwoFour), ("5GHz", Band::Five)] {
            let cli = Cli::try_parse_from(["linkwatch", "heatmap", "--band", arg]).unwrap();
            match cli.command {
                Commands::Heatmap { band, days, .. } => {
                    assert_eq!(band, Some(want));
                    assert_eq!(days, 7);
                }
                _ => panic!("expected heatmap"),
            }
        }
        assert!(Cli::try_parse_from(["linkwatch", "scan", "--band", "6"]).is_err());
    }

    #[test]
    fn cleanup_defaults_to_ninety_days() {
        let cli = Cli::try_parse_from(["linkwatch", "cleanup"]).unwrap();
        match cli.command {
            Commands::Cleanup { keep_days, .. } => assert_eq!(keep_days, 90),
            _ => panic!("expected cleanup"),
        }
    }
}
