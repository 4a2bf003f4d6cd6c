//! # linkwatch-core
//!
//! **A live telemetry pipeline for one wireless link.**
//!
//! `linkwatch-core` samples signal strength, link rates and channel width from
//! a wireless interface, probes latency to a set of hosts, and periodically
//! scans visible access points into a per-day channel-occupancy history. It
//! also contains the rendering engine that turns those series into terminal
//! glyphs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use linkwatch_core::{IwBackend, Monitor, MonitorConfig, unix_now};
//!
//! let config = MonitorConfig {
//!     interface: "wlan0".into(),
//!     ..Default::default()
//! };
//! let backend = Arc::new(IwBackend::new(&config.interface));
//! let monitor = Monitor::new(config, backend);
//! monitor.start(linkwatch_core::iw::default_gateway().as_deref());
//!
//! let snap = monitor.snapshot(unix_now(), Some(600.0));
//! println!("{} ticks, {} hosts", snap.ticks, snap.hosts.len());
//! monitor.stop();
//! ```
//!
//! ## Architecture
//!
//! Probes → [`TimeSeriesStore`] → [`bucket_by_time`] → [`sparkline`] glyphs
//!
//! Scanner → [`ScanStore`] → [`heatmap::build`] → heatmap grid
//!
//! Every OS interaction goes through the [`ProbeBackend`] trait, implemented
//! for Linux by [`IwBackend`]. Background units (collector, one ping worker
//! per host, at most one scan) are plain threads sharing lock-protected state.

pub mod band;
pub mod bucket;
pub mod collector;
pub mod command;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod iw;
pub mod monitor;
pub mod palette;
pub mod ping;
pub mod probe;
pub mod scan_store;
pub mod scanner;
pub mod snapshot;
pub mod sparkline;
pub mod store;

pub use band::{Band, freq_to_channel};
pub use bucket::bucket_by_time;
pub use collector::{MetricsCollector, unix_now};
pub use config::{MonitorConfig, WINDOW_PRESETS};
pub use error::{ProbeError, ScanError, StartupError, StorageError};
pub use heatmap::HeatmapGrid;
pub use iw::IwBackend;
pub use monitor::{HostStatus, LiveSnapshot, Monitor};
pub use palette::{Severity, Tone};
pub use ping::{PingHost, PingRegistry};
pub use probe::{LinkInfo, ProbeBackend};
pub use scan_store::ScanStore;
pub use scanner::{ChannelScanner, ScanOutcome, parse_scan_dump};
pub use snapshot::{ChannelOccupancy, ScanSnapshot};
pub use sparkline::{Cell, Scale};
pub use store::{HostId, LinkSample, MetricSeries, TimeSeriesStore, WindowedView};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
