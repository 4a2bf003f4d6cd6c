//! Monitor configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::iw::{COMMAND_TIMEOUT, PING_TIMEOUT, SCAN_SETTLE_DELAY};
use crate::ping::PING_INTERVAL;
use crate::scan_store::ScanStore;
use crate::scanner::SCAN_INTERVAL;
use crate::store::DEFAULT_RETENTION;

/// Selectable chart windows, narrowest first.
pub const WINDOW_PRESETS: [(&str, u64); 6] = [
    ("10m", 600),
    ("30m", 1_800),
    ("60m", 3_600),
    ("4h", 14_400),
    ("1D", 86_400),
    ("7D", 604_800),
];

/// Default chart window in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 600;

/// Default heatmap depth in days.
pub const DEFAULT_HEATMAP_DAYS: u32 = 7;

/// Always-probed internet host.
pub const INTERNET_HOST: &str = "1.1.1.1";

/// Everything the monitor needs to start.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interface: String,
    pub refresh_interval: Duration,
    pub retention: usize,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub command_timeout: Duration,
    pub scan_interval: Duration,
    pub scan_settle_delay: Duration,
    pub scan_dir: PathBuf,
    pub default_window_secs: u64,
    pub heatmap_days: u32,
    /// Probe the default gateway and the internet host at startup.
    pub default_hosts: bool,
    /// Additional hosts to probe, in order.
    pub extra_hosts: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            refresh_interval: Duration::from_secs(1),
            retention: DEFAULT_RETENTION,
            ping_interval: PING_INTERVAL,
            ping_timeout: PING_TIMEOUT,
            command_timeout: COMMAND_TIMEOUT,
            scan_interval: SCAN_INTERVAL,
            scan_settle_delay: SCAN_SETTLE_DELAY,
            scan_dir: ScanStore::default_dir(),
            default_window_secs: DEFAULT_WINDOW_SECS,
            heatmap_days: DEFAULT_HEATMAP_DAYS,
            default_hosts: true,
            extra_hosts: Vec::new(),
        }
    }
}

/// Label of a window preset, or the duration itself for custom windows.
pub fn window_label(secs: u64) -> String {
    WINDOW_PRESETS
        .iter()
        .find(|(_, s)| *s == secs)
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| crate::palette::format_duration(secs as f64))
}

/// Next wider preset, or `secs` when already at the widest.
pub fn wider_window(secs: u64) -> u64 {
    WINDOW_PRESETS
        .iter()
        .map(|(_, s)| *s)
        .find(|s| *s > secs)
        .unwrap_or(secs)
}

/// Next narrower preset, or `secs` when already at the narrowest.
pub fn narrower_window(secs: u64) -> u64 {
    WINDOW_PRESETS
        .iter()
        .rev()
        .map(|(_, s)| *s)
        .find(|s| *s < secs)
        .unwrap_or(secs)
}
