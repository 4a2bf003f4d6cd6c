//! Linux probe backend built on `iw`, `ping`, `nmcli` and `ip`.
//!
//! Each probe is one bounded invocation of an external tool followed by a
//! line-oriented parse of its stdout. The parsers are plain functions so they
//! can be tested against captured output.

use std::thread;
use std::time::Duration;

use crate::command::{command_exists, run_command_timed, spawn_detached};
use crate::error::{ProbeError, StartupError};
use crate::probe::{LinkInfo, ProbeBackend};

/// Timeout for `iw`, `ip` and `nmcli` invocations.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-attempt `ping` deadline.
pub const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between requesting a cache refresh and dumping the scan results.
pub const SCAN_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// [`ProbeBackend`] for one wireless interface on Linux.
#[derive(Debug, Clone)]
pub struct IwBackend {
    interface: String,
    command_timeout: Duration,
    ping_timeout: Duration,
    settle_delay: Duration,
}

impl IwBackend {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            command_timeout: COMMAND_TIMEOUT,
            ping_timeout: PING_TIMEOUT,
            settle_delay: SCAN_SETTLE_DELAY,
        }
    }

    pub fn with_timeouts(mut self, command: Duration, ping: Duration) -> Self {
        self.command_timeout = command;
        self.ping_timeout = ping;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl ProbeBackend for IwBackend {
    fn link_info(&self) -> Result<LinkInfo, ProbeError> {
        let out = run_command_timed(
            "iw",
            &["dev", &self.interface, "link"],
            self.command_timeout,
        )?;
        parse_link_info(&out)
    }

    fn latency(&self, host: &str) -> Result<f64, ProbeError> {
        // `-W` takes whole seconds.
        let wait = self.ping_timeout.as_secs().max(1).to_string();
        let out = run_command_timed(
            "ping",
            &["-c", "1", "-W", &wait, host],
            self.ping_timeout + Duration::from_secs(1),
        )?;
        parse_ping_latency(&out).ok_or_else(|| ProbeError::Parse {
            program: "ping".into(),
            detail: "no time= field in reply".into(),
        })
    }

    fn refresh_scan_cache(&self) {
        spawn_detached("nmcli", &["device", "wifi", "rescan"], self.command_timeout);
        thread::sleep(self.settle_delay);
    }

    fn scan_dump(&self) -> Result<String, ProbeError> {
        run_command_timed(
            "iw",
            &["dev", &self.interface, "scan", "dump"],
            self.command_timeout,
        )
    }

    fn name(&self) -> &str {
        "iw"
    }
}

/// Fail fast when the tools the dashboard depends on are absent.
pub fn check_prerequisites() -> Result<(), StartupError> {
    if !command_exists("iw") {
        return Err(StartupError::MissingTool("iw"));
    }
    Ok(())
}

/// Names of all wireless interfaces reported by `iw dev`.
pub fn wireless_interfaces() -> Result<Vec<String>, ProbeError> {
    let out = run_command_timed("iw", &["dev"], COMMAND_TIMEOUT)?;
    Ok(parse_interfaces(&out))
}

/// Pick the interface to monitor: the requested one if it exists, otherwise
/// the first one `iw dev` lists.
pub fn select_interface(requested: Option<&str>) -> Result<String, StartupError> {
    let found = wireless_interfaces().unwrap_or_else(|e| {
        log::warn!("could not enumerate wireless interfaces: {e}");
        Vec::new()
    });
    match requested {
        Some(name) if found.iter().any(|i| i == name) => Ok(name.to_string()),
        Some(name) => Err(StartupError::UnknownInterface(name.to_string())),
        None => found
            .into_iter()
            .next()
            .ok_or(StartupError::NoWirelessInterface),
    }
}

/// Default gateway address from `ip route`, if any.
pub fn default_gateway() -> Option<String> {
    match run_command_timed("ip", &["route"], COMMAND_TIMEOUT) {
        Ok(out) => parse_default_gateway(&out),
        Err(e) => {
            log::debug!("default gateway lookup failed: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse the output of `iw dev <if> link`.
pub fn parse_link_info(text: &str) -> Result<LinkInfo, ProbeError> {
    if text.trim_start().starts_with("Not connected") {
        return Err(ProbeError::NotAssociated);
    }

    let mut info = LinkInfo::default();
    let mut rx_width = None;
    let mut tx_width = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("signal:") {
            info.signal_dbm = leading_number(rest);
        } else if let Some(rest) = line.strip_prefix("rx bitrate:") {
            info.rx_mbps = leading_number(rest);
            rx_width = channel_width(rest);
        } else if let Some(rest) = line.strip_prefix("tx bitrate:") {
            info.tx_mbps = leading_number(rest);
            tx_width = channel_width(rest);
        } else if let Some(rest) = line.strip_prefix("freq:") {
            info.freq_mhz = leading_number(rest);
        } else if let Some(rest) = line.strip_prefix("SSID:") {
            let ssid = rest.trim();
            if !ssid.is_empty() {
                info.ssid = Some(ssid.to_string());
            }
        }
    }

    info.width_mhz = rx_width.or(tx_width);
    Ok(info)
}

/// Round-trip time in ms from `ping` output (`time=12.3 ms`).
pub fn parse_ping_latency(text: &str) -> Option<f64> {
    let idx = text.find("time=")?;
    leading_number(&text[idx + "time=".len()..])
}

/// Interface names from `iw dev` (`Interface wlan0` lines).
pub fn parse_interfaces(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains("Interface"))
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

/// Gateway address from the `default via <addr> ...` line of `ip route`.
pub fn parse_default_gateway(text: &str) -> Option<String> {
    text.lines()
        .filter(|line| line.starts_with("default"))
        .find_map(|line| {
            let mut tokens = line.split_whitespace();
            tokens.find(|t| *t == "via")?;
            tokens.next().map(str::to_string)
        })
}

/// First decimal number (optionally signed) at the start of `s`.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Channel width from a bitrate line, e.g. `866.7 MBit/s VHT-MCS 9 80MHz`.
fn channel_width(rest: &str) -> Option<f64> {
    rest.split_whitespace()
        .filter_map(|t| t.strip_suffix("MHz"))
        .find_map(|n| n.parse::<f64>().ok())
}
