//! Probe backend abstraction.
//!
//! The collector, ping workers and scanner never shell out directly; they go
//! through a [`ProbeBackend`] so the whole pipeline can be driven by a
//! scripted backend in tests.

use serde::Serialize;

use crate::band::{Band, freq_to_channel};
use crate::error::ProbeError;

/// One reading of the current association.
///
/// Every field is independently optional: `iw` omits the bitrate lines while
/// roaming and the signal line when the driver does not report it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkInfo {
    pub signal_dbm: Option<f64>,
    pub rx_mbps: Option<f64>,
    pub tx_mbps: Option<f64>,
    pub width_mhz: Option<f64>,
    pub freq_mhz: Option<f64>,
    pub ssid: Option<String>,
}

impl LinkInfo {
    /// Band of the association, if a frequency was reported.
    pub fn band(&self) -> Option<Band> {
        self.freq_mhz.map(Band::from_frequency)
    }

    /// Channel number of the association, if the frequency is known.
    pub fn channel(&self) -> Option<u32> {
        self.freq_mhz.and_then(freq_to_channel)
    }
}

/// Source of link, latency and scan data.
///
/// Implementations must be cheap to share across threads; every call is a
/// single bounded attempt.
pub trait ProbeBackend: Send + Sync {
    /// Current association parameters.
    fn link_info(&self) -> Result<LinkInfo, ProbeError>;

    /// Round-trip latency to `host` in milliseconds, one attempt.
    fn latency(&self, host: &str) -> Result<f64, ProbeError>;

    /// Ask the OS to refresh its scan cache. Fire-and-forget.
    fn refresh_scan_cache(&self);

    /// Raw dump of known access points, in `iw dev <if> scan dump` format.
    fn scan_dump(&self) -> Result<String, ProbeError>;

    /// Short backend name for logs.
    fn name(&self) -> &str {
        "backend"
    }
}
