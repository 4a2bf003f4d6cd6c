//! Channel scanning: scan-dump parsing and background scan scheduling.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::band::{Band, freq_to_channel};
use crate::error::ScanError;
use crate::probe::ProbeBackend;
use crate::scan_store::ScanStore;
use crate::snapshot::{ChannelOccupancy, ScanSnapshot};

/// Default period between background scans.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(3600);

/// Parse `iw dev <if> scan dump` output into an occupancy snapshot.
///
/// Records start at lines beginning with `BSS `. A record's channel comes
/// from its `DS Parameter set: channel N` line, else from its `freq:` line.
/// Records whose channel is unknown or outside `band` are dropped. Every
/// channel of `band` is present in the result, possibly with count 0.
pub fn parse_scan_dump(text: &str, band: Band, timestamp: i64) -> ScanSnapshot {
    let plan = band.channels();
    let mut raw: BTreeMap<u32, (u32, BTreeSet<String>)> = plan
        .iter()
        .map(|&ch| (ch, (0, BTreeSet::new())))
        .collect();

    let mut record = BssRecord::default();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("BSS ") {
            record.flush_into(&mut raw);
            continue;
        }
        if let Some(rest) = line.strip_prefix("freq:") {
            record.freq = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("DS Parameter set: channel") {
            record.channel = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("SSID:") {
            let ssid = rest.trim();
            if !ssid.is_empty() {
                record.ssid = Some(ssid.to_string());
            }
        }
    }
    record.flush_into(&mut raw);

    let channels = raw
        .into_iter()
        .map(|(ch, (count, names))| {
            let count = if names.is_empty() {
                count
            } else {
                names.len() as u32
            };
            (
                ch,
                ChannelOccupancy {
                    count,
                    networks: names.into_iter().collect(),
                },
            )
        })
        .collect();

    ScanSnapshot {
        timestamp,
        band: Some(band),
        channels,
    }
}

#[derive(Default)]
struct BssRecord {
    freq: Option<f64>,
    channel: Option<u32>,
    ssid: Option<String>,
}

impl BssRecord {
    fn flush_into(&mut self, raw: &mut BTreeMap<u32, (u32, BTreeSet<String>)>) {
        let record = std::mem::take(self);
        let channel = record.channel.or_else(|| record.freq.and_then(freq_to_channel));
        if let Some(ch) = channel
            && let Some((count, names)) = raw.get_mut(&ch)
        {
            *count += 1;
            if let Some(ssid) = record.ssid {
                names.insert(ssid);
            }
        }
    }
}

/// How the most recent background scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Saved {
        band: Band,
        networks: usize,
        timestamp: i64,
    },
    Failed(String),
}

/// Runs scans on demand and in the background, one at a time.
///
/// Clones share the same in-flight flag, generation counter and outcome.
#[derive(Clone)]
pub struct ChannelScanner {
    backend: Arc<dyn ProbeBackend>,
    store: ScanStore,
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    last_outcome: Arc<Mutex<Option<ScanOutcome>>>,
    last_triggered: Arc<Mutex<Option<Instant>>>,
    interval: Duration,
}

impl ChannelScanner {
    pub fn new(backend: Arc<dyn ProbeBackend>, store: ScanStore) -> Self {
        Self {
            backend,
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            last_outcome: Arc::new(Mutex::new(None)),
            last_triggered: Arc::new(Mutex::new(None)),
            interval: SCAN_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn store(&self) -> &ScanStore {
        &self.store
    }

    /// Band of the current association, 2.4 GHz when it cannot be read.
    pub fn current_band(&self) -> Band {
        Band::infer(self.backend.link_info().ok().and_then(|info| info.freq_mhz))
    }

    /// Run one scan on the calling thread.
    ///
    /// `band` defaults to the band of the current association. With
    /// `refresh`, the backend's scan cache is refreshed first.
    pub fn scan(&self, band: Option<Band>, refresh: bool) -> Result<ScanSnapshot, ScanError> {
        let band = band.unwrap_or_else(|| self.current_band());
        if refresh {
            self.backend.refresh_scan_cache();
        }
        let dump = self.backend.scan_dump()?;
        let snapshot = parse_scan_dump(&dump, band, chrono::Utc::now().timestamp());
        log::info!(
            "{} scan on {band}: {} networks on {} channels",
            self.backend.name(),
            snapshot.network_count(),
            snapshot.channels.values().filter(|c| c.count > 0).count()
        );
        Ok(snapshot)
    }

    /// True while a background scan is running.
    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Bumped after every background scan that saved a snapshot.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn last_outcome(&self) -> Option<ScanOutcome> {
        self.last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a background scan unless one is already running.
    pub fn start_background(&self, band: Option<Band>) -> Result<(), ScanError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::InFlight);
        }

        let this = self.clone();
        thread::spawn(move || {
            let _guard = InFlightGuard(Arc::clone(&this.in_flight));
            let outcome = match this.scan(band, true) {
                Ok(snapshot) => match this.store.append(&snapshot) {
                    Ok(_) => ScanOutcome::Saved {
                        band: snapshot.band.unwrap_or_default(),
                        networks: snapshot.network_count(),
                        timestamp: snapshot.timestamp,
                    },
                    Err(e) => {
                        log::warn!("could not save scan: {e}");
                        ScanOutcome::Failed(e.to_string())
                    }
                },
                Err(e) => {
                    log::info!("background scan failed: {e}");
                    ScanOutcome::Failed(e.to_string())
                }
            };
            let saved = matches!(outcome, ScanOutcome::Saved { .. });
            *this
                .last_outcome
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
            // Readers that see the new generation also see its outcome.
            if saved {
                this.generation.fetch_add(1, Ordering::AcqRel);
            }
        });
        Ok(())
    }

    /// Start a background scan if the scan interval has elapsed since the
    /// last trigger. The first call always triggers. Returns true when a scan
    /// was started.
    pub fn trigger_if_due(&self, now: Instant) -> bool {
        {
            let mut last = self
                .last_triggered
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(prev) = *last
                && now.saturating_duration_since(prev) < self.interval
            {
                return false;
            }
            *last = Some(now);
        }
        self.start_background(None).is_ok()
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
