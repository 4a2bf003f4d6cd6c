//! Periodic link sampling into the time-series store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::ping::PingRegistry;
use crate::probe::{LinkInfo, ProbeBackend};
use crate::scanner::ChannelScanner;
use crate::store::{LinkSample, Metric, TimeSeriesStore};

/// Seconds since the unix epoch as a float.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Samples the link once per tick and appends one aligned tuple to the store.
pub struct MetricsCollector {
    backend: Arc<dyn ProbeBackend>,
    store: Arc<Mutex<TimeSeriesStore>>,
    pings: Arc<PingRegistry>,
    last_link: Mutex<Option<LinkInfo>>,
    paused: AtomicBool,
    running: AtomicBool,
    ticks: AtomicU64,
    interval: Duration,
}

impl MetricsCollector {
    pub fn new(
        backend: Arc<dyn ProbeBackend>,
        store: Arc<Mutex<TimeSeriesStore>>,
        pings: Arc<PingRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            pings,
            last_link: Mutex::new(None),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
            interval,
        }
    }

    /// Probe the link once and append one tick stamped `now`.
    ///
    /// The probe runs without holding the store lock; the append itself is a
    /// single critical section so no reader sees a partially written tick.
    pub fn sample_tick(&self, now: f64) {
        let probe = self.backend.link_info();
        let (sample, reasons) = match &probe {
            Ok(info) => (
                LinkSample {
                    signal_dbm: info.signal_dbm,
                    rx_mbps: info.rx_mbps,
                    tx_mbps: info.tx_mbps,
                    width_mhz: info.width_mhz,
                },
                [
                    info.signal_dbm.is_none().then(|| "signal not reported".to_string()),
                    info.rx_mbps.is_none().then(|| "bitrate not reported".to_string()),
                    info.width_mhz.is_none().then(|| "width not reported".to_string()),
                ],
            ),
            Err(e) => {
                log::debug!("link probe failed: {e}");
                let reason = e.to_string();
                (
                    LinkSample::default(),
                    [Some(reason.clone()), Some(reason.clone()), Some(reason)],
                )
            }
        };
        *self.last_link.lock().unwrap_or_else(PoisonError::into_inner) = probe.ok();

        let latency = self.pings.latest_all();

        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        store.push_tick(now, sample, &latency);
        let [signal, rates, width] = reasons;
        store.set_last_error(Metric::Signal, signal);
        store.set_last_error(Metric::Rates, rates);
        store.set_last_error(Metric::Bandwidth, width);
        drop(store);

        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Start the sampling loop on its own thread.
    ///
    /// While not paused, each iteration samples one tick and, if a scanner is
    /// given, lets it start a periodic scan when one is due.
    pub fn spawn(self: &Arc<Self>, scanner: Option<ChannelScanner>) -> JoinHandle<()> {
        self.running.store(true, Ordering::Relaxed);
        let this = Arc::clone(self);
        thread::spawn(move || {
            while this.running.load(Ordering::Relaxed) {
                if !this.is_paused() {
                    this.sample_tick(unix_now());
                    if let Some(scanner) = &scanner
                        && scanner.trigger_if_due(Instant::now())
                    {
                        log::info!("periodic channel scan started");
                    }
                }
                thread::sleep(this.interval);
            }
            log::debug!("collector stopped");
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Ticks sampled since start.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Most recent successful link reading.
    pub fn last_link(&self) -> Option<LinkInfo> {
        self.last_link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use std::sync::atomic::AtomicUsize;

    /// Alternates between a full reading and a failure.
    struct FlakyBackend {
        calls: AtomicUsize,
    }

    impl ProbeBackend for FlakyBackend {
        fn link_info(&self) -> Result<LinkInfo, ProbeError> {
            if self.calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                Ok(LinkInfo {
                    signal_dbm: Some(-55.0),
                    rx_mbps: Some(300.0),
                    tx_mbps: Some(200.0),
                    width_mhz: Some(40.0),
                    freq_mhz: Some(2437.0),
                    ssid: Some("Lab".into()),
                })
            } else {
                Err(ProbeError::NotAssociated)
            }
        }

        fn latency(&self, _host: &str) -> Result<f64, ProbeError> {
            Ok(7.0)
        }

        fn refresh_scan_cache(&self) {}

        fn scan_dump(&self) -> Result<String, ProbeError> {
            Ok(String::new())
        }
    }

    fn collector() -> (Arc<MetricsCollector>, Arc<Mutex<TimeSeriesStore>>) {
        let backend: Arc<dyn ProbeBackend> = Arc::new(FlakyBackend {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(Mutex::new(TimeSeriesStore::new(100)));
        let pings = Arc::new(PingRegistry::new(Arc::clone(&backend), Arc::clone(&store)));
        let c = MetricsCollector::new(
            backend,
            Arc::clone(&store),
            pings,
            Duration::from_millis(5),
        );
        (Arc::new(c), store)
    }

    #[test]
    fn failed_probe_still_appends_a_tick() {
        let (c, store) = collector();
        c.sample_tick(1.0);
        c.sample_tick(2.0);

        let s = store.lock().unwrap();
        assert_eq!(s.len(), 2);
        assert!(s.is_aligned());
        assert_eq!(s.signal().values(), &[Some(-55.0), None]);
        assert_eq!(s.rates_failed(), &[false, true]);
        assert!(s.last_error(Metric::Signal).unwrap().contains("not associated"));
        assert_eq!(c.ticks(), 2);
    }

    #[test]
    fn last_link_tracks_latest_probe() {
        let (c, _) = collector();
        c.sample_tick(1.0);
        let link = c.last_link().unwrap();
        assert_eq!(link.ssid.as_deref(), Some("Lab"));
        assert_eq!(link.channel(), Some(6));
        c.sample_tick(2.0);
        assert!(c.last_link().is_none());
    }

    #[test]
    fn loop_samples_until_stopped() {
        let (c, store) = collector();
        let handle = c.spawn(None);
        thread::sleep(Duration::from_millis(60));
        c.stop();
        handle.join().unwrap();
        assert!(store.lock().unwrap().len() >= 2);
    }

    #[test]
    fn paused_loop_does_not_sample() {
        let (c, store) = collector();
        c.set_paused(true);
        let handle = c.spawn(None);
        thread::sleep(Duration::from_millis(40));
        c.stop();
        handle.join().unwrap();
        assert!(store.lock().unwrap().is_empty());
        assert!(c.is_paused());
    }
}
