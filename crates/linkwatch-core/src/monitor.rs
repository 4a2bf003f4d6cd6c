//! The monitor context: one object owning every background unit.
//!
//! The terminal front-end holds a [`Monitor`], starts it once, reads
//! [`LiveSnapshot`]s from it on every frame and stops it on exit.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use chrono::NaiveDate;

use crate::band::Band;
use crate::collector::MetricsCollector;
use crate::config::{INTERNET_HOST, MonitorConfig};
use crate::heatmap::{self, HeatmapGrid};
use crate::ping::{PingHost, PingRegistry};
use crate::probe::{LinkInfo, ProbeBackend};
use crate::scan_store::ScanStore;
use crate::scanner::{ChannelScanner, ScanOutcome};
use crate::store::{HostId, Metric, TimeSeriesStore, WindowedView};

/// Display state of one ping host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostStatus {
    pub id: HostId,
    pub host: String,
    pub label: String,
    pub latest: Option<f64>,
    pub last_error: Option<String>,
}

impl HostStatus {
    fn of(host: &PingHost) -> Self {
        Self {
            id: host.id(),
            host: host.host().to_string(),
            label: host.label().to_string(),
            latest: host.latest(),
            last_error: host.last_error(),
        }
    }
}

/// Everything the live view draws, copied out under one store lock.
#[derive(Debug, Clone)]
pub struct LiveSnapshot {
    pub view: WindowedView,
    pub hosts: Vec<HostStatus>,
    pub link: Option<LinkInfo>,
    pub signal_error: Option<String>,
    pub rates_error: Option<String>,
    pub ticks: usize,
    pub paused: bool,
    pub scanning: bool,
    pub last_scan: Option<ScanOutcome>,
}

pub struct Monitor {
    config: MonitorConfig,
    store: Arc<Mutex<TimeSeriesStore>>,
    pings: Arc<PingRegistry>,
    collector: Arc<MetricsCollector>,
    scanner: ChannelScanner,
    collector_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, backend: Arc<dyn ProbeBackend>) -> Self {
        let store = Arc::new(Mutex::new(TimeSeriesStore::new(config.retention)));
        let pings = Arc::new(
            PingRegistry::new(Arc::clone(&backend), Arc::clone(&store))
                .with_interval(config.ping_interval),
        );
        let collector = Arc::new(MetricsCollector::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            Arc::clone(&pings),
            config.refresh_interval,
        ));
        let scanner = ChannelScanner::new(backend, ScanStore::new(&config.scan_dir))
            .with_interval(config.scan_interval);

        Self {
            config,
            store,
            pings,
            collector,
            scanner,
            collector_handle: Mutex::new(None),
        }
    }

    /// Register the startup hosts and start the collector loop, which takes
    /// the first sample at once and also schedules the periodic scans.
    ///
    /// `gateway` is the default gateway address, probed as `gateway`.
    pub fn start(&self, gateway: Option<&str>) {
        if self.config.default_hosts {
            if let Some(gw) = gateway {
                self.pings.add_host(gw, Some("gateway"));
            }
            self.pings.add_host(INTERNET_HOST, Some("internet"));
        }
        for host in &self.config.extra_hosts {
            self.pings.add_host(host, None);
        }

        let handle = self.collector.spawn(Some(self.scanner.clone()));
        *self
            .collector_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        log::info!(
            "monitoring {} with {} ping hosts",
            self.config.interface,
            self.pings.len()
        );
    }

    /// Stop the collector and every ping worker and wait for them.
    pub fn stop(&self) {
        self.collector.stop();
        self.pings.shutdown();
        let handle = self
            .collector_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        log::info!("monitor stopped");
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<Mutex<TimeSeriesStore>> {
        &self.store
    }

    pub fn pings(&self) -> &PingRegistry {
        &self.pings
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    pub fn scanner(&self) -> &ChannelScanner {
        &self.scanner
    }

    pub fn scan_store(&self) -> &ScanStore {
        self.scanner.store()
    }

    pub fn set_paused(&self, paused: bool) {
        self.collector.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.collector.is_paused()
    }

    pub fn add_host(&self, host: &str) -> Arc<PingHost> {
        self.pings.add_host(host, None)
    }

    pub fn remove_host(&self, index: usize) -> Option<Arc<PingHost>> {
        self.pings.remove_host(index)
    }

    /// Band of the association last seen by the collector.
    pub fn current_band(&self) -> Band {
        Band::infer(self.collector.last_link().and_then(|l| l.freq_mhz))
    }

    /// Copy of the store limited to `window_secs` before `now`.
    pub fn snapshot(&self, now: f64, window_secs: Option<f64>) -> LiveSnapshot {
        let (view, ticks, signal_error, rates_error) = {
            let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            (
                store.windowed_view(now, window_secs),
                store.len(),
                store.last_error(Metric::Signal).map(str::to_string),
                store.last_error(Metric::Rates).map(str::to_string),
            )
        };
        LiveSnapshot {
            view,
            hosts: self.pings.hosts().iter().map(|h| HostStatus::of(h)).collect(),
            link: self.collector.last_link(),
            signal_error,
            rates_error,
            ticks,
            paused: self.is_paused(),
            scanning: self.scanner.is_scanning(),
            last_scan: self.scanner.last_outcome(),
        }
    }

    /// Heatmap for the `days` ending `today`; `band` defaults to the band of
    /// the current association.
    pub fn heatmap(&self, days: u32, band: Option<Band>, today: NaiveDate) -> HeatmapGrid {
        let band = band.unwrap_or_else(|| self.current_band());
        heatmap::build(self.scanner.store(), days, band, today)
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.collector.stop();
        self.pings.stop_all();
    }
}
