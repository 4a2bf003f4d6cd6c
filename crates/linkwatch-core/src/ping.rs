//! Per-host latency probing.
//!
//! Each [`PingHost`] has its own worker thread that repeatedly issues one
//! latency probe and stores the result in the host's `latest` slot. The
//! collector samples that slot once per tick; the host's history lives in the
//! [`TimeSeriesStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::probe::ProbeBackend;
use crate::store::{HostId, TimeSeriesStore};

/// Pause between two probe attempts of the same host.
pub const PING_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct Latest {
    latency_ms: Option<f64>,
    error: Option<String>,
}

/// One probed host.
#[derive(Debug)]
pub struct PingHost {
    id: HostId,
    host: String,
    label: String,
    enabled: AtomicBool,
    latest: Mutex<Latest>,
}

impl PingHost {
    fn new(id: HostId, host: String, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| host.clone());
        Self {
            id,
            host,
            label,
            enabled: AtomicBool::new(true),
            latest: Mutex::new(Latest::default()),
        }
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Most recent latency, `None` before the first reply or after a failure.
    pub fn latest(&self) -> Option<f64> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latency_ms
    }

    /// Reason the most recent attempt failed, if it did.
    pub fn last_error(&self) -> Option<String> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone()
    }

    fn record(&self, latency_ms: Option<f64>, error: Option<String>) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.latency_ms = latency_ms;
        latest.error = error;
    }
}

/// Active set of probed hosts and their worker threads.
pub struct PingRegistry {
    backend: Arc<dyn ProbeBackend>,
    store: Arc<Mutex<TimeSeriesStore>>,
    hosts: RwLock<Vec<Arc<PingHost>>>,
    workers: Mutex<HashMap<HostId, JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    next_id: AtomicU64,
    interval: Duration,
}

impl PingRegistry {
    pub fn new(backend: Arc<dyn ProbeBackend>, store: Arc<Mutex<TimeSeriesStore>>) -> Self {
        Self {
            backend,
            store,
            hosts: RwLock::new(Vec::new()),
            workers: Mutex::new(HashMap::new()),
            running: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(1),
            interval: PING_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Register `host`, backfill its history and start probing it.
    pub fn add_host(&self, host: &str, label: Option<&str>) -> Arc<PingHost> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(PingHost::new(
            id,
            host.trim().to_string(),
            label.map(str::to_string),
        ));

        // Register in the store before the host becomes visible to the
        // collector so the next tick finds an aligned series.
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register_host(id);
        self.hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&entry));

        let handle = self.spawn_worker(Arc::clone(&entry));
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle);

        log::info!("ping host added: {} ({})", entry.label, entry.host);
        entry
    }

    /// Stop probing the host at `index` and drop its history.
    ///
    /// The worker is detached rather than joined; it exits after its current
    /// attempt.
    pub fn remove_host(&self, index: usize) -> Option<Arc<PingHost>> {
        let removed = {
            let mut hosts = self.hosts.write().unwrap_or_else(PoisonError::into_inner);
            if index >= hosts.len() {
                return None;
            }
            hosts[index].enabled.store(false, Ordering::Relaxed);
            hosts.remove(index)
        };
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_host(removed.id);
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&removed.id);
        log::info!("ping host removed: {} ({})", removed.label, removed.host);
        Some(removed)
    }

    /// Snapshot of the active hosts in display order.
    pub fn hosts(&self) -> Vec<Arc<PingHost>> {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest reading of every active host, keyed by id.
    pub fn latest_all(&self) -> Vec<(HostId, Option<f64>)> {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|h| (h.id, h.latest()))
            .collect()
    }

    /// Ask every worker to exit after its current attempt.
    pub fn stop_all(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop every worker and wait for it to exit.
    pub fn shutdown(&self) {
        self.stop_all();
        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in handles {
            let _ = handle.join();
        }
    }

    fn spawn_worker(&self, host: Arc<PingHost>) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        thread::spawn(move || {
            while running.load(Ordering::Relaxed) && host.is_enabled() {
                match backend.latency(&host.host) {
                    Ok(ms) => host.record(Some(ms), None),
                    Err(e) => {
                        log::debug!("ping {} failed: {e}", host.host);
                        host.record(None, Some(e.to_string()));
                    }
                }
                thread::sleep(interval);
            }
        })
    }
}

impl Drop for PingRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
