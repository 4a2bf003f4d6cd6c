//! Integration tests for linkwatch-core.
//!
//! These drive the whole pipeline with a scripted backend:
//! probes → store → windowed view → buckets → glyphs, and
//! scan → day file → heatmap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use linkwatch_core::palette::{SIGNAL_SCALE, signal_tone};
use linkwatch_core::sparkline::{block_chart, to_text};
use linkwatch_core::{
    Band, LinkInfo, Monitor, MonitorConfig, ProbeBackend, ProbeError, ScanOutcome,
    bucket_by_time, scan_store,
};

const SCAN_DUMP: &str = "BSS 00:11:22:33:44:55(on wlan0) -- associated
\tfreq: 2437
\tSSID: Office
\tDS Parameter set: channel 6
BSS 00:11:22:33:44:66(on wlan0)
\tfreq: 2412
\tSSID: Cafe
BSS 00:11:22:33:44:77(on wlan0)
\tfreq: 2412
\tSSID: Library
";

/// Scripted backend: signal walks down by one dBm per call, every third
/// link probe fails, and host `unreachable` never answers.
struct ScriptedBackend {
    link_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self {
            link_calls: AtomicUsize::new(0),
        }
    }
}

impl ProbeBackend for ScriptedBackend {
    fn link_info(&self) -> Result<LinkInfo, ProbeError> {
        let n = self.link_calls.fetch_add(1, Ordering::Relaxed);
        if n % 3 == 2 {
            return Err(ProbeError::Timeout {
                program: "iw".into(),
                timeout: Duration::from_secs(5),
            });
        }
        Ok(LinkInfo {
            signal_dbm: Some(-40.0 - n as f64),
            rx_mbps: Some(400.0),
            tx_mbps: Some(200.0),
            width_mhz: Some(80.0),
            freq_mhz: Some(2437.0),
            ssid: Some("Office".into()),
        })
    }

    fn latency(&self, host: &str) -> Result<f64, ProbeError> {
        if host == "unreachable" {
            return Err(ProbeError::Parse {
                program: "ping".into(),
                detail: "no reply".into(),
            });
        }
        Ok(12.5)
    }

    fn refresh_scan_cache(&self) {}

    fn scan_dump(&self) -> Result<String, ProbeError> {
        Ok(SCAN_DUMP.to_string())
    }
}

fn config(dir: &std::path::Path) -> MonitorConfig {
    MonitorConfig {
        interface: "wlan-test".into(),
        refresh_interval: Duration::from_millis(10),
        ping_interval: Duration::from_millis(5),
        scan_dir: dir.to_path_buf(),
        retention: 50,
        ..Default::default()
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn monitor_keeps_store_aligned_while_hosts_change() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Monitor::new(config(tmp.path()), Arc::new(ScriptedBackend::new()));
    monitor.start(Some("192.168.1.1"));

    let labels: Vec<_> = monitor
        .pings()
        .hosts()
        .iter()
        .map(|h| h.label().to_string())
        .collect();
    assert_eq!(labels, vec!["gateway", "internet"]);

    assert!(wait_for(|| monitor.store().lock().unwrap().len() >= 5));
    let late = monitor.add_host("unreachable");
    assert!(wait_for(|| monitor.store().lock().unwrap().len() >= 10));
    monitor.remove_host(0);

    {
        let store = monitor.store().lock().unwrap();
        assert!(store.is_aligned());
        let series = store.host_series(late.id()).unwrap();
        assert_eq!(series.len(), store.len());
        assert!(series.values().iter().all(Option::is_none));
    }

    monitor.stop();
    let snap = monitor.snapshot(linkwatch_core::unix_now(), None);
    assert_eq!(snap.hosts.len(), 2);
    assert_eq!(snap.hosts[0].label, "internet");
    assert_eq!(
        snap.hosts[1].last_error.as_deref(),
        Some("unexpected output from `ping`: no reply")
    );
    assert_eq!(snap.view.latency.len(), 2);
    assert!(snap.view.signal.failed().iter().any(|f| *f));
}

#[test]
fn retention_bounds_store_under_load() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Monitor::new(config(tmp.path()), Arc::new(ScriptedBackend::new()));
    monitor.start(None);
    assert!(wait_for(|| monitor.collector().ticks() >= 60));
    monitor.stop();

    let store = monitor.store().lock().unwrap();
    assert_eq!(store.len(), 50);
    assert!(store.is_aligned());
    assert!(store.time().windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn paused_monitor_stops_growing() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Monitor::new(config(tmp.path()), Arc::new(ScriptedBackend::new()));
    monitor.start(None);
    monitor.set_paused(true);
    // Let an in-progress iteration finish.
    thread::sleep(Duration::from_millis(30));
    let before = monitor.store().lock().unwrap().len();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(monitor.store().lock().unwrap().len(), before);
    assert!(monitor.snapshot(0.0, None).paused);
    monitor.stop();
}

#[test]
fn first_ticks_are_one_interval_apart() {
    let tmp = tempfile::tempdir().unwrap();
    let config = MonitorConfig {
        refresh_interval: Duration::from_millis(100),
        ..config(tmp.path())
    };
    let monitor = Monitor::new(config, Arc::new(ScriptedBackend::new()));
    monitor.start(None);
    assert!(wait_for(|| monitor.collector().ticks() >= 2));
    monitor.stop();

    let store = monitor.store().lock().unwrap();
    let time = store.time();
    assert!(time[1] - time[0] >= 0.09, "ticks {time:?}");
}

#[test]
fn startup_scan_feeds_heatmap() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Monitor::new(config(tmp.path()), Arc::new(ScriptedBackend::new()));
    monitor.start(None);

    assert!(wait_for(|| monitor.scanner().generation() >= 1));
    assert!(matches!(
        monitor.scanner().last_outcome(),
        Some(ScanOutcome::Saved {
            band: Band::TwoFour,
            networks: 3,
            ..
        })
    ));
    monitor.stop();

    let grid = monitor.heatmap(7, None, scan_store::today());
    assert_eq!(grid.band, Band::TwoFour);
    assert_eq!(grid.dates.len(), 7);
    let today_row = grid.cells.last().unwrap();
    assert_eq!(today_row[0], Some(2)); // Cafe, Library on channel 1
    assert_eq!(today_row[5], Some(1)); // Office on channel 6
    assert!(grid.cells[0].iter().all(Option::is_none));
    assert!(monitor.scan_store().last_scan_time(scan_store::today()).is_some());
}

#[test]
fn windowed_signal_renders_to_fixed_width_chart() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Monitor::new(config(tmp.path()), Arc::new(ScriptedBackend::new()));
    // Synthesize 120 one-second ticks without running the loop.
    for i in 0..120 {
        monitor.collector().sample_tick(1_000.0 + i as f64);
    }
    let snap = monitor.snapshot(1_119.0, Some(60.0));
    assert_eq!(snap.view.time.len(), 61);

    let buckets = bucket_by_time(snap.view.signal.values(), &snap.view.time, 60.0, 30, 1_119.0);
    assert_eq!(buckets.len(), 30);
    let chart = block_chart(&buckets, 2, SIGNAL_SCALE, signal_tone);
    assert_eq!(chart.len(), 2);
    assert!(chart.iter().all(|row| row.len() == 30));
    assert!(!to_text(&chart[1]).trim().is_empty());
}

#[test]
fn concurrent_readers_never_see_misaligned_store() {
    let tmp = tempfile::tempdir().unwrap();
    let monitor = Arc::new(Monitor::new(
        config(tmp.path()),
        Arc::new(ScriptedBackend::new()),
    ));
    monitor.start(Some("10.0.0.1"));

    let reader = {
        let monitor = Arc::clone(&monitor);
        thread::spawn(move || {
            for _ in 0..200 {
                let snap = monitor.snapshot(linkwatch_core::unix_now(), Some(600.0));
                let n = snap.view.time.len();
                assert_eq!(snap.view.signal.len(), n);
                for host in &snap.view.latency {
                    assert_eq!(host.series.len(), n);
                }
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    for i in 0..5 {
        let host = monitor.add_host(&format!("10.0.0.{}", 10 + i));
        thread::sleep(Duration::from_millis(10));
        let idx = monitor
            .pings()
            .hosts()
            .iter()
            .position(|h| h.id() == host.id())
            .unwrap();
        monitor.remove_host(idx);
    }

    reader.join().unwrap();
    monitor.stop();
}
