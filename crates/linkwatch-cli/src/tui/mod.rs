pub mod app;
pub mod heatmap_view;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use linkwatch_core::{LinkInfo, Monitor, MonitorConfig, ProbeBackend, ProbeError};

    use super::app::App;

    /// Associated on 5 GHz channel 36 with steady readings.
    pub struct StubBackend;

    impl ProbeBackend for StubBackend {
        fn link_info(&self) -> Result<LinkInfo, ProbeError> {
            Ok(LinkInfo {
                signal_dbm: Some(-58.0),
                rx_mbps: Some(433.3),
                tx_mbps: Some(390.0),
                width_mhz: Some(80.0),
                freq_mhz: Some(5180.0),
                ssid: Some("Studio".into()),
            })
        }

        fn latency(&self, _host: &str) -> Result<f64, ProbeError> {
            Ok(4.0)
        }

        fn refresh_scan_cache(&self) {}

        fn scan_dump(&self) -> Result<String, ProbeError> {
            Ok("BSS 01(on wlan0)\n\tfreq: 5180\n\tSSID: Studio\n".into())
        }
    }

    pub fn test_app(dir: &Path) -> App {
        let config = MonitorConfig {
            interface: "wlan-test".into(),
            scan_dir: dir.to_path_buf(),
            ping_interval: Duration::from_millis(5),
            ..Default::default()
        };
        App::new(Arc::new(Monitor::new(config, Arc::new(StubBackend))))
    }
}
