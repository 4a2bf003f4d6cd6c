use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use linkwatch_core::{IwBackend, Monitor, MonitorConfig, iw};

pub struct MonitorCommandConfig<'a> {
    pub interface: Option<&'a str>,
    pub refresh_secs: f64,
    pub extra_hosts: Vec<String>,
    pub default_hosts: bool,
    pub scan_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

pub fn run(cmd: MonitorCommandConfig<'_>) {
    let log_file = cmd.log_file.clone().unwrap_or_else(super::default_log_file);
    super::init_logging(Some(&log_file));

    let interface = super::require_interface(cmd.interface);
    let config = monitor_config(interface, &cmd);

    let backend = IwBackend::new(&config.interface)
        .with_timeouts(config.command_timeout, config.ping_timeout)
        .with_settle_delay(config.scan_settle_delay);
    let monitor = Arc::new(Monitor::new(config, Arc::new(backend)));
    monitor.start(iw::default_gateway().as_deref());

    let mut app = crate::tui::app::App::new(Arc::clone(&monitor));
    let result = app.run();
    monitor.stop();

    if let Err(e) = result {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}

fn monitor_config(interface: String, cmd: &MonitorCommandConfig<'_>) -> MonitorConfig {
    let mut config = MonitorConfig {
        interface,
        default_hosts: cmd.default_hosts,
        extra_hosts: cmd.extra_hosts.clone(),
        ..Default::default()
    };
    if cmd.refresh_secs.is_finite() && cmd.refresh_secs > 0.0 {
        config.refresh_interval = Duration::from_secs_f64(cmd.refresh_secs);
    }
    if let Some(dir) = &cmd.scan_dir {
        config.scan_dir = dir.clone();
    }
    config
}
