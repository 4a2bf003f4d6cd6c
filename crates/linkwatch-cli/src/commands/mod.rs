pub mod cleanup;
pub mod heatmap;
pub mod interfaces;
pub mod monitor;
pub mod scan;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use linkwatch_core::scan_store::config_home;
use linkwatch_core::{Band, IwBackend, ProbeBackend, ScanStore, StartupError, iw};

/// Initialize `env_logger` (default filter `info`, `RUST_LOG` overrides).
///
/// With `log_file`, records go to that file so they never reach the
/// terminal the dashboard is drawing on. Falls back to stderr when the file
/// cannot be opened.
pub fn init_logging(log_file: Option<&Path>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {e}", path.display()),
        }
    }

    let _ = builder.try_init();
}

/// Default dashboard log file.
pub fn default_log_file() -> PathBuf {
    config_home().join("linkwatch").join("linkwatch.log")
}

/// Check prerequisites and resolve the interface, exiting with status 1 when
/// the dashboard cannot run on this machine.
pub fn require_interface(requested: Option<&str>) -> String {
    match iw::check_prerequisites().and_then(|()| iw::select_interface(requested)) {
        Ok(iface) => iface,
        Err(e) => exit_startup(e),
    }
}

pub fn exit_startup(e: StartupError) -> ! {
    log::error!("startup failed: {e}");
    eprintln!("Error: {e}");
    if matches!(e, StartupError::MissingTool(_)) {
        eprintln!("Install the `iw` package for your distribution and try again.");
    }
    std::process::exit(1);
}

pub fn scan_store(dir: Option<PathBuf>) -> ScanStore {
    ScanStore::new(dir.unwrap_or_else(ScanStore::default_dir))
}

/// Band of the current association when one can be read without failing
/// the command; 2.4 GHz otherwise.
pub fn detect_band() -> Band {
    if iw::check_prerequisites().is_err() {
        return Band::default();
    }
    match iw::select_interface(None) {
        Ok(iface) => {
            let freq = IwBackend::new(iface)
                .link_info()
                .ok()
                .and_then(|info| info.freq_mhz);
            Band::infer(freq)
        }
        Err(_) => Band::default(),
    }
}
