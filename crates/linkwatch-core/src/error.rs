//! Error types for every failure the monitor can observe.
//!
//! Background units never propagate these past their own loop: a failed probe
//! becomes a missing data point and its reason is logged. Only
//! [`StartupError`] is allowed to terminate the process.

use std::path::PathBuf;
use std::time::Duration;

/// One failed probe attempt (link info, ping, scan dump).
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Exit { program: String, status: String },
    #[error("`{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("unexpected output from `{program}`: {detail}")]
    Parse { program: String, detail: String },
    #[error("interface is not associated with an access point")]
    NotAssociated,
}

/// Scan file could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("scan store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scan file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A channel scan produced no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    InFlight,
    #[error(transparent)]
    Backend(#[from] ProbeError),
}

/// Fatal prerequisites checked once before the dashboard starts.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("required tool `{0}` was not found on PATH")]
    MissingTool(&'static str),
    #[error("no wireless interfaces found")]
    NoWirelessInterface,
    #[error("wireless interface `{0}` does not exist")]
    UnknownInterface(String),
}
