//! Bounded external command execution.
//!
//! Every OS tool the monitor shells out to (`iw`, `ping`, `nmcli`, `ip`) goes
//! through [`run_command_timed`], so no background unit can block longer than
//! its configured timeout.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ProbeError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Check if a command exists by running `which`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a command with a timeout and return its stdout.
///
/// Stdout is drained on a helper thread while the child runs so that large
/// outputs (a scan dump can be hundreds of kilobytes) never stall the child
/// on a full pipe. On timeout the child is killed and reaped.
pub fn run_command_timed(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ProbeError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ProbeError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    if let Some(handle) = reader {
                        let _ = handle.join();
                    }
                    return Err(ProbeError::Timeout {
                        program: program.to_string(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(ProbeError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
        }
    };

    let stdout = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(ProbeError::Exit {
            program: program.to_string(),
            status: status.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

/// Start a command and forget about it.
///
/// The child is reaped on a detached thread so it never lingers as a zombie;
/// its exit status is ignored.
pub fn spawn_detached(program: &str, args: &[&str], timeout: Duration) {
    let program = program.to_string();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    thread::spawn(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        if let Err(e) = run_command_timed(&program, &args, timeout) {
            log::debug!("detached command failed: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn run_command_echo() {
        let out = run_command_timed("echo", &["hello"], TIMEOUT).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn run_command_nonexistent() {
        let err = run_command_timed("/nonexistent/binary", &[], TIMEOUT).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[test]
    fn run_command_failing_status() {
        // `false` always exits with status 1
        let err = run_command_timed("false", &[], TIMEOUT).unwrap_err();
        assert!(matches!(err, ProbeError::Exit { .. }));
    }

    #[test]
    fn run_command_empty_output() {
        let out = run_command_timed("true", &[], TIMEOUT).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn run_command_times_out() {
        let started = Instant::now();
        let err = run_command_timed("sleep", &["5"], Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn run_command_large_output_does_not_stall() {
        let out = run_command_timed("seq", &["1", "200000"], TIMEOUT).unwrap();
        assert!(out.lines().count() == 200_000);
    }

    #[test]
    fn command_exists_true() {
        assert!(command_exists("echo"));
    }

    #[test]
    fn command_exists_false() {
        assert!(!command_exists("nonexistent_binary_xyz_12345"));
    }
}
