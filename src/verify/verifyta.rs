//! Client for the `verifyta` command-line model checker.
//!
//! Each call writes the model and the query to fresh scratch files, runs
//!
//! ```text
//! verifyta -C -S 0 -H 32 -E <uncertainty> <model> <query>
//! ```
//!
//! and parses the interval out of stdout. Scratch files are owned by
//! `NamedTempFile` guards and removed when the call returns, whichever way it
//! returns.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{Verifier, parse_interval};
use crate::dispatch::CancelToken;
use crate::domain::{Interval, RunConfig};
use crate::error::AppError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct Verifyta {
    exe: PathBuf,
    uncertainty: f64,
}

struct RawOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl Verifyta {
    pub fn new(exe: impl Into<PathBuf>, uncertainty: f64) -> Self {
        Self {
            exe: exe.into(),
            uncertainty,
        }
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, AppError> {
        if !(config.uncertainty.is_finite() && config.uncertainty > 0.0 && config.uncertainty < 1.0) {
            return Err(AppError::config(format!(
                "Uncertainty must be in (0, 1) (got {}).",
                config.uncertainty
            )));
        }
        Ok(Self::new(config.verifier_path.clone(), config.uncertainty))
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    fn args(&self, model: &Path, query: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-C", "-S", "0", "-H", "32", "-E"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(self.uncertainty.to_string().into());
        args.push(model.as_os_str().to_owned());
        args.push(query.as_os_str().to_owned());
        args
    }

    fn run(&self, model: &Path, query: &Path, cancel: &CancelToken) -> Result<RawOutput, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::interrupted());
        }

        let mut command = Command::new(&self.exe);
        command
            .args(self.args(model, query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Keep the terminal's Ctrl-C away from the verifier; the sweep kills it on cancel.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);

        let mut child = command
            .spawn()
            .map_err(|e| AppError::tool(format!("Failed to start verifier '{}': {e}", self.exe.display())))?;

        // Drain both pipes concurrently so a chatty verifier cannot block on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = wait_or_kill(&mut child, cancel)?;

        Ok(RawOutput {
            status,
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

impl Verifier for Verifyta {
    fn verify(&self, model: &str, query: &str, cancel: &CancelToken) -> Result<Interval, AppError> {
        let model_file = scratch_file(".xml", model)?;
        let query_file = scratch_file(".q", query)?;

        let out = self.run(model_file.path(), query_file.path(), cancel)?;

        if !out.status.success() {
            // stderr travels in the error itself; stdout only goes to the debug log.
            debug!("Verifier stdout before failure:\n{}", out.stdout.trim_end());
            let diagnostics = out.stderr.trim_end();
            return Err(AppError::tool(format!(
                "Verifier exited with {}: {diagnostics}",
                out.status
            )));
        }

        parse_interval(&out.stdout)
    }
}

fn scratch_file(suffix: &str, contents: &str) -> Result<NamedTempFile, AppError> {
    let mut file = tempfile::Builder::new()
        .prefix("smc-sweep-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| AppError::io(format!("Failed to create scratch file: {e}")))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| AppError::io(format!("Failed to write scratch file '{}': {e}", file.path().display())))?;
    Ok(file)
}

fn wait_or_kill(child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus, AppError> {
    loop {
        match child.try_wait() {
            // A verifier that died alongside an interrupt reports the interrupt.
            Ok(Some(_)) if cancel.is_cancelled() => return Err(AppError::interrupted()),
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => return Err(AppError::tool(format!("Failed to wait for verifier: {e}"))),
        }
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AppError::interrupted());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String, AppError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| AppError::tool("Verifier output reader panicked."))?
        .map_err(|e| AppError::tool(format!("Failed to read verifier output: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use std::time::Instant;

    use super::*;
    use crate::error::ErrorKind;

    // Writing an executable while another test thread forks can fail with ETXTBSY.
    static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

    fn fake_verifier(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-verifyta");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Shell lines that log the model and query paths the verifier was given.
    fn record_scratch_paths(seen: &Path) -> String {
        format!(
            "echo \"$8\" > '{seen}'\necho \"$9\" >> '{seen}'",
            seen = seen.display()
        )
    }

    fn recorded_paths(seen: &Path) -> Vec<PathBuf> {
        fs::read_to_string(seen)
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect()
    }

    fn assert_scratch_removed(seen: &Path) {
        let paths = recorded_paths(seen);
        assert_eq!(paths.len(), 2, "verifier did not record its arguments");
        assert_ne!(paths[0], paths[1]);
        for p in &paths {
            assert!(!p.exists(), "scratch file {} was left behind", p.display());
        }
    }

    #[test]
    fn success_returns_interval_and_removes_scratch_files() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        let body = format!(
            "[ \"$1 $2 $3 $4 $5 $6 $7\" = \"-C -S 0 -H 32 -E 0.1\" ] || exit 9\n\
             {record}\n\
             grep -q 'tasks_lost' \"$9\" || exit 8\n\
             echo ' -- Formula is satisfied.'\necho 'Pr(<> ...) in [0.1,0.2] (95% CI)'",
            record = record_scratch_paths(&seen)
        );
        let exe = fake_verifier(dir.path(), &body);

        let client = Verifyta::new(exe, 0.1);
        let iv = client
            .verify("<nta/>", "Pr [<=10] ( <> tasks_lost > 0 )", &CancelToken::new())
            .unwrap();
        assert_eq!(iv, Interval { lower: 0.1, upper: 0.2 });
        assert_scratch_removed(&seen);
    }

    #[test]
    fn nonzero_exit_is_tool_error_with_diagnostics() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        let body = format!("{}\necho 'syntax error in model' >&2\nexit 3", record_scratch_paths(&seen));
        let exe = fake_verifier(dir.path(), &body);

        let err = Verifyta::new(exe, 0.1)
            .verify("<nta/>", "q", &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert!(err.message().contains("syntax error in model"));
        assert_scratch_removed(&seen);
    }

    #[test]
    fn unparsable_output_is_output_error() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        let body = format!("{}\necho 'Formula is NOT satisfied.'", record_scratch_paths(&seen));
        let exe = fake_verifier(dir.path(), &body);

        let err = Verifyta::new(exe, 0.1)
            .verify("<nta/>", "q", &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Output);
        assert_scratch_removed(&seen);
    }

    #[test]
    fn cancellation_kills_running_process() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("seen");
        let body = format!("{}\nexec sleep 10", record_scratch_paths(&seen));
        let exe = fake_verifier(dir.path(), &body);

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let watched = seen.clone();
        let handle = thread::spawn(move || {
            // Cancel once the verifier is known to be running.
            let deadline = Instant::now() + Duration::from_secs(5);
            while recorded_paths(&watched).len() < 2 && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            trigger.cancel();
        });

        let started = Instant::now();
        let err = Verifyta::new(exe, 0.1).verify("<nta/>", "q", &cancel).unwrap_err();
        handle.join().unwrap();
        assert_eq!(err.kind(), ErrorKind::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(8));
        assert_scratch_removed(&seen);
    }

    #[test]
    fn exit_after_cancel_is_an_interrupt() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut child = Command::new("sh").args(["-c", "exit 2"]).spawn().unwrap();
        thread::sleep(Duration::from_millis(200));
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = wait_or_kill(&mut child, &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interrupted);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn verifier_runs_in_its_own_process_group() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("pgrp");
        let body = format!(
            "echo \"$$ $(cut -d' ' -f5 /proc/$$/stat)\" > '{seen}'\n\
             echo 'Formula is satisfied'\necho 'Pr(<> ...) in [0.1,0.2]'",
            seen = seen.display()
        );
        let exe = fake_verifier(dir.path(), &body);

        Verifyta::new(exe, 0.1)
            .verify("<nta/>", "q", &CancelToken::new())
            .unwrap();
        let ids = fs::read_to_string(&seen).unwrap();
        let ids: Vec<&str> = ids.split_whitespace().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1], "verifier is not a process group leader");
    }

    #[test]
    fn missing_executable_is_tool_error() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let err = Verifyta::new("/nonexistent/verifyta", 0.1)
            .verify("<nta/>", "q", &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
    }

    #[test]
    fn uncertainty_is_validated() {
        let config = RunConfig {
            template: PathBuf::from("t.xml"),
            verifier_path: PathBuf::from("verifyta"),
            uncertainty: 0.0,
            time_bound: 1000,
            cache_dir: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            force_rerun: false,
            filter: None,
            jobs: None,
            export_csv: false,
        };
        assert!(Verifyta::from_config(&config).is_err());
    }
}
