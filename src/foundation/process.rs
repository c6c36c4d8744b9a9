//! Blocking subprocess helpers with a hard timeout.
//!
//! The recognizer and codec tools are black boxes; a stuck child must surface as
//! [`ProcessError::TimedOut`] rather than hang the job.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("'{program}' exited with status {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("waiting for '{program}' failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub(crate) type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

pub(crate) fn spawn_drain<R: Read + Send + 'static>(mut r: R) -> Drain {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

pub(crate) fn join_drain(handle: Option<Drain>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .and_then(|r| r.ok())
        .unwrap_or_default()
}

pub(crate) fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

/// Run `cmd` to completion, capturing stdout/stderr, killing it after `timeout`.
///
/// A non-zero exit status is reported as [`ProcessError::Failed`].
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<ProcessOutput, ProcessError> {
    let program = program_name(cmd);
    tracing::debug!(%program, ?timeout, "spawning subprocess");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().map(spawn_drain);
    let stderr = child.stderr.take().map(spawn_drain);

    // On timeout the drain threads are detached: a grandchild may still hold the pipes open.
    let status = wait_with_timeout(&mut child, &program, timeout)?;
    let out = ProcessOutput {
        stdout: join_drain(stdout),
        stderr: join_drain(stderr),
    };

    if !status.success() {
        return Err(ProcessError::Failed {
            program,
            status,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(out)
}

/// Poll `child` until it exits or `timeout` elapses; on timeout the child is killed and reaped.
pub fn wait_with_timeout(
    child: &mut Child,
    program: &str,
    timeout: Duration,
) -> Result<ExitStatus, ProcessError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(source) => {
                return Err(ProcessError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(%program, ?timeout, "subprocess timed out and was killed");
            return Err(ProcessError::TimedOut {
                program: program.to_string(),
                timeout,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Return `true` when `program -version` (or `--version`) runs successfully.
pub fn is_tool_available(program: &str, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/process.rs"]
mod tests;
