//! Blocking subprocess execution with a deadline.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use wait_timeout::ChildExt;

/// Subprocess errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read output of {program}: {source}")]
    Read {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Runs `command` to completion and returns its stdout.
///
/// Output is drained on helper threads so a chatty child cannot block on a
/// full pipe. A child still running at `timeout` is killed and reaped.
pub fn run(mut command: Command, stdin: Stdio, timeout: Duration) -> Result<String, ProcessError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(%program, ?timeout, "process timed out");
            return Err(ProcessError::TimedOut { program, timeout });
        }
        Err(source) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcessError::Wait { program, source });
        }
    };

    let stdout = collect(stdout).map_err(|source| ProcessError::Read {
        program: program.clone(),
        source,
    })?;
    if !status.success() {
        let stderr = collect(stderr).unwrap_or_default().trim().to_string();
        return Err(ProcessError::Failed {
            program,
            status,
            stderr,
        });
    }
    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    })
}

fn collect(handle: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match handle {
        None => Ok(String::new()),
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("output reader panicked"))),
    }
}
