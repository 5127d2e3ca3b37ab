// src/exec/process.rs

//! Thin wrapper over `tokio::process` with line-based output capture.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::errors::{Result, TimeboxError};
use crate::exec::request::ExecutionRequest;

/// Lines buffered per stream before the reader waits for the consumer.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Captured output of a running process, one ordered channel per stream.
///
/// Each channel yields completed lines (terminator stripped) in emission
/// order and closes when the stream reaches EOF.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: mpsc::Receiver<String>,
    pub stderr: mpsc::Receiver<String>,
}

/// A started child process.
#[derive(Debug)]
pub struct ProcessHandle {
    command: String,
    pid: Option<u32>,
    child: Child,
    exit_code: Option<i32>,
}

impl ProcessHandle {
    /// Launch the process described by `request`.
    ///
    /// Fails with [`TimeboxError::ProcessStart`] if the executable cannot be
    /// launched (not found, permission denied, bad working directory).
    pub fn start(request: &ExecutionRequest) -> Result<(Self, ProcessOutput)> {
        let mut cmd = Command::new(request.command());
        cmd.args(request.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = request.working_dir() {
            cmd.current_dir(dir);
        }

        for (key, value) in request.env() {
            trace!(key = %key, "adding environment variable");
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| TimeboxError::ProcessStart {
            command: request.command().to_string(),
            source,
        })?;

        let pid = child.id();
        info!(command = %request.display(), pid, "process started");

        let output = ProcessOutput {
            stdout: spawn_line_reader(child.stdout.take(), "stdout", pid),
            stderr: spawn_line_reader(child.stderr.take(), "stderr", pid),
        };

        let handle = Self {
            command: request.command().to_string(),
            pid,
            child,
            exit_code: None,
        };
        Ok((handle, output))
    }

    /// OS process id, if the process had one when started.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking liveness check.
    pub fn is_alive(&mut self) -> bool {
        if self.exit_code.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                self.exit_code = Some(status.code().unwrap_or(-1));
                false
            }
            Err(e) => {
                debug!(command = %self.command, pid = self.pid, error = %e, "liveness check failed");
                false
            }
        }
    }

    /// Best-effort forced termination.
    ///
    /// Does nothing if the process already exited. Failures are logged and
    /// swallowed; this is the last resort and must not fail the caller.
    pub fn kill(&mut self) {
        if !self.is_alive() {
            return;
        }
        match self.child.start_kill() {
            Ok(()) => debug!(command = %self.command, pid = self.pid, "kill signal sent"),
            Err(e) => warn!(
                command = %self.command,
                pid = self.pid,
                error = %e,
                "failed to terminate process"
            ),
        }
    }

    /// Suspend until the process exits and return its exit code.
    ///
    /// A process terminated by a signal reports `-1`. Cancel-safe.
    pub async fn wait_for_exit(&mut self) -> Result<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        let status = self.child.wait().await?;
        let code = status.code().unwrap_or(-1);
        self.exit_code = Some(code);
        Ok(code)
    }

    /// Hand the child to a detached task that waits for it to exit, so a
    /// killed process is reaped without blocking the caller.
    pub fn reap_in_background(self) {
        if self.exit_code.is_some() {
            return;
        }
        let Self {
            command,
            pid,
            mut child,
            ..
        } = self;
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(command = %command, pid, ?status, "abandoned process reaped"),
                Err(e) => warn!(command = %command, pid, error = %e, "failed to reap abandoned process"),
            }
        });
    }
}

/// Read `reader` line by line on a background task and forward each line.
fn spawn_line_reader<R>(reader: Option<R>, stream: &'static str, pid: Option<u32>) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(LINE_CHANNEL_CAPACITY);

    let Some(reader) = reader else {
        return rx;
    };

    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.strip_suffix('\n').unwrap_or(&*text);
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    if tx.send(line.to_string()).await.is_err() {
                        // Consumer gone; nobody wants the rest.
                        break;
                    }
                }
                Err(e) => {
                    debug!(stream, pid, error = %e, "output read failed");
                    break;
                }
            }
        }

        trace!(stream, pid, "output reader finished");
    });

    rx
}
