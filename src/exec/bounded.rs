// src/exec/bounded.rs

//! Budget-bounded execution of a single external process.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::budget::Budget;
use crate::errors::Result;
use crate::exec::output::normalize_lines;
use crate::exec::process::{ProcessHandle, ProcessOutput};
use crate::exec::request::{ExecutionRequest, ExecutionResult, TIMED_OUT_EXIT_CODE};
use crate::report::{ConfirmationReporter, FailureReason, Operation};

/// Category attached to every event emitted by the executor.
pub const EXEC_CATEGORY: &str = "timebox::exec";

/// Runs processes under a [`Budget`] and reports each run as an operation.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    reporter: ConfirmationReporter,
}

/// What the race between exit and expiry produced.
struct Captured {
    exit_code: i32,
    timed_out: bool,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl BoundedExecutor {
    pub fn new(reporter: ConfirmationReporter) -> Self {
        Self { reporter }
    }

    /// Executor reporting through `tracing`.
    pub fn with_tracing() -> Self {
        Self::new(ConfirmationReporter::tracing(EXEC_CATEGORY))
    }

    /// Run `request` until it exits or `budget` expires, whichever is first.
    ///
    /// - Fails with `BudgetExceeded` (no process, no events) if the budget is
    ///   already spent.
    /// - Fails with `ProcessStart` if the process cannot be launched; the
    ///   operation is closed with a failure event first.
    /// - Otherwise always returns a result. Budget expiry kills the process
    ///   and yields [`TIMED_OUT_EXIT_CODE`]; a nonzero exit is reported on the
    ///   event side channel, never as an `Err`.
    pub async fn execute(&self, request: &ExecutionRequest, budget: &Budget) -> Result<ExecutionResult> {
        budget.record_entry(format!("Execute ({})", request.display()))?;

        let operation = self.reporter.begin(
            "execute",
            "Invoking {command} {args}",
            vec![request.command().to_string(), request.args().to_string()],
        );

        let (handle, output) = match ProcessHandle::start(request) {
            Ok(started) => started,
            Err(err) => {
                operation.fail(FailureReason::StartFailed {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        let captured = race(handle, output, &operation, budget).await;

        let result = ExecutionResult::new(
            captured.exit_code,
            normalize_lines(&captured.stdout),
            normalize_lines(&captured.stderr),
            captured.timed_out,
        );

        if result.exit_code == 0 {
            operation.succeed(
                "{command} {args} exited with {code}",
                vec![
                    request.command().to_string(),
                    request.args().to_string(),
                    result.exit_code.to_string(),
                ],
            );
        } else if captured.timed_out {
            operation.fail(FailureReason::BudgetExceeded {
                elapsed: budget.elapsed(),
            });
        } else {
            operation.fail(FailureReason::NonZeroExit {
                code: result.exit_code,
            });
        }

        Ok(result)
    }
}

/// Drain both output streams while racing process exit against expiry.
///
/// After a normal exit the loop keeps draining until both streams close; if
/// the budget expires during that drain the real exit code is kept.
async fn race(
    mut handle: ProcessHandle,
    mut output: ProcessOutput,
    operation: &Operation,
    budget: &Budget,
) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut exit_code: Option<i32> = None;
    let mut timed_out = false;

    loop {
        if exit_code.is_some() && !stdout_open && !stderr_open {
            break;
        }

        tokio::select! {
            line = output.stdout.recv(), if stdout_open => match line {
                Some(line) => {
                    operation.info("{data}", vec![line.clone()]);
                    stdout.push(line);
                }
                None => stdout_open = false,
            },

            line = output.stderr.recv(), if stderr_open => match line {
                Some(line) => {
                    operation.error("{data}", vec![line.clone()]);
                    stderr.push(line);
                }
                None => stderr_open = false,
            },

            status = handle.wait_for_exit(), if exit_code.is_none() => {
                let code = match status {
                    Ok(code) => code,
                    Err(e) => {
                        warn!(pid = handle.id(), error = %e, "waiting for process failed");
                        -1
                    }
                };
                info!(pid = handle.id(), exit_code = code, "process exited");
                exit_code = Some(code);
            }

            _ = budget.expired() => {
                if exit_code.is_none() {
                    info!(
                        pid = handle.id(),
                        elapsed_ms = budget.elapsed().as_millis() as u64,
                        "budget expired; killing process"
                    );
                    handle.kill();
                    timed_out = true;
                } else {
                    debug!(pid = handle.id(), "budget expired while draining output");
                }
                take_pending(&mut output, operation, &mut stdout, &mut stderr);
                break;
            }
        }
    }

    if timed_out {
        handle.reap_in_background();
    }

    Captured {
        exit_code: if timed_out {
            TIMED_OUT_EXIT_CODE
        } else {
            exit_code.unwrap_or(-1)
        },
        timed_out,
        stdout,
        stderr,
    }
}

/// Move lines the readers already delivered into the capture buffers.
fn take_pending(
    output: &mut ProcessOutput,
    operation: &Operation,
    stdout: &mut Vec<String>,
    stderr: &mut Vec<String>,
) {
    while let Ok(line) = output.stdout.try_recv() {
        operation.info("{data}", vec![line.clone()]);
        stdout.push(line);
    }
    while let Ok(line) = output.stderr.try_recv() {
        operation.error("{data}", vec![line.clone()]);
        stderr.push(line);
    }
}

/// Run `command args` with a tracing-backed executor.
pub async fn execute(
    command: &str,
    args: &str,
    working_dir: Option<&Path>,
    budget: &Budget,
) -> Result<ExecutionResult> {
    let mut request = ExecutionRequest::new(command, args);
    if let Some(dir) = working_dir {
        request = request.with_working_dir(dir);
    }
    BoundedExecutor::with_tracing().execute(&request, budget).await
}
