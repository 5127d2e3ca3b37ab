// tests/process_handle.rs
#![cfg(unix)]

mod common;
use crate::common::builders::sh;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use timebox::errors::TimeboxError;
use timebox::exec::{ExecutionRequest, ProcessHandle};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn exit_code_is_reported() -> TestResult {
    init_tracing();

    let (mut handle, _output) = ProcessHandle::start(&sh("exit 7"))?;
    assert!(handle.id().is_some());

    let code = with_timeout(handle.wait_for_exit()).await?;
    assert_eq!(code, 7);
    assert!(!handle.is_alive());

    // A second wait returns the cached code.
    assert_eq!(handle.wait_for_exit().await?, 7);
    Ok(())
}

#[tokio::test]
async fn lines_arrive_in_order_and_channels_close_at_eof() -> TestResult {
    let (mut handle, mut output) =
        ProcessHandle::start(&sh("printf 'one\\ntwo\\nthree'; echo err 1>&2"))?;

    let mut stdout = Vec::new();
    while let Some(line) = with_timeout(output.stdout.recv()).await {
        stdout.push(line);
    }
    let mut stderr = Vec::new();
    while let Some(line) = with_timeout(output.stderr.recv()).await {
        stderr.push(line);
    }

    // The final line has no terminator and is still delivered.
    assert_eq!(stdout, vec!["one", "two", "three"]);
    assert_eq!(stderr, vec!["err"]);
    assert_eq!(handle.wait_for_exit().await?, 0);
    Ok(())
}

#[tokio::test]
async fn kill_terminates_a_live_process_and_is_idempotent() -> TestResult {
    let (mut handle, _output) = ProcessHandle::start(&ExecutionRequest::new("sleep", "30"))?;
    assert!(handle.is_alive());

    handle.kill();
    let code = with_timeout(handle.wait_for_exit()).await?;
    assert_eq!(code, -1, "signal-terminated process has no exit code");
    assert!(!handle.is_alive());

    // Killing an exited process is a no-op.
    handle.kill();
    handle.kill();
    Ok(())
}

#[tokio::test]
async fn is_alive_does_not_block() -> TestResult {
    let (mut handle, _output) = ProcessHandle::start(&ExecutionRequest::new("sleep", "30"))?;

    let started = std::time::Instant::now();
    for _ in 0..10 {
        assert!(handle.is_alive());
    }
    assert!(started.elapsed() < Duration::from_secs(1));

    handle.kill();
    handle.reap_in_background();
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_a_start_error() {
    let err = ProcessHandle::start(&ExecutionRequest::new("/no/such/program", ""))
        .expect_err("program does not exist");
    match err {
        TimeboxError::ProcessStart { command, source } => {
            assert_eq!(command, "/no/such/program");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected ProcessStart, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_utf8_output_is_replaced_not_dropped() -> TestResult {
    let (mut handle, mut output) = ProcessHandle::start(&sh("printf 'ok\\n\\377bad\\n'"))?;

    let first = with_timeout(output.stdout.recv()).await;
    let second = with_timeout(output.stdout.recv()).await;
    assert_eq!(first.as_deref(), Some("ok"));
    assert_eq!(second.as_deref(), Some("\u{FFFD}bad"));
    assert_eq!(handle.wait_for_exit().await?, 0);
    Ok(())
}
