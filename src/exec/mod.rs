// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running external commands under a
//! [`Budget`](crate::budget::Budget), using `tokio::process::Command`, and
//! reporting each run through a [`ConfirmationReporter`](crate::report::ConfirmationReporter).
//!
//! - [`request`] holds `ExecutionRequest` / `ExecutionResult` and argument
//!   splitting.
//! - [`process`] wraps process creation and per-stream line capture.
//! - [`bounded`] races process exit against budget expiry.
//! - [`output`] normalizes captured lines.

pub mod bounded;
pub mod output;
pub mod process;
pub mod request;

pub use bounded::{BoundedExecutor, EXEC_CATEGORY, execute};
pub use output::{normalize_lines, normalize_output};
pub use process::{ProcessHandle, ProcessOutput};
pub use request::{ExecutionRequest, ExecutionResult, TIMED_OUT_EXIT_CODE, split_args};
