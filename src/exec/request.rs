// src/exec/request.rs

//! Inputs and outputs of a bounded execution.

use std::path::{Path, PathBuf};

/// Exit code reported when the budget ran out and the process was killed.
///
/// Same convention as the coreutils `timeout` command.
pub const TIMED_OUT_EXIT_CODE: i32 = 124;

/// What to run. Immutable once built; the `with_*` methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    command: String,
    args: String,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ExecutionRequest {
    /// `args` is a single caller-assembled string, split by [`split_args`]
    /// when the process is started.
    pub fn new(command: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: args.into(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &str {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Argument vector handed to the OS.
    pub fn argv(&self) -> Vec<String> {
        split_args(&self.args)
    }

    /// `command args` as one display string, used in labels and log lines.
    pub fn display(&self) -> String {
        if self.args.trim().is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args)
        }
    }
}

/// Outcome of one bounded execution. Produced exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    timed_out: bool,
}

impl ExecutionResult {
    pub(crate) fn new(exit_code: i32, stdout: Vec<String>, stderr: Vec<String>, timed_out: bool) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            timed_out,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// True only when the budget ran out and the process was killed.
    ///
    /// A process that exits with [`TIMED_OUT_EXIT_CODE`] on its own is not
    /// timed out.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

/// Split a caller-assembled argument string into separate arguments.
///
/// Whitespace separates arguments. Double quotes group text containing
/// whitespace and are removed; `\"` inside or outside quotes is a literal
/// quote. An empty quoted pair (`""`) yields an empty argument.
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut chars = args.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
                in_arg = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_arg = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_arg {
                    out.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        out.push(current);
    }
    out
}
