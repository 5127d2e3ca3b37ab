#![allow(dead_code)]

use std::path::Path;

use timebox::exec::ExecutionRequest;

/// Run `script` through `sh -c`.
///
/// The script is wrapped in double quotes for argument splitting, so it must
/// not contain unescaped double quotes itself.
pub fn sh(script: &str) -> ExecutionRequest {
    ExecutionRequest::new("sh", format!("-c \"{script}\""))
}

/// Same as [`sh`], run from `dir`.
pub fn sh_in(dir: &Path, script: &str) -> ExecutionRequest {
    sh(script).with_working_dir(dir)
}

/// A script that writes its own pid to `pid_file` and then sleeps for
/// `secs` seconds, replacing the shell so the pid is the sleeping process.
pub fn sleeper(pid_file: &Path, secs: u64) -> ExecutionRequest {
    sh(&format!("echo $$ > '{}'; exec sleep {}", pid_file.display(), secs))
}
