#![allow(dead_code)]

pub use timebox_test_utils::builders;
pub use timebox_test_utils::sinks;
pub use timebox_test_utils::{init_tracing, with_timeout, within};

use std::path::Path;
use std::time::Duration;

/// Wait (up to 2s) until `pid` has fully exited and been reaped.
#[cfg(target_os = "linux")]
pub async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..200 {
        if process_gone(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[cfg(target_os = "linux")]
fn process_gone(pid: u32) -> bool {
    let status = Path::new("/proc").join(pid.to_string()).join("status");
    match std::fs::read_to_string(status) {
        Ok(text) => text.lines().any(|l| l.starts_with("State:") && l.contains('Z')),
        Err(_) => true,
    }
}

/// Read a pid written by `builders::sleeper`, waiting for the file to appear.
pub async fn read_pid(pid_file: &Path) -> u32 {
    for _ in 0..200 {
        if let Ok(text) = std::fs::read_to_string(pid_file) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("pid file {:?} was never written", pid_file);
}
