// crates/test-utils/src/lib.rs

//! Shared helpers for the `timebox` integration tests.

pub mod builders;
pub mod sinks;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// How long one awaited step of a test may take before the test fails.
pub const STEP_LIMIT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a per-test tracing subscriber once per test binary.
///
/// The filter is read from `TIMEBOX_LOG` (the variable the binary uses),
/// then `RUST_LOG`, falling back to `info`. Output goes through the test
/// writer, so it only shows for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = std::env::var("TIMEBOX_LOG")
            .ok()
            .and_then(|s| EnvFilter::try_new(s).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `fut`, failing the test if it takes longer than [`STEP_LIMIT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    within(STEP_LIMIT, fut).await
}

/// Await `fut`, failing the test if it takes longer than `limit`.
pub async fn within<F: Future>(limit: Duration, fut: F) -> F::Output {
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test step did not finish within {limit:?}"),
    }
}
