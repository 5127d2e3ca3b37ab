// src/report/sink.rs

use anyhow::Result;
use tracing::{error, info, warn};

use crate::report::event::{EventKind, OperationEvent};

/// Destination for operation events.
///
/// Implementations may fail; the reporter swallows those failures so a broken
/// sink never changes the outcome of the work being reported.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &OperationEvent) -> Result<()>;
}

/// Default sink: forwards every event to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &OperationEvent) -> Result<()> {
        let operation = event.operation.to_string();
        let category = event.category.as_str();
        let message = event.message();
        let elapsed_ms = event.elapsed.as_millis() as u64;

        match event.kind {
            EventKind::Started => {
                info!(operation = %operation, category, "[start] {}", message)
            }
            EventKind::Info => info!(operation = %operation, category, "{}", message),
            EventKind::Error => error!(operation = %operation, category, "{}", message),
            EventKind::Succeeded => info!(
                operation = %operation,
                category,
                elapsed_ms,
                "[succeeded] {}",
                message
            ),
            EventKind::Failed => {
                let reason = event
                    .failure
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                warn!(
                    operation = %operation,
                    category,
                    elapsed_ms,
                    reason = %reason,
                    "[failed] {}",
                    message
                )
            }
        }

        Ok(())
    }
}
