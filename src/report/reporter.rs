// src/report/reporter.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::debug;

use crate::report::event::{EventKind, FailureReason, OperationEvent, OperationId};
use crate::report::sink::{EventSink, TracingSink};

static NEXT_OPERATION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Starts operations and hands their events to a sink.
#[derive(Clone)]
pub struct ConfirmationReporter {
    category: String,
    sink: Arc<dyn EventSink>,
}

impl ConfirmationReporter {
    pub fn new(category: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            category: category.into(),
            sink,
        }
    }

    /// Reporter backed by [`TracingSink`].
    pub fn tracing(category: impl Into<String>) -> Self {
        Self::new(category, Arc::new(TracingSink))
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Begin an operation and emit its start event.
    pub fn begin(&self, name: &str, template: &str, args: Vec<String>) -> Operation {
        let op = Operation {
            id: OperationId {
                name: name.to_string(),
                seq: NEXT_OPERATION_SEQ.fetch_add(1, Ordering::Relaxed),
            },
            category: self.category.clone(),
            sink: Arc::clone(&self.sink),
            started: Instant::now(),
            confirmed: false,
        };
        op.emit(EventKind::Started, template, args, None);
        op
    }
}

impl fmt::Debug for ConfirmationReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationReporter")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// One in-flight operation.
///
/// `succeed` and `fail` consume the operation, so at most one terminal event
/// is ever emitted. Dropping it unconfirmed emits a failure.
pub struct Operation {
    id: OperationId,
    category: String,
    sink: Arc<dyn EventSink>,
    started: Instant,
    confirmed: bool,
}

impl Operation {
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn info(&self, template: &str, args: Vec<String>) {
        self.emit(EventKind::Info, template, args, None);
    }

    pub fn error(&self, template: &str, args: Vec<String>) {
        self.emit(EventKind::Error, template, args, None);
    }

    pub fn succeed(mut self, template: &str, args: Vec<String>) {
        self.confirmed = true;
        self.emit(EventKind::Succeeded, template, args, None);
    }

    pub fn fail(mut self, reason: FailureReason) {
        self.confirmed = true;
        let message = reason.to_string();
        self.emit(EventKind::Failed, "{reason}", vec![message], Some(reason));
    }

    fn emit(
        &self,
        kind: EventKind,
        template: &str,
        args: Vec<String>,
        failure: Option<FailureReason>,
    ) {
        let event = OperationEvent {
            operation: self.id.clone(),
            category: self.category.clone(),
            kind,
            template: template.to_string(),
            args,
            failure,
            elapsed: self.started.elapsed(),
        };

        if let Err(e) = self.sink.emit(&event) {
            debug!(operation = %self.id, error = %e, "event sink failed; event dropped");
        }
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        if !self.confirmed {
            self.emit(
                EventKind::Failed,
                "{reason}",
                vec![FailureReason::Unconfirmed.to_string()],
                Some(FailureReason::Unconfirmed),
            );
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("confirmed", &self.confirmed)
            .finish_non_exhaustive()
    }
}
