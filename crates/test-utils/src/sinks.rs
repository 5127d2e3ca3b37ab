use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use timebox::report::{
    ConfirmationReporter, EventKind, EventSink, FailureReason, OperationEvent,
};

/// A sink that keeps every event it receives, in order.
///
/// Clones share the same storage, so a test can hand one clone to the
/// reporter and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<OperationEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter writing into this sink.
    pub fn reporter(&self, category: &str) -> ConfirmationReporter {
        ConfirmationReporter::new(category, Arc::new(self.clone()))
    }

    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|e| e.kind).collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<OperationEvent> {
        self.events().into_iter().filter(|e| e.kind == kind).collect()
    }

    pub fn terminal(&self) -> Vec<OperationEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.is_terminal())
            .collect()
    }

    /// Failure reasons of all `Failed` events.
    pub fn failures(&self) -> Vec<FailureReason> {
        self.events()
            .into_iter()
            .filter_map(|e| e.failure)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &OperationEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A sink that rejects every event.
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

impl EventSink for FailingSink {
    fn emit(&self, _event: &OperationEvent) -> anyhow::Result<()> {
        Err(anyhow!("sink unavailable"))
    }
}
