// src/report/mod.rs

//! Correlated start / progress / terminal events for observable operations.
//!
//! - [`reporter`] owns [`ConfirmationReporter`] and [`Operation`].
//! - [`event`] defines the event shape handed to sinks.
//! - [`sink`] provides the [`EventSink`] trait and the default
//!   `tracing`-backed [`TracingSink`].

pub mod event;
pub mod reporter;
pub mod sink;

pub use event::{EventKind, FailureReason, OperationEvent, OperationId, render_template};
pub use reporter::{ConfirmationReporter, Operation};
pub use sink::{EventSink, TracingSink};
