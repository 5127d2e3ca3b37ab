// src/report/event.rs

use std::fmt;
use std::time::Duration;

/// Identity correlating every event of one operation.
///
/// The name comes from the caller (e.g. `"execute"`), the sequence number is
/// unique within the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    pub name: String,
    pub seq: u64,
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Started,
    /// Informational progress (e.g. a stdout line).
    Info,
    /// Error-severity progress (e.g. a stderr line). Not a failure.
    Error,
    Succeeded,
    Failed,
}

impl EventKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::Succeeded | EventKind::Failed)
    }
}

/// Why an operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The budget ran out while the work was in progress.
    BudgetExceeded { elapsed: Duration },
    /// The process ran to completion but reported a nonzero exit code.
    NonZeroExit { code: i32 },
    /// The process could not be started.
    StartFailed { message: String },
    /// The operation was dropped without being confirmed.
    Unconfirmed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::BudgetExceeded { elapsed } => {
                write!(f, "budget exceeded after {:?}", elapsed)
            }
            FailureReason::NonZeroExit { code } => write!(f, "exited with code {code}"),
            FailureReason::StartFailed { message } => write!(f, "failed to start: {message}"),
            FailureReason::Unconfirmed => write!(f, "operation was not confirmed"),
        }
    }
}

/// One structured event handed to an [`EventSink`](super::EventSink).
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEvent {
    pub operation: OperationId,
    pub category: String,
    pub kind: EventKind,
    /// Message template with `{name}` placeholders.
    pub template: String,
    /// Values for the placeholders, in order.
    pub args: Vec<String>,
    pub failure: Option<FailureReason>,
    /// Time since the operation started.
    pub elapsed: Duration,
}

impl OperationEvent {
    pub fn message(&self) -> String {
        render_template(&self.template, &self.args)
    }
}

/// Fill `{name}` placeholders positionally from `args`.
///
/// `{{` and `}}` are literal braces. Placeholders without a matching value
/// are left as written.
pub fn render_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut values = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                match (closed, values.next()) {
                    (true, Some(value)) => out.push_str(value),
                    (true, None) => {
                        out.push('{');
                        out.push_str(&name);
                        out.push('}');
                    }
                    (false, _) => {
                        out.push('{');
                        out.push_str(&name);
                    }
                }
            }
            c => out.push(c),
        }
    }

    out
}
