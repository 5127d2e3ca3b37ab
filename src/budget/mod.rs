// src/budget/mod.rs

//! Consumable allowance shared across a chain of bounded operations.
//!
//! A [`Budget`] is created once per top-level request and passed by reference
//! to every nested bounded operation. It can carry:
//! - a wall-clock deadline,
//! - a maximum number of charged entries,
//! - an explicit cancellation flag.
//!
//! Once any of these is exhausted the budget stays exhausted; every later
//! [`Budget::record_entry`] fails with [`TimeboxError::BudgetExceeded`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::errors::{Result, TimeboxError};

/// One charge recorded against a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetEntry {
    pub label: String,
    /// Time since the budget was created when this entry was charged.
    pub elapsed: Duration,
}

/// Snapshot of what is left in a budget.
///
/// `None` means "no limit of this kind".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub duration: Option<Duration>,
    pub entries: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<BudgetEntry>,
    exhausted: bool,
}

#[derive(Debug)]
struct Inner {
    started: Instant,
    deadline: Option<Instant>,
    max_entries: Option<usize>,
    state: Mutex<State>,
    cancelled: watch::Sender<bool>,
    parent: Option<Budget>,
}

/// Cheaply cloneable handle to a shared allowance.
#[derive(Debug, Clone)]
pub struct Budget {
    inner: Arc<Inner>,
}

impl Budget {
    pub fn new(timeout: Option<Duration>, max_entries: Option<usize>) -> Self {
        let started = Instant::now();
        Self::build(
            started,
            deadline_after(started, timeout),
            max_entries,
            None,
        )
    }

    /// A budget with neither a deadline nor an entry limit.
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Some(timeout), None)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self::new(None, Some(max_entries))
    }

    fn build(
        started: Instant,
        deadline: Option<Instant>,
        max_entries: Option<usize>,
        parent: Option<Budget>,
    ) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                started,
                deadline,
                max_entries,
                state: Mutex::new(State::default()),
                cancelled,
                parent,
            }),
        }
    }

    /// Derive a sub-budget that can never outlast this one.
    ///
    /// The child's deadline is the earlier of its own and the parent's, and
    /// its entry limit is capped at the parent's remaining count. Charges
    /// against the child are also charged to the parent.
    pub fn child(&self, timeout: Option<Duration>, max_entries: Option<usize>) -> Budget {
        let started = Instant::now();
        let own_deadline = deadline_after(started, timeout);
        let deadline = min_opt(own_deadline, self.inner.deadline);
        let max_entries = min_opt(max_entries, self.remaining().entries);

        let child = Self::build(started, deadline, max_entries, Some(self.clone()));
        if self.is_exceeded() {
            child.lock_state().exhausted = true;
        }
        child
    }

    /// Charge one entry against the budget.
    ///
    /// The exhaustion check and the charge happen under one lock, so two
    /// concurrent callers can never both take the last entry.
    pub fn record_entry(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        let mut state = self.lock_state();

        if self.exhausted_locked(&mut state) {
            debug!(label = %label, entries = state.entries.len(), "budget exceeded");
            return Err(TimeboxError::BudgetExceeded {
                label,
                entries: state.entries.len(),
            });
        }

        if let Some(parent) = &self.inner.parent {
            if let Err(err) = parent.record_entry(label.clone()) {
                state.exhausted = true;
                return Err(err);
            }
        }

        trace!(label = %label, "budget entry recorded");
        state.entries.push(BudgetEntry {
            label,
            elapsed: self.elapsed(),
        });
        Ok(())
    }

    pub fn remaining(&self) -> Remaining {
        let now = Instant::now();
        let mut state = self.lock_state();
        let exhausted = self.exhausted_locked(&mut state);

        let duration = self
            .inner
            .deadline
            .map(|d| if exhausted { Duration::ZERO } else { d.saturating_duration_since(now) });
        let entries = self.inner.max_entries.map(|max| {
            if exhausted {
                0
            } else {
                max.saturating_sub(state.entries.len())
            }
        });
        drop(state);

        let own = Remaining { duration, entries };
        match &self.inner.parent {
            Some(parent) => {
                let up = parent.remaining();
                Remaining {
                    duration: min_opt(own.duration, up.duration),
                    entries: min_opt(own.entries, up.entries),
                }
            }
            None => own,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        let mut state = self.lock_state();
        if self.exhausted_locked(&mut state) {
            return true;
        }
        drop(state);
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.is_exceeded())
    }

    /// Exhaust the budget now and wake anyone waiting on [`Budget::expired`].
    ///
    /// Cancelling a child leaves its parent untouched.
    pub fn cancel(&self) {
        self.lock_state().exhausted = true;
        self.inner.cancelled.send_replace(true);
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }

    pub fn entries(&self) -> Vec<BudgetEntry> {
        self.lock_state().entries.clone()
    }

    /// Resolves once the deadline passes or the budget (or an ancestor) is
    /// cancelled.
    ///
    /// Never resolves for a budget without a deadline that is never
    /// cancelled. Cancel-safe, so it can sit in a `tokio::select!` loop.
    pub fn expired(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            match &self.inner.parent {
                Some(parent) => {
                    tokio::select! {
                        _ = self.own_expiry() => {}
                        _ = parent.expired() => {}
                    }
                }
                None => self.own_expiry().await,
            }
        })
    }

    async fn own_expiry(&self) {
        let mut rx = self.inner.cancelled.subscribe();
        let cancelled = async move {
            let closed = rx.wait_for(|c| *c).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };

        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                    _ = cancelled => {}
                }
            }
            None => cancelled.await,
        }
    }

    fn exhausted_locked(&self, state: &mut State) -> bool {
        if state.exhausted {
            return true;
        }

        let past_deadline = self
            .inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        let out_of_entries = self
            .inner
            .max_entries
            .is_some_and(|max| state.entries.len() >= max);

        if past_deadline || out_of_entries || *self.inner.cancelled.borrow() {
            state.exhausted = true;
        }
        state.exhausted
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// `None` when there is no timeout or the deadline is past what `Instant`
/// can represent.
fn deadline_after(started: Instant, timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| started.checked_add(t))
}

fn min_opt<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
