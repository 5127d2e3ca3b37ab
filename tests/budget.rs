// tests/budget.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use proptest::prelude::*;
use tokio::time::timeout;

use timebox::budget::Budget;
use timebox::errors::TimeboxError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn entries_are_recorded_in_order_until_the_limit() -> TestResult {
    init_tracing();

    let budget = Budget::with_max_entries(2);
    budget.record_entry("first")?;
    budget.record_entry("second")?;

    match budget.record_entry("third") {
        Err(TimeboxError::BudgetExceeded { label, entries }) => {
            assert_eq!(label, "third");
            assert_eq!(entries, 2);
        }
        other => panic!("expected BudgetExceeded, got {:?}", other),
    }

    let labels: Vec<String> = budget.entries().into_iter().map(|e| e.label).collect();
    assert_eq!(labels, vec!["first".to_string(), "second".to_string()]);
    assert!(budget.is_exceeded());
    assert_eq!(budget.remaining().entries, Some(0));
    Ok(())
}

#[test]
fn unbounded_budget_never_runs_out() -> TestResult {
    let budget = Budget::unbounded();
    for i in 0..100 {
        budget.record_entry(format!("op {i}"))?;
    }
    assert!(!budget.is_exceeded());
    assert_eq!(budget.remaining().duration, None);
    assert_eq!(budget.remaining().entries, None);
    Ok(())
}

#[test]
fn remaining_duration_shrinks_and_is_capped_by_timeout() {
    let budget = Budget::with_timeout(Duration::from_secs(10));
    let left = budget.remaining().duration.expect("deadline set");
    assert!(left <= Duration::from_secs(10));
    assert!(left > Duration::from_secs(9));
}

#[tokio::test]
async fn unrepresentable_timeout_means_no_deadline() -> TestResult {
    for huge in [Duration::MAX, Duration::from_secs(u64::MAX)] {
        let budget = Budget::with_timeout(huge);
        budget.record_entry("far future")?;
        assert_eq!(budget.remaining().duration, None);
        assert!(!budget.is_exceeded());

        let res = timeout(Duration::from_millis(50), budget.expired()).await;
        assert!(res.is_err());
    }

    let parent = Budget::with_timeout(Duration::from_secs(5));
    let child = parent.child(Some(Duration::MAX), None);
    assert!(child.remaining().duration.expect("parent deadline") <= Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn exhaustion_by_deadline_is_permanent() -> TestResult {
    init_tracing();

    let budget = Budget::with_timeout(Duration::from_millis(50));
    budget.record_entry("before deadline")?;

    timeout(Duration::from_secs(2), budget.expired()).await?;

    assert!(budget.record_entry("after deadline").is_err());
    assert!(budget.record_entry("still after deadline").is_err());
    assert_eq!(budget.remaining().duration, Some(Duration::ZERO));
    assert_eq!(budget.entries().len(), 1);
    Ok(())
}

#[tokio::test]
async fn expired_never_resolves_without_deadline() {
    let budget = Budget::with_max_entries(1);
    let res = timeout(Duration::from_millis(100), budget.expired()).await;
    assert!(res.is_err(), "count-only budget must not expire by itself");
}

#[tokio::test]
async fn cancel_wakes_waiters_and_exhausts() -> TestResult {
    let budget = Budget::unbounded();
    let waiter = {
        let budget = budget.clone();
        tokio::spawn(async move { budget.expired().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    budget.cancel();

    timeout(Duration::from_secs(1), waiter).await??;
    assert!(budget.is_exceeded());
    assert!(budget.record_entry("after cancel").is_err());
    Ok(())
}

#[test]
fn child_is_capped_by_parent_and_charges_it() -> TestResult {
    let parent = Budget::new(Some(Duration::from_secs(1)), Some(3));
    parent.record_entry("parent work")?;

    let child = parent.child(Some(Duration::from_secs(60)), Some(10));
    let remaining = child.remaining();
    assert!(remaining.duration.expect("deadline") <= Duration::from_secs(1));
    assert_eq!(remaining.entries, Some(2));

    child.record_entry("child work 1")?;
    child.record_entry("child work 2")?;
    assert!(child.record_entry("child work 3").is_err());

    // Parent saw every child charge and is now spent too.
    assert_eq!(parent.entries().len(), 3);
    assert!(parent.is_exceeded());
    Ok(())
}

#[test]
fn exhausting_a_child_does_not_restore_or_spend_the_parent() -> TestResult {
    let parent = Budget::with_max_entries(5);
    let child = parent.child(None, Some(1));

    child.record_entry("only one")?;
    assert!(child.record_entry("one too many").is_err());

    assert!(!parent.is_exceeded());
    assert_eq!(parent.remaining().entries, Some(4));
    parent.record_entry("parent continues")?;
    Ok(())
}

#[test]
fn child_of_exhausted_parent_starts_exhausted() {
    let parent = Budget::with_max_entries(0);
    let child = parent.child(Some(Duration::from_secs(5)), None);
    assert!(child.is_exceeded());
    assert!(child.record_entry("anything").is_err());
}

#[tokio::test]
async fn cancelling_parent_expires_child_but_not_the_reverse() -> TestResult {
    let parent = Budget::unbounded();
    let child = parent.child(None, None);

    child.cancel();
    assert!(child.is_exceeded());
    assert!(!parent.is_exceeded());
    parent.record_entry("parent unaffected")?;

    let other_child = parent.child(None, None);
    parent.cancel();
    timeout(Duration::from_secs(1), other_child.expired()).await?;
    assert!(other_child.is_exceeded());
    Ok(())
}

#[test]
fn concurrent_charging_never_exceeds_the_limit() {
    let budget = Budget::with_max_entries(10);
    let succeeded = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for t in 0..8 {
            let budget = &budget;
            let succeeded = &succeeded;
            s.spawn(move || {
                for i in 0..5 {
                    if budget.record_entry(format!("thread {t} op {i}")).is_ok() {
                        succeeded.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(succeeded.load(Ordering::SeqCst), 10);
    assert_eq!(budget.entries().len(), 10);
}

proptest! {
    #[test]
    fn charges_succeed_up_to_limit_then_fail_forever(max in 0usize..20, attempts in 0usize..40) {
        let budget = Budget::with_max_entries(max);
        let outcomes: Vec<bool> = (0..attempts)
            .map(|i| budget.record_entry(format!("op {i}")).is_ok())
            .collect();

        let ok = outcomes.iter().filter(|o| **o).count();
        prop_assert_eq!(ok, max.min(attempts));

        // Monotonic: once a charge fails, every later one fails too.
        if let Some(first_fail) = outcomes.iter().position(|o| !*o) {
            prop_assert!(outcomes[first_fail..].iter().all(|o| !*o));
        }
    }
}
