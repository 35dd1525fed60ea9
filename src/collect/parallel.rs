#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Bounded-parallel traversal.
//!
//! Every item is dispatched without waiting on earlier ones, but an
//! invocation must hold a permit from a counting gate of `max_concurrency`
//! permits while it runs. The permit is released when the invocation's
//! future completes or unwinds. A failure does not stop siblings: all
//! invocations run to completion before results are inspected in input
//! order.

use super::at_least_one;
use super::fail_fast::combine;
use crate::outcome::Outcome;
use futures_util::future::join_all;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

fn gate_size(max_concurrency: usize) -> usize {
    at_least_one(max_concurrency, "max_concurrency").min(Semaphore::MAX_PERMITS)
}

/// Runs `f` for every item with at most `max_concurrency` invocations in
/// flight, all on the calling task. Returns the values in input order, or
/// the failure with the lowest input index.
pub async fn traverse_parallel<T, U, E, I, F, Fut>(
    items: I,
    f: F,
    max_concurrency: usize,
) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Outcome<U, E>>,
{
    let permits = gate_size(max_concurrency);
    let gate = Semaphore::new(permits);
    let (gate, f) = (&gate, &f);

    let invocations = items.into_iter().map(move |item| async move {
        // The gate is never closed, so acquisition only waits.
        let _permit = gate.acquire().await.ok();
        f(item).await
    });
    let outcomes = join_all(invocations).await;

    debug!(
        items = outcomes.len(),
        max_concurrency = permits,
        "parallel traversal finished"
    );
    combine(outcomes)
}

/// Same contract as [`traverse_parallel`], but each invocation runs on its
/// own tokio task. A panic inside an invocation is resumed on the caller
/// after every other task has finished; when several panic, the first one
/// joined wins.
pub async fn traverse_parallel_tasks<T, U, E, I, F, Fut>(
    items: I,
    f: F,
    max_concurrency: usize,
) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<U, E>> + Send + 'static,
{
    let permits = gate_size(max_concurrency);
    let gate = Arc::new(Semaphore::new(permits));
    let f = Arc::new(f);
    let mut tasks = JoinSet::new();

    let mut dispatched = 0usize;
    for (index, item) in items.into_iter().enumerate() {
        let gate = Arc::clone(&gate);
        let f = Arc::clone(&f);
        tasks.spawn(async move {
            let _permit = gate.acquire_owned().await.ok();
            (index, f(item).await)
        });
        dispatched += 1;
    }
    debug!(items = dispatched, max_concurrency = permits, "tasks dispatched");

    let mut slots: Vec<Option<Outcome<U, E>>> = (0..dispatched).map(|_| None).collect();
    let mut panicked: Option<Box<dyn Any + Send>> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(outcome);
                }
            }
            Err(join_error) => {
                debug!(error = %join_error, "task ended abnormally");
                let payload = join_error
                    .try_into_panic()
                    .unwrap_or_else(|other| -> Box<dyn Any + Send> { Box::new(other.to_string()) });
                panicked.get_or_insert(payload);
            }
        }
    }

    if let Some(payload) = panicked {
        std::panic::resume_unwind(payload);
    }
    combine(slots.into_iter().flatten())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::outcome::{failure, success};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Gauge {
        active: AtomicUsize,
        peak: AtomicUsize,
        started: AtomicUsize,
    }

    impl Gauge {
        fn enter(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn jitter(item: u64) -> Duration {
        Duration::from_millis((item * 7919) % 13 + 1)
    }

    #[tokio::test]
    async fn when_all_succeed_then_values_follow_input_order() {
        let gauge = Arc::new(Gauge::default());
        let outcome = traverse_parallel(
            0u64..20,
            |item| {
                let gauge = gauge.clone();
                async move {
                    gauge.enter();
                    tokio::time::sleep(jitter(item)).await;
                    gauge.leave();
                    success::<u64, String>(item * 10)
                }
            },
            3,
        )
        .await;

        assert_eq!(outcome, success((0u64..20).map(|i| i * 10).collect()));
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gauge.started.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn when_several_fail_then_lowest_index_error_wins_and_all_items_run() {
        let gauge = Arc::new(Gauge::default());
        let outcome = traverse_parallel(
            0u64..10,
            |item| {
                let gauge = gauge.clone();
                async move {
                    gauge.enter();
                    // Later items finish first.
                    tokio::time::sleep(Duration::from_millis(30 - item * 3)).await;
                    gauge.leave();
                    if item == 4 || item == 7 {
                        failure::<u64, String>(format!("item {item} failed"))
                    } else {
                        success(item)
                    }
                }
            },
            4,
        )
        .await;

        assert_eq!(outcome, failure("item 4 failed".to_string()));
        assert_eq!(gauge.started.load(Ordering::SeqCst), 10);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn zero_concurrency_is_treated_as_one() {
        let gauge = Arc::new(Gauge::default());
        let outcome = traverse_parallel(
            0u64..5,
            |item| {
                let gauge = gauge.clone();
                async move {
                    gauge.enter();
                    tokio::task::yield_now().await;
                    gauge.leave();
                    success::<u64, String>(item)
                }
            },
            0,
        )
        .await;
        assert!(outcome.is_success());
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tasks_variant_keeps_running_after_a_panic_then_resumes_it() {
        let gauge = Arc::new(Gauge::default());
        let shared = gauge.clone();
        let run = traverse_parallel_tasks(
            0u64..4,
            move |item| {
                let gauge = shared.clone();
                async move {
                    gauge.enter();
                    tokio::task::yield_now().await;
                    gauge.leave();
                    if item == 0 {
                        panic!("first item blew up");
                    }
                    success::<u64, String>(item)
                }
            },
            1,
        );

        let caught = tokio::time::timeout(
            Duration::from_secs(5),
            Outcome::catch_fault_async(run, |fault| fault),
        )
        .await
        .expect("remaining items should still get a permit");

        assert_eq!(caught.error().message(), "first item blew up");
        assert_eq!(gauge.started.load(Ordering::SeqCst), 4);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tasks_variant_bounds_concurrency_and_orders_results() {
        let gauge = Arc::new(Gauge::default());
        let shared = gauge.clone();
        let outcome = traverse_parallel_tasks(
            0u64..16,
            move |item| {
                let gauge = shared.clone();
                async move {
                    gauge.enter();
                    tokio::time::sleep(jitter(item)).await;
                    gauge.leave();
                    if item % 5 == 3 {
                        failure::<u64, String>(format!("bad {item}"))
                    } else {
                        success(item)
                    }
                }
            },
            2,
        )
        .await;

        assert_eq!(outcome, failure("bad 3".to_string()));
        assert_eq!(gauge.started.load(Ordering::SeqCst), 16);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    #[should_panic(expected = "task exploded")]
    async fn tasks_variant_resumes_panics() {
        let _ = traverse_parallel_tasks(
            0u64..3,
            |item| async move {
                if item == 1 {
                    panic!("task exploded");
                }
                success::<u64, String>(item)
            },
            2,
        )
        .await;
    }
}
