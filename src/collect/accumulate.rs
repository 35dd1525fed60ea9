#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Accumulating collection operations: every element is evaluated and every
//! error is kept, in input order.

use super::fail_fast::partition;
use crate::outcome::Outcome;
use itertools::{Either, Itertools};
use std::collections::HashMap;
use std::future::IntoFuture;
use std::hash::Hash;

/// Success of all values only when nothing failed; otherwise all errors.
pub fn combine_all<T, E, I>(results: I) -> Outcome<Vec<T>, Vec<E>>
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    let (values, errors) = partition(results);
    if errors.is_empty() {
        Outcome::Success(values)
    } else {
        Outcome::Failure(errors)
    }
}

/// Accumulating counterpart of [`super::traverse`]: `f` runs for every item.
pub fn traverse_all<T, U, E, I, F>(items: I, f: F) -> Outcome<Vec<U>, Vec<E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Outcome<U, E>,
{
    combine_all(items.into_iter().map(f))
}

/// Awaits `f` for every item, one at a time, keeping every error.
pub async fn traverse_all_async<T, U, E, I, F, Fut>(items: I, mut f: F) -> Outcome<Vec<U>, Vec<E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: IntoFuture<Output = Outcome<U, E>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for item in items {
        match f(item).await {
            Outcome::Success(value) => values.push(value),
            Outcome::Failure(error) => errors.push(error),
        }
    }
    if errors.is_empty() {
        Outcome::Success(values)
    } else {
        Outcome::Failure(errors)
    }
}

/// Partitions, transforming each side with its own mapper.
pub fn partition_map<T, E, U, V, I, S, F>(
    results: I,
    mut success_mapper: S,
    mut failure_mapper: F,
) -> (Vec<U>, Vec<V>)
where
    I: IntoIterator<Item = Outcome<T, E>>,
    S: FnMut(T) -> U,
    F: FnMut(E) -> V,
{
    results.into_iter().partition_map(|result| match result {
        Outcome::Success(value) => Either::Left(success_mapper(value)),
        Outcome::Failure(error) => Either::Right(failure_mapper(error)),
    })
}

/// Groups items by a fallible key. Groups come back in the order their key
/// was first seen and each keeps its items in input order. The first failing
/// key selection aborts the grouping.
pub fn group_by_result<T, K, E, I, F>(items: I, mut key_selector: F) -> Outcome<Vec<(K, Vec<T>)>, E>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Outcome<K, E>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        match key_selector(&item) {
            Outcome::Success(key) => {
                if let Some((_, group)) = slots.get(&key).and_then(|&slot| groups.get_mut(slot)) {
                    group.push(item);
                } else {
                    slots.insert(key.clone(), groups.len());
                    groups.push((key, vec![item]));
                }
            }
            Outcome::Failure(error) => return Outcome::Failure(error),
        }
    }
    Outcome::Success(groups)
}

/// The first success, or every error when nothing succeeded. An empty input
/// yields a failure with no errors.
pub fn first_success<T, E, I>(results: I) -> Outcome<T, Vec<E>>
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    let mut errors = Vec::new();
    for result in results {
        match result {
            Outcome::Success(value) => return Outcome::Success(value),
            Outcome::Failure(error) => errors.push(error),
        }
    }
    Outcome::Failure(errors)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::outcome::{failure, success};
    use std::cell::Cell;

    fn in_range(score: i32) -> Outcome<i32, String> {
        if (0..=100).contains(&score) {
            success(score)
        } else {
            failure(format!("score {score} out of range"))
        }
    }

    #[test]
    fn combine_all_evaluates_everything_and_keeps_all_errors() {
        let evaluated = Cell::new(0);
        let inputs = [85, 150, 200, 75].into_iter().map(|score| {
            evaluated.set(evaluated.get() + 1);
            in_range(score)
        });
        let outcome = combine_all(inputs);
        assert_eq!(
            outcome,
            failure(vec![
                "score 150 out of range".to_string(),
                "score 200 out of range".to_string(),
            ])
        );
        assert_eq!(evaluated.get(), 4);
    }

    #[test]
    fn combine_all_succeeds_when_nothing_fails() {
        assert_eq!(traverse_all([1, 2, 3], in_range), success(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn traverse_all_async_visits_every_item() {
        let outcome = traverse_all_async([500, 5, 600], |score| async move { in_range(score) }).await;
        assert_eq!(outcome.error().len(), 2);
    }

    #[test]
    fn partition_map_applies_matching_mapper() {
        let inputs = vec![success::<i32, &str>(2), failure("x"), success(4)];
        let (doubled, lengths) = partition_map(inputs, |v| v * 2, str::len);
        assert_eq!(doubled, vec![4, 8]);
        assert_eq!(lengths, vec![1]);
    }

    #[test]
    fn group_by_result_keeps_first_seen_key_order() {
        let words = vec!["cherry", "apple", "banana", "avocado", "blueberry", "clementine"];
        let grouped = group_by_result(words, |w| success::<char, String>(w.chars().next().unwrap()))
            .value();
        assert_eq!(
            grouped,
            vec![
                ('c', vec!["cherry", "clementine"]),
                ('a', vec!["apple", "avocado"]),
                ('b', vec!["banana", "blueberry"]),
            ]
        );
    }

    #[test]
    fn group_by_result_aborts_on_first_failing_key() {
        let mut asked = Vec::new();
        let outcome = group_by_result(vec!["ok", "", "also-bad-later", ""], |w| {
            asked.push(w.to_string());
            w.chars()
                .next()
                .map_or_else(|| failure("empty word".to_string()), success)
        });
        assert_eq!(outcome, failure("empty word".to_string()));
        assert_eq!(asked, vec!["ok".to_string(), String::new()]);
    }

    #[test]
    fn first_success_returns_earliest_success() {
        let outcome = first_success(vec![failure("a"), success(2), success(3)]);
        assert_eq!(outcome, success(2));
    }

    #[test]
    fn first_success_collects_all_errors_when_everything_fails() {
        let outcome = first_success(vec![failure::<i32, _>("a"), failure("b")]);
        assert_eq!(outcome, failure(vec!["a", "b"]));
        assert_eq!(first_success(Vec::<Outcome<i32, &str>>::new()), failure(vec![]));
    }
}
