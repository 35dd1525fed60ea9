#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Fail-fast collection operations.
//!
//! Inputs are consumed lazily in order. With the first failure at index `k`
//! at most `k + 1` elements are ever pulled from the input.

use crate::outcome::Outcome;
use crate::payloads::IndexedError;
use itertools::{Either, Itertools};
use std::future::IntoFuture;

/// Collects successes in input order, or returns the first failure.
pub fn combine<T, E, I>(results: I) -> Outcome<Vec<T>, E>
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    let results = results.into_iter();
    let mut values = Vec::with_capacity(results.size_hint().0);
    for result in results {
        match result {
            Outcome::Success(value) => values.push(value),
            Outcome::Failure(error) => return Outcome::Failure(error),
        }
    }
    Outcome::Success(values)
}

/// Same contract as [`combine`].
pub fn sequence<T, E, I>(results: I) -> Outcome<Vec<T>, E>
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    combine(results)
}

/// `sequence(items.map(f))`. `f` is not called for any item after the first
/// failing one.
pub fn traverse<T, U, E, I, F>(items: I, f: F) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Outcome<U, E>,
{
    sequence(items.into_iter().map(f))
}

/// Like [`traverse`], tagging the failure with the index of the item that
/// produced it.
pub fn traverse_indexed<T, U, E, I, F>(items: I, mut f: F) -> Outcome<Vec<U>, IndexedError<E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Outcome<U, E>,
{
    traverse(items.into_iter().enumerate(), |(index, item)| {
        f(item).map_error(|error| IndexedError::new(index, error))
    })
}

/// Splits into successes and failures, each in input order. Never stops
/// early.
pub fn partition<T, E, I>(results: I) -> (Vec<T>, Vec<E>)
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    results.into_iter().partition_map(|result| match result {
        Outcome::Success(value) => Either::Left(value),
        Outcome::Failure(error) => Either::Right(error),
    })
}

/// Awaits each future in order, stopping at the first failure. Futures after
/// the failing one are dropped without being polled.
pub async fn sequence_async<T, E, I, Fut>(futures: I) -> Outcome<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: IntoFuture<Output = Outcome<T, E>>,
{
    let mut values = Vec::new();
    for future in futures {
        match future.await {
            Outcome::Success(value) => values.push(value),
            Outcome::Failure(error) => return Outcome::Failure(error),
        }
    }
    Outcome::Success(values)
}

/// Sequential async traverse: one invocation of `f` in flight at a time.
pub async fn traverse_async<T, U, E, I, F, Fut>(items: I, f: F) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: IntoFuture<Output = Outcome<U, E>>,
{
    sequence_async(items.into_iter().map(f)).await
}
