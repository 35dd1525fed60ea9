#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Batch traversal: fixed-size, order-preserving chunks processed one after
//! another. The first failing chunk ends the traversal.

use super::at_least_one;
use crate::outcome::Outcome;
use itertools::Itertools;
use std::future::IntoFuture;
use tracing::{debug, warn};

fn into_batches<T, I>(items: I, batch_size: usize) -> Vec<Vec<T>>
where
    I: IntoIterator<Item = T>,
{
    let chunks = items
        .into_iter()
        .chunks(at_least_one(batch_size, "batch_size"));
    let batches: Vec<Vec<T>> = chunks.into_iter().map(|chunk| chunk.collect()).collect();
    batches
}

/// Awaits `processor` once per chunk, in chunk order. Chunk `i + 1` is not
/// handed to the processor until chunk `i` has succeeded.
pub async fn traverse_batch<T, U, E, I, F, Fut>(
    items: I,
    mut processor: F,
    batch_size: usize,
) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(Vec<T>) -> Fut,
    Fut: IntoFuture<Output = Outcome<Vec<U>, E>>,
{
    let batches = into_batches(items, batch_size);
    let total = batches.len();
    let mut collected = Vec::new();

    for (index, batch) in batches.into_iter().enumerate() {
        debug!(batch = index, total, size = batch.len(), "processing batch");
        match processor(batch).await {
            Outcome::Success(values) => collected.extend(values),
            Outcome::Failure(error) => {
                warn!(batch = index, total, "batch failed, skipping the rest");
                return Outcome::Failure(error);
            }
        }
    }
    Outcome::Success(collected)
}

/// Synchronous [`traverse_batch`].
pub fn traverse_batch_sync<T, U, E, I, F>(
    items: I,
    mut processor: F,
    batch_size: usize,
) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(Vec<T>) -> Outcome<Vec<U>, E>,
{
    let mut collected = Vec::new();
    for (index, batch) in into_batches(items, batch_size).into_iter().enumerate() {
        match processor(batch) {
            Outcome::Success(values) => collected.extend(values),
            Outcome::Failure(error) => {
                warn!(batch = index, "batch failed, skipping the rest");
                return Outcome::Failure(error);
            }
        }
    }
    Outcome::Success(collected)
}
