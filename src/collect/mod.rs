#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Operations over many outcomes.
//!
//! - [`fail_fast`]: stop at the first failure in input order.
//! - [`accumulate`]: look at every element and keep every error.
//! - [`parallel`]: fan out under a concurrency cap, report by input index.
//! - [`batch`]: process fixed-size chunks one after another.

pub mod accumulate;
pub mod batch;
pub mod fail_fast;
pub mod parallel;

pub use accumulate::{
    combine_all, first_success, group_by_result, partition_map, traverse_all, traverse_all_async,
};
pub use batch::{traverse_batch, traverse_batch_sync};
pub use fail_fast::{
    combine, partition, sequence, sequence_async, traverse, traverse_async, traverse_indexed,
};
pub use parallel::{traverse_parallel, traverse_parallel_tasks};

use tracing::warn;

/// Clamps a size argument to at least one.
pub(crate) fn at_least_one(value: usize, argument: &'static str) -> usize {
    if value == 0 {
        warn!(argument, "zero is not a usable size, using 1");
        1
    } else {
        value
    }
}
