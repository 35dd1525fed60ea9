#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! A success-or-failure value with combinators, an async overlay and
//! collection traversals (fail-fast, accumulating, bounded-parallel and
//! batched), plus a small order-management pipeline built on top of it.

pub mod collect;
pub mod config;
pub mod domain;
pub mod error;
pub mod outcome;
pub mod payloads;
pub mod services;
pub mod store;
pub mod transport;

pub use collect::{
    combine, combine_all, first_success, group_by_result, partition, partition_map, sequence,
    sequence_async, traverse, traverse_all, traverse_all_async, traverse_async, traverse_batch,
    traverse_batch_sync, traverse_indexed, traverse_parallel, traverse_parallel_tasks,
};
pub use error::{AppError, AppOutcome};
pub use outcome::{failure, success, AsyncOutcome, Fault, Outcome, OutcomeFutureExt, Unit, UNIT};
pub use payloads::{FieldError, IndexedError, RichError};
