#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! The success-or-failure value and its fault boundary.
//!
//! An [`Outcome`] is always exactly one of [`Outcome::Success`] or
//! [`Outcome::Failure`]. It is never mutated in place: every combinator in
//! [`combinators`] and [`future`] consumes it and returns a new value.

pub mod combinators;
pub mod future;

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

pub use future::{AsyncOutcome, OutcomeFutureExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
#[must_use]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
}

/// Builds a successful outcome.
pub const fn success<T, E>(value: T) -> Outcome<T, E> {
    Outcome::Success(value)
}

/// Builds a failed outcome.
pub const fn failure<T, E>(error: E) -> Outcome<T, E> {
    Outcome::Failure(error)
}

/// Zero-information payload for outcomes that only signal completion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Unit;

pub const UNIT: Unit = Unit;

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "()")
    }
}

/// A panic captured at the fault boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Fault {
    message: String,
}

impl Fault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        payload
            .downcast_ref::<&str>()
            .map(|msg| (*msg).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .map_or_else(|| Self::new("operation panicked"), Self::new)
    }
}

impl<T, E> Outcome<T, E> {
    pub const fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub const fn failure(error: E) -> Self {
        Self::Failure(error)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Takes the success payload.
    ///
    /// # Panics
    ///
    /// Panics when called on a `Failure`. Reading the value of a failed
    /// outcome is a contract violation, not a recoverable condition.
    #[allow(clippy::panic)]
    pub fn value(self) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => panic!("Outcome::value called on a Failure"),
        }
    }

    /// Takes the failure payload.
    ///
    /// # Panics
    ///
    /// Panics when called on a `Success`.
    #[allow(clippy::panic)]
    pub fn error(self) -> E {
        match self {
            Self::Failure(error) => error,
            Self::Success(_) => panic!("Outcome::error called on a Success"),
        }
    }

    /// # Panics
    ///
    /// Panics when called on a `Failure`.
    #[allow(clippy::panic)]
    #[must_use]
    pub const fn value_ref(&self) -> &T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => panic!("Outcome::value_ref called on a Failure"),
        }
    }

    /// # Panics
    ///
    /// Panics when called on a `Success`.
    #[allow(clippy::panic)]
    #[must_use]
    pub const fn error_ref(&self) -> &E {
        match self {
            Self::Failure(error) => error,
            Self::Success(_) => panic!("Outcome::error_ref called on a Success"),
        }
    }

    pub const fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn err(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result` for use with `?` at the edges.
    ///
    /// # Errors
    ///
    /// Returns the failure payload as `Err`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }

    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }

    /// Lifts an optional value, producing the error lazily when absent.
    pub fn from_option<F>(option: Option<T>, on_absent: F) -> Self
    where
        F: FnOnce() -> E,
    {
        option.map_or_else(|| Self::Failure(on_absent()), Self::Success)
    }

    /// Runs a fallible operation, absorbing its `Err` through `mapper`.
    pub fn attempt<X, F, M>(op: F, mapper: M) -> Self
    where
        F: FnOnce() -> Result<T, X>,
        M: FnOnce(X) -> E,
    {
        match op() {
            Ok(value) => Self::Success(value),
            Err(fault) => Self::Failure(mapper(fault)),
        }
    }

    /// Runs an operation that may panic. A panic never escapes: it becomes a
    /// `Failure` built by `mapper`.
    pub fn catch_fault<F, M>(op: F, mapper: M) -> Self
    where
        F: FnOnce() -> T,
        M: FnOnce(Fault) -> E,
    {
        match catch_unwind(AssertUnwindSafe(op)) {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Failure(mapper(Fault::from_panic(payload.as_ref()))),
        }
    }
}

impl<E> Outcome<Unit, E> {
    /// Success with no payload.
    pub const fn unit() -> Self {
        Self::Success(UNIT)
    }
}

impl<T, E> Outcome<Outcome<T, E>, E> {
    pub fn flatten(self) -> Outcome<T, E> {
        match self {
            Self::Success(inner) => inner,
            Self::Failure(error) => Outcome::Failure(error),
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => write!(f, "Success({value})"),
            Self::Failure(error) => write!(f, "Failure({error})"),
        }
    }
}
