#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Combinators over a single [`Outcome`].
//!
//! None of these catch panics. A panic raised inside a mapping function is a
//! defect and unwinds through the combinator; only
//! [`Outcome::catch_fault`] turns a panic into a failure.

use super::{Outcome, Unit, UNIT};

impl<T, E> Outcome<T, E> {
    /// Folds both branches into one value. Exactly one closure runs.
    pub fn match_with<R, S, F>(self, on_success: S, on_failure: F) -> R
    where
        S: FnOnce(T) -> R,
        F: FnOnce(E) -> R,
    {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(error) => on_failure(error),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map_error<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// Replaces a success with the outcome of `f`; failures pass through.
    pub fn bind<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Runs `f` on the success payload for its side effect only.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Self::Success(value) = &self {
            f(value);
        }
        self
    }

    pub fn tap_error<F>(self, f: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Self::Failure(error) = &self {
            f(error);
        }
        self
    }

    /// Turns a success into a failure when `predicate` rejects its value.
    pub fn ensure<P, F>(self, predicate: P, error_factory: F) -> Self
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(&T) -> E,
    {
        match self {
            Self::Success(value) => {
                if predicate(&value) {
                    Self::Success(value)
                } else {
                    Self::Failure(error_factory(&value))
                }
            }
            failed @ Self::Failure(_) => failed,
        }
    }

    /// Substitutes `fallback` for a failure.
    pub fn or_else(self, fallback: Self) -> Self {
        match self {
            Self::Success(_) => self,
            Self::Failure(_) => fallback,
        }
    }

    /// Substitutes the outcome of `fallback(error)` for a failure.
    pub fn or_else_with<F>(self, fallback: F) -> Self
    where
        F: FnOnce(E) -> Self,
    {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Failure(error) => fallback(error),
        }
    }

    pub fn recover<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Failure(error) => Self::Success(f(error)),
        }
    }

    /// Combines two successes. When both sides fail the left error wins and
    /// the right one is dropped.
    pub fn zip<U, R, F>(self, other: Outcome<U, E>, combiner: F) -> Outcome<R, E>
    where
        F: FnOnce(T, U) -> R,
    {
        match (self, other) {
            (Self::Success(left), Outcome::Success(right)) => {
                Outcome::Success(combiner(left, right))
            }
            (Self::Failure(error), _) | (Self::Success(_), Outcome::Failure(error)) => {
                Outcome::Failure(error)
            }
        }
    }

    pub fn zip_left<U>(self, other: Outcome<U, E>) -> Self {
        self.zip(other, |left, _| left)
    }

    pub fn zip_right<U>(self, other: Outcome<U, E>) -> Outcome<U, E> {
        self.zip(other, |_, right| right)
    }

    pub fn bi_map<U, E2, S, F>(self, on_success: S, on_failure: F) -> Outcome<U, E2>
    where
        S: FnOnce(T) -> U,
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success(value) => Outcome::Success(on_success(value)),
            Self::Failure(error) => Outcome::Failure(on_failure(error)),
        }
    }

    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default,
        }
    }

    pub fn value_or_else<F>(self, default: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default(),
        }
    }

    /// Unwraps, deriving the fallback value from the error.
    pub fn value_or_handle<F>(self, handler: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => handler(error),
        }
    }

    /// Drops the success payload, keeping only the fact of success.
    pub fn discard(self) -> Outcome<Unit, E> {
        self.map(|_| UNIT)
    }
}
