#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Async overlay: the single-outcome combinators lifted over a future.
//!
//! An [`AsyncOutcome`] wraps a future resolving to an [`Outcome`]. Each
//! combinator returns a new `AsyncOutcome` whose future first awaits the
//! wrapped one, so a chain runs strictly in program order and nothing runs
//! until the chain is awaited. Dropping the outer future drops whichever inner
//! future is pending; no combinator spawns work of its own.

use super::{Fault, Outcome, Unit, UNIT};
use futures_util::FutureExt;
use std::future::{Future, IntoFuture, Ready};
use std::panic::AssertUnwindSafe;

#[must_use = "an AsyncOutcome does nothing until awaited"]
#[derive(Debug)]
pub struct AsyncOutcome<F> {
    inner: F,
}

impl<F> AsyncOutcome<F> {
    pub const fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<T, E> AsyncOutcome<Ready<Outcome<T, E>>> {
    /// Wraps an already-computed outcome.
    pub fn ready(outcome: Outcome<T, E>) -> Self {
        Self::new(std::future::ready(outcome))
    }
}

impl<F: Future> IntoFuture for AsyncOutcome<F> {
    type Output = F::Output;
    type IntoFuture = F;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

/// Lifts any future of an [`Outcome`] into the async combinator surface.
pub trait OutcomeFutureExt<T, E>: Future<Output = Outcome<T, E>> + Sized {
    fn async_outcome(self) -> AsyncOutcome<Self> {
        AsyncOutcome::new(self)
    }
}

impl<F, T, E> OutcomeFutureExt<T, E> for F where F: Future<Output = Outcome<T, E>> {}

impl<T, E> Outcome<T, E> {
    pub fn into_async(self) -> AsyncOutcome<Ready<Self>> {
        AsyncOutcome::ready(self)
    }

    /// Async counterpart of [`Outcome::attempt`].
    pub async fn attempt_async<X, Fut, M>(op: Fut, mapper: M) -> Self
    where
        Fut: Future<Output = Result<T, X>>,
        M: FnOnce(X) -> E,
    {
        match op.await {
            Ok(value) => Self::Success(value),
            Err(fault) => Self::Failure(mapper(fault)),
        }
    }

    /// Async counterpart of [`Outcome::catch_fault`]: a panic while polling
    /// `op` becomes a failure.
    pub async fn catch_fault_async<Fut, M>(op: Fut, mapper: M) -> Self
    where
        Fut: Future<Output = T>,
        M: FnOnce(Fault) -> E,
    {
        match AssertUnwindSafe(op).catch_unwind().await {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Failure(mapper(Fault::from_panic(payload.as_ref()))),
        }
    }
}

impl<F, T, E> AsyncOutcome<F>
where
    F: Future<Output = Outcome<T, E>>,
{
    pub async fn resolve(self) -> Outcome<T, E> {
        self.inner.await
    }

    pub async fn is_success(self) -> bool {
        self.inner.await.is_success()
    }

    pub async fn is_failure(self) -> bool {
        self.inner.await.is_failure()
    }

    pub async fn match_with<R, S, G>(self, on_success: S, on_failure: G) -> R
    where
        S: FnOnce(T) -> R,
        G: FnOnce(E) -> R,
    {
        self.inner.await.match_with(on_success, on_failure)
    }

    pub fn map<U, G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<U, E>>>
    where
        G: FnOnce(T) -> U,
    {
        AsyncOutcome::new(async move { self.inner.await.map(f) })
    }

    pub fn map_async<U, G, Fut>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<U, E>>>
    where
        G: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => Outcome::Success(f(value).await),
                Outcome::Failure(error) => Outcome::Failure(error),
            }
        })
    }

    pub fn map_error<E2, G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E2>>>
    where
        G: FnOnce(E) -> E2,
    {
        AsyncOutcome::new(async move { self.inner.await.map_error(f) })
    }

    pub fn map_error_async<E2, G, Fut>(
        self,
        f: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<T, E2>>>
    where
        G: FnOnce(E) -> Fut,
        Fut: Future<Output = E2>,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => Outcome::Success(value),
                Outcome::Failure(error) => Outcome::Failure(f(error).await),
            }
        })
    }

    /// Chains an async continuation. The continuation is not called, and so
    /// its future is not created, until the wrapped future resolves.
    pub fn bind<U, G, Fut>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<U, E>>>
    where
        G: FnOnce(T) -> Fut,
        Fut: IntoFuture<Output = Outcome<U, E>>,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => f(value).await,
                Outcome::Failure(error) => Outcome::Failure(error),
            }
        })
    }

    pub fn bind_sync<U, G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<U, E>>>
    where
        G: FnOnce(T) -> Outcome<U, E>,
    {
        AsyncOutcome::new(async move { self.inner.await.bind(f) })
    }

    pub fn tap<G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(&T),
    {
        AsyncOutcome::new(async move { self.inner.await.tap(f) })
    }

    /// Awaits a side effect built from the success payload, then yields the
    /// original outcome.
    pub fn tap_async<G, Fut>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(&T) -> Fut,
        Fut: Future<Output = ()>,
    {
        AsyncOutcome::new(async move {
            let outcome = self.inner.await;
            let effect = match &outcome {
                Outcome::Success(value) => Some(f(value)),
                Outcome::Failure(_) => None,
            };
            if let Some(effect) = effect {
                effect.await;
            }
            outcome
        })
    }

    pub fn tap_error<G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(&E),
    {
        AsyncOutcome::new(async move { self.inner.await.tap_error(f) })
    }

    pub fn tap_error_async<G, Fut>(
        self,
        f: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(&E) -> Fut,
        Fut: Future<Output = ()>,
    {
        AsyncOutcome::new(async move {
            let outcome = self.inner.await;
            let effect = match &outcome {
                Outcome::Success(_) => None,
                Outcome::Failure(error) => Some(f(error)),
            };
            if let Some(effect) = effect {
                effect.await;
            }
            outcome
        })
    }

    pub fn ensure<P, G>(
        self,
        predicate: P,
        error_factory: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        P: FnOnce(&T) -> bool,
        G: FnOnce(&T) -> E,
    {
        AsyncOutcome::new(async move { self.inner.await.ensure(predicate, error_factory) })
    }

    pub fn ensure_async<P, PFut, G>(
        self,
        predicate: P,
        error_factory: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        P: FnOnce(&T) -> PFut,
        PFut: Future<Output = bool>,
        G: FnOnce(&T) -> E,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => {
                    if predicate(&value).await {
                        Outcome::Success(value)
                    } else {
                        Outcome::Failure(error_factory(&value))
                    }
                }
                Outcome::Failure(error) => Outcome::Failure(error),
            }
        })
    }

    pub fn or_else(
        self,
        fallback: Outcome<T, E>,
    ) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>> {
        AsyncOutcome::new(async move { self.inner.await.or_else(fallback) })
    }

    /// On failure, awaits the fallback produced from the error.
    pub fn or_else_with<G, Fut>(self, fallback: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(E) -> Fut,
        Fut: IntoFuture<Output = Outcome<T, E>>,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => Outcome::Success(value),
                Outcome::Failure(error) => fallback(error).await,
            }
        })
    }

    pub fn recover<G>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(E) -> T,
    {
        AsyncOutcome::new(async move { self.inner.await.recover(f) })
    }

    pub fn recover_async<G, Fut>(self, f: G) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        G: FnOnce(E) -> Fut,
        Fut: Future<Output = T>,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(value) => Outcome::Success(value),
                Outcome::Failure(error) => Outcome::Success(f(error).await),
            }
        })
    }

    /// Awaits `self`, then `other`. A left failure is returned without
    /// polling `other` at all.
    pub fn zip<U, R, O, G>(
        self,
        other: O,
        combiner: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<R, E>>>
    where
        O: IntoFuture<Output = Outcome<U, E>>,
        G: FnOnce(T, U) -> R,
    {
        AsyncOutcome::new(async move {
            match self.inner.await {
                Outcome::Success(left) => match other.await {
                    Outcome::Success(right) => Outcome::Success(combiner(left, right)),
                    Outcome::Failure(error) => Outcome::Failure(error),
                },
                Outcome::Failure(error) => Outcome::Failure(error),
            }
        })
    }

    pub fn zip_left<U, O>(self, other: O) -> AsyncOutcome<impl Future<Output = Outcome<T, E>>>
    where
        O: IntoFuture<Output = Outcome<U, E>>,
    {
        self.zip(other, |left, _| left)
    }

    pub fn zip_right<U, O>(self, other: O) -> AsyncOutcome<impl Future<Output = Outcome<U, E>>>
    where
        O: IntoFuture<Output = Outcome<U, E>>,
    {
        self.zip(other, |_, right| right)
    }

    pub fn bi_map<U, E2, S, G>(
        self,
        on_success: S,
        on_failure: G,
    ) -> AsyncOutcome<impl Future<Output = Outcome<U, E2>>>
    where
        S: FnOnce(T) -> U,
        G: FnOnce(E) -> E2,
    {
        AsyncOutcome::new(async move { self.inner.await.bi_map(on_success, on_failure) })
    }

    pub fn discard(self) -> AsyncOutcome<impl Future<Output = Outcome<Unit, E>>> {
        self.map(|_| UNIT)
    }

    pub async fn value_or(self, default: T) -> T {
        self.inner.await.value_or(default)
    }

    pub async fn value_or_else<G>(self, default: G) -> T
    where
        G: FnOnce() -> T,
    {
        self.inner.await.value_or_else(default)
    }

    pub async fn value_or_handle<G>(self, handler: G) -> T
    where
        G: FnOnce(E) -> T,
    {
        self.inner.await.value_or_handle(handler)
    }
}
