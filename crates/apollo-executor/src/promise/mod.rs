//! Values that may become available later, and the [`PromiseAdapter`] capability
//! the executor sequences its work through.
//!
//! The executor never spawns tasks or blocks on its own.
//! It only chains and joins [`Promise`]s through an adapter,
//! so the same code runs over immediately-available values ([`SyncPromiseAdapter`])
//! or a real asynchronous runtime ([`FuturesPromiseAdapter`]).

use crate::execution::FieldError;
use crate::execution::FieldValue;
use crate::execution::Thenable;
use crate::schema::SchemaConfigError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

mod futures_adapter;
mod sync;

pub use self::futures_adapter::FuturesPromiseAdapter;
pub use self::sync::SyncPromiseAdapter;

/// A value of type `T`, or the reason it could not be produced, possibly not available yet.
///
/// A promise is a [`Future`]: it can be awaited on any executor.
/// [`PromiseAdapter`] methods act immediately on promises that are already settled.
#[must_use]
pub struct Promise<T> {
    /// `None` after the result was taken by polling
    state: Option<State<T>>,
}

enum State<T> {
    Settled(Result<T, Rejection>),
    Pending(BoxFuture<'static, Result<T, Rejection>>),
}

/// Why a [`Promise`] was rejected
#[derive(Debug, Clone, thiserror::Error)]
pub enum Rejection {
    #[error("{0}")]
    Field(FieldError),

    #[error("{0}")]
    SchemaConfig(SchemaConfigError),

    #[error("panicked: {0}")]
    Panic(String),

    /// The settling side was dropped without resolving or rejecting
    #[error("promise was abandoned before settling")]
    Abandoned,
}

/// Contract violation when blocking on a promise
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
    #[error("promise is still pending but no deferred work is left that could settle it")]
    NeverSettles,

    #[error("this promise adapter can not block until a promise settles")]
    Unsupported,
}

/// Callback for a rejected promise, given to [`PromiseAdapter::then`]
pub type OnRejected<U> = Box<dyn FnOnce(Rejection) -> Promise<U> + Send>;

/// The settling side of a promise made by [`PromiseAdapter::create`]
///
/// Dropping it without calling either method rejects the promise with [`Rejection::Abandoned`].
pub struct Settle<T> {
    sender: futures::channel::oneshot::Sender<Result<T, Rejection>>,
}

/// Operations the executor uses to sequence values that may not be available yet.
///
/// Default implementations act on settled promises immediately
/// and chain pending ones as futures.
pub trait PromiseAdapter: Send + Sync {
    /// Whether a resolved value is still to be awaited
    fn is_thenable(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Future(_))
    }

    /// Wrap a future returned by a resolver
    fn convert_thenable(&self, thenable: Thenable) -> Promise<FieldValue> {
        match thenable.take() {
            Some(future) => {
                Promise::from_future(async move { future.await.map_err(Rejection::Field) })
            }
            None => Promise::rejected(Rejection::Abandoned),
        }
    }

    /// Chain a callback for each outcome.
    ///
    /// Exactly one callback runs. Without `on_rejected` the rejection is passed through.
    /// A panic in a callback rejects the returned promise.
    fn then<T, U>(
        &self,
        promise: Promise<T>,
        on_fulfilled: impl FnOnce(T) -> Promise<U> + Send + 'static,
        on_rejected: Option<OnRejected<U>>,
    ) -> Promise<U>
    where
        T: Send + 'static,
        U: Send + 'static,
    {
        promise.then(on_fulfilled, on_rejected)
    }

    /// Make a promise settled by `executor`, now or later.
    ///
    /// A panic in `executor` rejects the promise.
    fn create<T: Send + 'static>(&self, executor: impl FnOnce(Settle<T>)) -> Promise<T> {
        let (sender, mut receiver) = futures::channel::oneshot::channel();
        if let Err(payload) =
            std::panic::catch_unwind(AssertUnwindSafe(|| executor(Settle { sender })))
        {
            return Promise::rejected(panic_rejection(payload));
        }
        match receiver.try_recv() {
            Ok(Some(result)) => Promise::settled(result),
            Ok(None) => Promise::from_future(async move {
                receiver.await.unwrap_or(Err(Rejection::Abandoned))
            }),
            Err(_canceled) => Promise::rejected(Rejection::Abandoned),
        }
    }

    fn create_fulfilled<T: Send + 'static>(&self, value: T) -> Promise<T> {
        Promise::fulfilled(value)
    }

    fn create_rejected<T: Send + 'static>(&self, reason: Rejection) -> Promise<T> {
        Promise::rejected(reason)
    }

    /// Join promises into one promise of every value, in input order.
    ///
    /// If any promise rejects, the returned promise rejects with the first rejection
    /// in input order. Other results are discarded.
    fn all<T: Send + 'static>(&self, promises: Vec<Promise<T>>) -> Promise<Vec<T>> {
        Promise::all(promises)
    }

    /// Block until the promise settles.
    ///
    /// Only adapters that can drive every promise they create to completion support this.
    fn wait<T: Send + 'static>(
        &self,
        promise: Promise<T>,
    ) -> Result<Result<T, Rejection>, PromiseError> {
        drop(promise);
        Err(PromiseError::Unsupported)
    }
}

impl<T: Send + 'static> Promise<T> {
    pub fn fulfilled(value: T) -> Self {
        Self::settled(Ok(value))
    }

    pub fn rejected(reason: Rejection) -> Self {
        Self::settled(Err(reason))
    }

    pub fn settled(result: Result<T, Rejection>) -> Self {
        Self {
            state: Some(State::Settled(result)),
        }
    }

    /// A promise settled when `future` completes. A panic while polling rejects it.
    pub fn from_future(
        future: impl Future<Output = Result<T, Rejection>> + Send + 'static,
    ) -> Self {
        let future = AssertUnwindSafe(future)
            .catch_unwind()
            .map(|result| result.unwrap_or_else(|payload| Err(panic_rejection(payload))));
        Self {
            state: Some(State::Pending(future.boxed())),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, Some(State::Settled(_)))
    }

    /// Poll once without a waker, and return whether the promise is now settled.
    pub fn try_settle(&mut self) -> bool {
        if let Some(State::Pending(future)) = &mut self.state {
            let mut cx = Context::from_waker(futures::task::noop_waker_ref());
            if let Poll::Ready(result) = future.as_mut().poll(&mut cx) {
                self.state = Some(State::Settled(result))
            }
        }
        self.is_settled()
    }

    /// The outcome if settled, or the promise itself if still pending
    pub fn into_settled(self) -> Result<Result<T, Rejection>, Self> {
        match self.state {
            Some(State::Settled(result)) => Ok(result),
            Some(State::Pending(_)) => Err(self),
            None => Ok(Err(Rejection::Abandoned)),
        }
    }

    pub(crate) fn then<U: Send + 'static>(
        self,
        on_fulfilled: impl FnOnce(T) -> Promise<U> + Send + 'static,
        on_rejected: Option<OnRejected<U>>,
    ) -> Promise<U> {
        let callback = move |result: Result<T, Rejection>| match result {
            Ok(value) => guarded(|| on_fulfilled(value)),
            Err(reason) => match on_rejected {
                Some(on_rejected) => guarded(|| on_rejected(reason)),
                None => Promise::rejected(reason),
            },
        };
        match self.into_settled() {
            Ok(result) => callback(result),
            Err(pending) => Promise::from_future(async move { callback(pending.await).await }),
        }
    }

    pub(crate) fn all(promises: Vec<Self>) -> Promise<Vec<T>> {
        if promises.iter().all(Promise::is_settled) {
            return Promise::settled(
                promises
                    .into_iter()
                    .map(|promise| match promise.into_settled() {
                        Ok(result) => result,
                        Err(_pending) => Err(Rejection::Abandoned),
                    })
                    .collect(),
            );
        }
        Promise::from_future(async move {
            futures::future::join_all(promises)
                .await
                .into_iter()
                .collect()
        })
    }
}

impl<T> Future for Promise<T> {
    type Output = Result<T, Rejection>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.state.take() {
            Some(State::Settled(result)) => Poll::Ready(result),
            Some(State::Pending(mut future)) => match future.as_mut().poll(cx) {
                Poll::Ready(result) => Poll::Ready(result),
                Poll::Pending => {
                    this.state = Some(State::Pending(future));
                    Poll::Pending
                }
            },
            None => Poll::Ready(Err(Rejection::Abandoned)),
        }
    }
}

// Never pinned structurally: the pending future is already boxed
impl<T> Unpin for Promise<T> {}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            Some(State::Settled(Ok(_))) => "fulfilled",
            Some(State::Settled(Err(_))) => "rejected",
            Some(State::Pending(_)) => "pending",
            None => "taken",
        };
        f.debug_tuple("Promise").field(&state).finish()
    }
}

impl<T> Settle<T> {
    pub fn resolve(self, value: T) {
        // The promise was dropped: nobody is interested in the value
        let _ = self.sender.send(Ok(value));
    }

    pub fn reject(self, reason: Rejection) {
        let _ = self.sender.send(Err(reason));
    }
}

impl From<FieldError> for Rejection {
    fn from(error: FieldError) -> Self {
        Self::Field(error)
    }
}

impl From<SchemaConfigError> for Rejection {
    fn from(error: SchemaConfigError) -> Self {
        Self::SchemaConfig(error)
    }
}

fn guarded<U: Send + 'static>(callback: impl FnOnce() -> Promise<U>) -> Promise<U> {
    std::panic::catch_unwind(AssertUnwindSafe(callback))
        .unwrap_or_else(|payload| Promise::rejected(panic_rejection(payload)))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

fn panic_rejection(payload: Box<dyn Any + Send>) -> Rejection {
    let message = panic_message(&*payload);
    tracing::warn!(panic = %message, "promise callback panicked");
    Rejection::Panic(message)
}
