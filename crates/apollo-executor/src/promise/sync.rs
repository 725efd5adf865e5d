use super::panic_message;
use super::Promise;
use super::PromiseAdapter;
use super::PromiseError;
use super::Rejection;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

type Task = Box<dyn FnOnce() + Send>;

/// Adapter for resolvers that return values immediately,
/// or settle promises from [deferred tasks][Self::defer].
///
/// [`wait`][PromiseAdapter::wait] runs deferred tasks until the promise settles,
/// without any event loop. This allows batching resolvers ("data loaders"):
/// each resolver registers what it needs and defers settling its promise,
/// the first deferred task loads everything registered so far.
///
/// Cloning is cheap: clones share the same queue.
#[derive(Clone, Default)]
pub struct SyncPromiseAdapter {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl SyncPromiseAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task to run during [`wait`][PromiseAdapter::wait], after previously deferred ones
    pub fn defer(&self, task: impl FnOnce() + Send + 'static) {
        self.queue.lock().push_back(Box::new(task))
    }

    /// Number of deferred tasks not run yet
    pub fn pending_tasks(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run one deferred task. A panic in the task is logged and otherwise ignored:
    /// promises it would have settled are rejected as abandoned.
    fn run_next(&self) -> bool {
        // Not holding the lock while running: the task may defer more tasks
        let next = self.queue.lock().pop_front();
        let Some(task) = next else {
            return false;
        };
        if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(task)) {
            tracing::warn!(panic = %panic_message(&*payload), "deferred task panicked")
        }
        true
    }
}

impl PromiseAdapter for SyncPromiseAdapter {
    /// Fails with [`PromiseError::NeverSettles`] if the promise is still pending
    /// after every deferred task ran, such as a future driven by another runtime.
    fn wait<T: Send + 'static>(
        &self,
        mut promise: Promise<T>,
    ) -> Result<Result<T, Rejection>, PromiseError> {
        loop {
            if promise.try_settle() {
                return promise
                    .into_settled()
                    .map_err(|_pending| PromiseError::NeverSettles);
            }
            if !self.run_next() {
                return Err(PromiseError::NeverSettles);
            }
        }
    }
}

impl std::fmt::Debug for SyncPromiseAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncPromiseAdapter")
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}
