//! Single-slot, multi-reader result handoff for result-bearing submissions.
//!
//! A [`TaskFuture`] is a cheap, cloneable handle. Every clone observes the same
//! slot; any number of threads may block in [`TaskFuture::get`] and all are
//! released together when the producing worker writes the outcome.
//!
//! # Example
//!
//! ```rust
//! use prometheus_task_scheduler::core::TaskFuture;
//! use std::thread;
//!
//! let future = TaskFuture::new();
//! let producer = future.clone();
//! thread::spawn(move || producer.set_result(21 * 2));
//!
//! assert_eq!(future.get(), Ok(42));
//! assert!(future.ready());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::TaskError;

type Outcome<T> = Result<T, TaskError>;

struct FutureInner<T> {
    /// `None` until the producer writes.
    slot: Mutex<Option<Outcome<T>>>,
    ready: Condvar,
}

/// Handle to the eventual outcome of a result-bearing task.
pub struct TaskFuture<T> {
    inner: Arc<FutureInner<T>>,
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TaskFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("ready", &self.ready())
            .finish()
    }
}

impl<T> TaskFuture<T> {
    /// Create an empty future.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FutureInner {
                slot: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Store `value`, mark the future ready and wake every waiter.
    ///
    /// Meant to be called once by the producer. A second call overwrites the
    /// stored outcome (last write wins); readers that already returned keep the
    /// value they saw.
    pub fn set_result(&self, value: T) {
        self.complete(Ok(value));
    }

    /// Store an error outcome, mark the future ready and wake every waiter.
    pub fn set_error(&self, error: TaskError) {
        self.complete(Err(error));
    }

    fn complete(&self, outcome: Outcome<T>) {
        let mut slot = self.inner.slot.lock();
        *slot = Some(outcome);
        drop(slot);
        self.inner.ready.notify_all();
    }

    /// Non-blocking readiness poll.
    pub fn ready(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    /// Wait up to `timeout` for the outcome without consuming it.
    ///
    /// Returns `true` if the future is ready.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut slot = self.inner.slot.lock();
        self.inner
            .ready
            .wait_while_for(&mut slot, |s| s.is_none(), timeout);
        slot.is_some()
    }
}

impl<T: Clone> TaskFuture<T> {
    /// Block until the outcome is written, then return a copy of it.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] recorded by the producer if the task panicked or
    /// was dropped without running.
    pub fn get(&self) -> Result<T, TaskError> {
        let mut slot = self.inner.slot.lock();
        self.inner.ready.wait_while(&mut slot, |s| s.is_none());
        match slot.as_ref() {
            Some(outcome) => outcome.clone(),
            // wait_while only returns once the slot is filled
            None => Err(TaskError::Dropped),
        }
    }

    /// Like [`get`](Self::get), but returns `None` if nothing arrives within `timeout`.
    pub fn get_timeout(&self, timeout: Duration) -> Option<Result<T, TaskError>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.slot.lock();
        self.inner
            .ready
            .wait_while_until(&mut slot, |s| s.is_none(), deadline);
        slot.clone()
    }

    /// The outcome if already written.
    pub fn try_get(&self) -> Option<Result<T, TaskError>> {
        self.inner.slot.lock().clone()
    }
}

#[cfg(feature = "tokio-runtime")]
impl<T: Clone + Send + 'static> TaskFuture<T> {
    /// Await the outcome from async code.
    ///
    /// The blocking wait runs on tokio's blocking thread pool, so the calling
    /// runtime's workers stay free.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get); a failure of the blocking helper is reported as
    /// [`TaskError::Panicked`].
    pub async fn get_async(&self) -> Result<T, TaskError> {
        if let Some(outcome) = self.try_get() {
            return outcome;
        }
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.get())
            .await
            .map_err(|e| TaskError::Panicked(e.to_string()))?
    }
}

/// Producer half held by the adapter task.
///
/// Dropping it without completing resolves the future with
/// [`TaskError::Dropped`], so a task discarded before it runs never leaves its
/// readers blocked.
pub(crate) struct Completer<T> {
    future: Option<TaskFuture<T>>,
}

impl<T> Completer<T> {
    pub(crate) const fn new(future: TaskFuture<T>) -> Self {
        Self {
            future: Some(future),
        }
    }

    pub(crate) fn complete(mut self, outcome: Outcome<T>) {
        if let Some(future) = self.future.take() {
            future.complete(outcome);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(future) = self.future.take() {
            future.set_error(TaskError::Dropped);
        }
    }
}
