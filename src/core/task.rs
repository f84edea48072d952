//! Task records queued by the scheduler and the adapters that build them.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::core::cancellation::CancellationFlag;
use crate::core::future::Completer;
use crate::core::queue::Prioritized;
use crate::core::TaskError;
use crate::util::{Priority, TaskId};

/// Type-erased unit of work run on a worker thread.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// One submitted unit of work, consumed by the worker that dequeues it.
pub(crate) struct Task {
    pub job: Job,
    pub priority: Priority,
    /// Present only for cancellable submissions.
    pub id: Option<TaskId>,
    pub cancel: Option<CancellationFlag>,
}

impl Task {
    pub(crate) fn new(job: Job, priority: Priority) -> Self {
        Self {
            job,
            priority,
            id: None,
            cancel: None,
        }
    }

    pub(crate) fn cancellable(
        job: Job,
        priority: Priority,
        id: TaskId,
        flag: CancellationFlag,
    ) -> Self {
        Self {
            job,
            priority,
            id: Some(id),
            cancel: Some(flag),
        }
    }

    /// Whether the linked cancellation flag has been set.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled)
    }

    /// Human-readable label for log messages.
    pub(crate) fn label(&self) -> String {
        self.id.map_or_else(
            || format!("task ({})", self.priority),
            |id| format!("task {id} ({})", self.priority),
        )
    }
}

impl Prioritized for Task {
    fn priority(&self) -> Priority {
        self.priority
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("priority", &self.priority)
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Wrap a value-returning closure so that its outcome lands in `completer`.
///
/// A panic is recorded in the future as [`TaskError::Panicked`] and then
/// resumed, so the worker loop still sees and reports the failure.
pub(crate) fn with_result<T, F>(job: F, completer: Completer<T>) -> Job
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Box::new(move || match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(value) => completer.complete(Ok(value)),
        Err(payload) => {
            completer.complete(Err(TaskError::Panicked(panic_message(payload.as_ref()))));
            panic::resume_unwind(payload);
        }
    })
}

/// Extract the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
