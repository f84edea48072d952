//! Fixed-size worker pool executing submitted closures in priority order.
//!
//! # Design
//!
//! - **No polling**: workers block inside the priority queue's Condvar; result
//!   futures use their own Condvar.
//! - **Independent locks**: the queue, the cancellation registry and the metrics
//!   never share a lock, so cancelling never stalls enqueues.
//! - **Drain on shutdown**: closing the queue lets workers finish everything
//!   already queued before they observe `Closed` and exit; teardown joins them.
//! - **Panic isolation**: each task runs under `catch_unwind`, so a failing
//!   task is logged (and delivered to its future) without killing its worker.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::builders::SchedulerBuilder;
use crate::config::SchedulerConfig;
use crate::core::cancellation::CancellationRegistry;
use crate::core::future::{Completer, TaskFuture};
use crate::core::metrics::{MetricsCounter, MetricsSnapshot};
use crate::core::queue::{BlockingPriorityQueue, Dequeued};
use crate::core::task::{panic_message, with_result, Job, Task};
use crate::core::{LogSink, SchedulerError};
use crate::util::{Priority, TaskId};

/// State shared between the scheduler handle and its workers.
struct Shared {
    queue: BlockingPriorityQueue<Task>,
    registry: CancellationRegistry,
    metrics: MetricsCounter,
    log: Arc<dyn LogSink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Draining,
    Stopped,
}

/// Worker handles plus the shutdown phase they are in.
struct Workers {
    handles: Vec<JoinHandle<()>>,
    thread_ids: Vec<ThreadId>,
    phase: Phase,
}

/// In-process priority scheduler backed by dedicated OS threads.
///
/// ```rust
/// use prometheus_task_scheduler::core::Scheduler;
/// use prometheus_task_scheduler::util::Priority;
///
/// let scheduler = Scheduler::new(2)?;
/// let answer = scheduler.submit_with_result(|| 6 * 7, Priority::High)?;
/// assert_eq!(answer.get(), Ok(42));
/// scheduler.shutdown();
/// # Ok::<(), prometheus_task_scheduler::core::SchedulerError>(())
/// ```
pub struct Scheduler {
    config: SchedulerConfig,
    shared: Arc<Shared>,
    workers: Mutex<Workers>,
    stopped: Condvar,
}

impl Scheduler {
    /// Start a scheduler with `worker_count` workers, default settings and
    /// `tracing`-backed logging.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if `worker_count` is 0
    /// - `SchedulerError::Spawn` if a worker thread cannot be started
    pub fn new(worker_count: usize) -> Result<Self, SchedulerError> {
        SchedulerBuilder::new().with_worker_count(worker_count).build()
    }

    /// Start configuring a scheduler.
    #[must_use]
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    /// Start a scheduler from a validated configuration and a log sink.
    ///
    /// Exactly `config.worker_count` workers are running when this returns.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the configuration is invalid
    /// - `SchedulerError::Spawn` if a worker thread cannot be started; workers
    ///   already started are shut down and joined first
    pub fn with_config(
        config: SchedulerConfig,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let shared = Arc::new(Shared {
            queue: BlockingPriorityQueue::new(),
            registry: CancellationRegistry::new(),
            metrics: MetricsCounter::new(),
            log,
        });

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            match spawn_worker(worker_id, Arc::clone(&shared), &config) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    shared.queue.shutdown();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    shared
                        .log
                        .error(&format!("failed to start worker {worker_id}: {e}"));
                    return Err(SchedulerError::Spawn(e));
                }
            }
        }

        shared.log.info(&format!(
            "scheduler started with {} worker thread(s)",
            config.worker_count
        ));

        let thread_ids = workers.iter().map(|h| h.thread().id()).collect();
        Ok(Self {
            config,
            shared,
            workers: Mutex::new(Workers {
                handles: workers,
                thread_ids,
                phase: Phase::Running,
            }),
            stopped: Condvar::new(),
        })
    }

    /// Fire-and-forget submission at the configured default priority
    /// (`Medium` unless configured otherwise).
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` once the scheduler has been shut down.
    pub fn submit<F>(&self, job: F) -> Result<(), SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_with_priority(job, self.config.default_priority)
    }

    /// Fire-and-forget submission at `priority`.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` once the scheduler has been shut down.
    pub fn submit_with_priority<F>(&self, job: F, priority: Priority) -> Result<(), SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task::new(Box::new(job), priority))
    }

    /// Submit work that can be cancelled until a worker dequeues it.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` once the scheduler has been shut down.
    pub fn submit_cancellable<F>(
        &self,
        job: F,
        priority: Priority,
    ) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push_cancellable(Box::new(job), priority)
    }

    /// Request cancellation of a task returned by a cancellable submission.
    ///
    /// Returns `false` for an unknown id. Returns `true` for any known id; the
    /// request only prevents execution if it lands before a worker dequeues the
    /// task. A running or finished task is unaffected.
    pub fn cancel(&self, id: TaskId) -> bool {
        let found = self.shared.registry.cancel(id);
        if found {
            debug!(task_id = id, "Cancellation requested");
        } else {
            debug!(task_id = id, "Cancellation requested for unknown task");
        }
        found
    }

    /// Submit a value-producing closure and get a future for its outcome.
    ///
    /// Returns immediately. If the closure panics the future resolves to
    /// [`TaskError::Panicked`](crate::core::TaskError::Panicked).
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` once the scheduler has been shut down.
    pub fn submit_with_result<T, F>(
        &self,
        job: F,
        priority: Priority,
    ) -> Result<TaskFuture<T>, SchedulerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let future = TaskFuture::new();
        let job = with_result(job, Completer::new(future.clone()));
        self.push(Task::new(job, priority))?;
        Ok(future)
    }

    /// Cancellable variant of [`submit_with_result`](Self::submit_with_result).
    ///
    /// A task cancelled before it runs resolves its future with
    /// [`TaskError::Dropped`](crate::core::TaskError::Dropped).
    ///
    /// # Errors
    ///
    /// `SchedulerError::Closed` once the scheduler has been shut down.
    pub fn submit_cancellable_with_result<T, F>(
        &self,
        job: F,
        priority: Priority,
    ) -> Result<(TaskId, TaskFuture<T>), SchedulerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let future = TaskFuture::new();
        let job = with_result(job, Completer::new(future.clone()));
        let id = self.push_cancellable(job, priority)?;
        Ok((id, future))
    }

    /// Get a snapshot of the scheduler counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Tasks waiting in the queue right now (racy, diagnostics only).
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Number of worker threads started at construction.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Cancellation entries retained so far.
    #[must_use]
    pub fn registry_len(&self) -> usize {
        self.shared.registry.len()
    }

    /// Whether [`shutdown`](Self::shutdown) has begun.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.queue.is_shutdown()
    }

    /// Stop accepting work, run everything already queued (except cancelled
    /// tasks), join the workers and release the cancellation registry.
    ///
    /// Idempotent. Also runs when the scheduler is dropped. Concurrent callers
    /// all block until the drain has finished. Called from inside a task, it
    /// closes the queue and joins every other worker without waiting for its
    /// own; the calling worker exits once it finishes its current task.
    pub fn shutdown(&self) {
        self.shared.queue.shutdown();

        let current = thread::current().id();
        let mut workers = self.workers.lock();
        match workers.phase {
            Phase::Stopped => return,
            Phase::Draining => {
                // a worker cannot wait for the join of its own thread
                if !workers.thread_ids.contains(&current) {
                    self.stopped.wait_while(&mut workers, |w| w.phase != Phase::Stopped);
                }
                return;
            }
            Phase::Running => workers.phase = Phase::Draining,
        }
        let handles = std::mem::take(&mut workers.handles);
        drop(workers);

        self.shared.log.info("shutting down scheduler, draining queued tasks");

        let worker_count = handles.len();
        for (idx, handle) in handles.into_iter().enumerate() {
            if handle.thread().id() == current {
                debug!(worker_id = idx, "Shutdown called from worker; not joining self");
                continue;
            }
            if handle.join().is_err() {
                warn!(worker_id = idx, "Worker panicked outside a task");
            } else {
                debug!(worker_id = idx, "Worker joined successfully");
            }
        }

        self.shared.registry.clear();

        let stats = self.shared.metrics.snapshot();
        self.shared.log.success(&format!(
            "scheduler shut down: {worker_count} worker(s) joined, \
             {} completed, {} skipped, {} failed",
            stats.completed, stats.skipped, stats.failed
        ));

        self.workers.lock().phase = Phase::Stopped;
        self.stopped.notify_all();
    }

    fn push_cancellable(&self, job: Job, priority: Priority) -> Result<TaskId, SchedulerError> {
        let (id, flag) = self.shared.registry.register();
        if let Err(e) = self.push(Task::cancellable(job, priority, id, flag)) {
            // shutdown may have cleared the registry before this entry landed
            self.shared.registry.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    fn push(&self, task: Task) -> Result<(), SchedulerError> {
        // counted before it becomes visible to workers so completed <= enqueued
        self.shared.metrics.task_enqueued();
        let priority = task.priority;
        if let Err(rejected) = self.shared.queue.enqueue(task) {
            self.shared.metrics.enqueue_rejected();
            drop(rejected);
            return Err(self.reject());
        }
        debug!(%priority, "Task submitted to scheduler");
        Ok(())
    }

    fn reject(&self) -> SchedulerError {
        self.shared
            .log
            .warning("submission rejected: scheduler is shut down");
        SchedulerError::Closed
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("worker_count", &self.config.worker_count)
            .field("queued", &self.queued())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

/// Spawn a worker thread.
fn spawn_worker(
    worker_id: usize,
    shared: Arc<Shared>,
    config: &SchedulerConfig,
) -> std::io::Result<JoinHandle<()>> {
    let mut builder =
        thread::Builder::new().name(format!("{}-{worker_id}", config.thread_name_prefix));
    if let Some(stack_size) = config.thread_stack_size {
        builder = builder.stack_size(stack_size);
    }
    builder.spawn(move || run_worker(worker_id, &shared))
}

/// Worker loop: block on the queue, skip cancelled tasks, run the rest.
/// Terminates when the queue reports `Closed`.
fn run_worker(worker_id: usize, shared: &Shared) {
    debug!(worker_id = worker_id, "Worker thread started");

    loop {
        let task = match shared.queue.dequeue() {
            Dequeued::Item(task) => task,
            Dequeued::Closed => {
                debug!(worker_id = worker_id, "Queue closed and drained, exiting");
                break;
            }
        };

        if task.is_cancelled() {
            shared.metrics.task_skipped();
            debug!(worker_id = worker_id, task_id = ?task.id, "Skipping cancelled task");
            continue;
        }

        let label = task.label();
        shared.metrics.task_started();
        debug!(worker_id = worker_id, task = %label, "Worker executing task");

        match panic::catch_unwind(AssertUnwindSafe(task.job)) {
            Ok(()) => {
                shared.metrics.task_completed();
                shared.log.task(&format!("{label} completed on worker {worker_id}"));
            }
            Err(payload) => {
                shared.metrics.task_failed();
                shared.log.error(&format!(
                    "{label} panicked on worker {worker_id}: {}",
                    panic_message(payload.as_ref())
                ));
            }
        }
    }

    debug!(worker_id = worker_id, "Worker thread exiting");
}
