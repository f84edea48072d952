//! Lock-free counters describing scheduler throughput.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Read-only view of the scheduler counters at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Tasks accepted into the queue.
    pub enqueued: u64,
    /// Tasks that ran to completion (including ones that panicked).
    pub completed: u64,
    /// Tasks currently executing on a worker.
    pub active: u64,
    /// `enqueued - completed`. Never reaches zero once a task has been skipped.
    pub pending: u64,
    /// Tasks dropped at dequeue because they had been cancelled.
    pub skipped: u64,
    /// Tasks that panicked while running.
    pub failed: u64,
    /// Completed tasks per second since the counters were created.
    pub throughput: f64,
    /// Seconds since the counters were created.
    pub elapsed_seconds: f64,
}

/// Thread-safe counters for enqueued, started and completed work.
///
/// `enqueued` and `completed` use sequentially consistent operations and
/// [`snapshot`](Self::snapshot) reads `completed` before `enqueued`, so an
/// observer never sees `completed > enqueued`.
#[derive(Debug)]
pub struct MetricsCounter {
    enqueued: AtomicU64,
    completed: AtomicU64,
    active: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    started_at: Instant,
}

impl Default for MetricsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCounter {
    /// Create zeroed counters; the elapsed clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            active: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// A task was accepted for queueing.
    pub fn task_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
    }

    /// Undo [`task_enqueued`](Self::task_enqueued) for a submission the queue refused.
    pub(crate) fn enqueue_rejected(&self) {
        self.enqueued.fetch_sub(1, Ordering::SeqCst);
    }

    /// A worker began running a task.
    pub fn task_started(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    /// A running task returned.
    pub fn task_completed(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// A running task panicked. It still counts as completed.
    pub fn task_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.task_completed();
    }

    /// A cancelled task was dropped at dequeue without running.
    pub fn task_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total tasks accepted.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::SeqCst)
    }

    /// Total tasks finished.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Tasks in flight.
    pub fn active(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    /// `enqueued - completed`.
    ///
    /// Cancelled-and-skipped tasks are counted as enqueued but never completed,
    /// so this does not reach zero once a cancellation took effect.
    pub fn pending(&self) -> u64 {
        let completed = self.completed();
        self.enqueued().saturating_sub(completed)
    }

    /// Time since the counters were created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Completed tasks per second of [`elapsed`](Self::elapsed) time.
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.completed() as f64 / secs
    }

    /// Get a snapshot of current statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let completed = self.completed.load(Ordering::SeqCst);
        let enqueued = self.enqueued.load(Ordering::SeqCst);
        let elapsed_seconds = self.elapsed().as_secs_f64();
        let throughput = if elapsed_seconds == 0.0 {
            0.0
        } else {
            completed as f64 / elapsed_seconds
        };
        MetricsSnapshot {
            enqueued,
            completed,
            active: self.active(),
            pending: enqueued.saturating_sub(completed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            throughput,
            elapsed_seconds,
        }
    }
}
