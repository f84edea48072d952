//! Core scheduling: priority queue, worker pool, cancellation and result futures.

pub mod cancellation;
pub mod error;
pub mod future;
pub mod log;
pub mod metrics;
pub mod queue;
pub mod scheduler;
mod task;

pub use cancellation::{CancellationFlag, CancellationRegistry};
pub use error::{AppResult, SchedulerError, TaskError};
pub use future::TaskFuture;
pub use log::{LogLevel, LogSink};
pub use metrics::{MetricsCounter, MetricsSnapshot};
pub use queue::{BlockingPriorityQueue, Dequeued, Prioritized};
pub use scheduler::Scheduler;
