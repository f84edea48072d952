//! # Prometheus Task Scheduler
//!
//! An in-process, priority-ordered task scheduler for CPU-bound or blocking work.
//!
//! A fixed pool of dedicated OS threads pulls work from a blocking priority queue.
//! Higher priorities always run first; equal priorities run in submission order.
//! Work that has not started yet can be cancelled, and value-producing work hands
//! its result back through a [`TaskFuture`](core::TaskFuture).
//!
//! ## Key Features
//!
//! - **Strict priority**: `Low < Medium < High < Critical`, FIFO within a level
//! - **Cooperative cancellation**: checked once, when a worker dequeues the task
//! - **Result futures**: blocking `get`, timed `wait`, and `get_async` for tokio
//! - **Panic isolation**: a panicking task never takes its worker down
//! - **Drain on shutdown**: everything queued (and not cancelled) runs before
//!   the workers are joined
//! - **Lock-free metrics**: enqueued/completed/active counters and throughput
//!
//! ## Example
//!
//! ```rust
//! use prometheus_task_scheduler::core::Scheduler;
//! use prometheus_task_scheduler::util::Priority;
//!
//! let scheduler = Scheduler::new(4)?;
//!
//! // Fire-and-forget
//! scheduler.submit(|| { /* heavy work */ })?;
//!
//! // Cancellable
//! let id = scheduler.submit_cancellable(|| { /* maybe not needed */ }, Priority::Low)?;
//! scheduler.cancel(id);
//!
//! // Result-bearing
//! let sum = scheduler.submit_with_result(|| (1..=10).sum::<u32>(), Priority::High)?;
//! assert_eq!(sum.get(), Ok(55));
//!
//! scheduler.shutdown();
//! println!("{:?}", scheduler.metrics());
//! # Ok::<(), prometheus_task_scheduler::core::SchedulerError>(())
//! ```

/// Core scheduling: queue, worker pool, cancellation, futures and metrics.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters (log sinks).
pub mod infra;
/// Shared utilities.
pub mod util;

pub use crate::builders::SchedulerBuilder;
pub use crate::config::SchedulerConfig;
pub use crate::core::{MetricsSnapshot, Scheduler, SchedulerError, TaskError, TaskFuture};
pub use crate::util::{Priority, TaskId};
