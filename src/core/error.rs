//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by the scheduler itself.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The scheduler has been shut down and no longer accepts work.
    #[error("scheduler closed")]
    Closed,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Error outcome delivered through a [`TaskFuture`](crate::core::TaskFuture)
/// when a result-bearing task does not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task panicked while running; holds the panic message.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The task was discarded without running (cancelled before dequeue or
    /// rejected at submission).
    #[error("task dropped before producing a result")]
    Dropped,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_error_display() {
        assert_eq!(SchedulerError::Closed.to_string(), "scheduler closed");
        assert_eq!(
            SchedulerError::InvalidConfig("worker_count must be greater than 0".into()).to_string(),
            "invalid configuration: worker_count must be greater than 0"
        );
        let io = std::io::Error::other("no threads left");
        assert_eq!(
            SchedulerError::from(io).to_string(),
            "failed to spawn worker thread: no threads left"
        );
    }

    #[test]
    fn test_task_error_display() {
        assert_eq!(TaskError::Panicked("boom".into()).to_string(), "task panicked: boom");
        assert_eq!(TaskError::Dropped.to_string(), "task dropped before producing a result");
    }
}
