//! Logging capability injected into the scheduler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Lifecycle information.
    Info,
    /// Recoverable anomaly (rejected submission, cancelled skip).
    Warning,
    /// Task failure.
    Error,
    /// Successful completion of a lifecycle step.
    Success,
    /// Per-task progress, one record for every task that finishes normally.
    Task,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
            Self::Task => "TASK",
        })
    }
}

/// Thread-safe log sink. Implementations must not block for long: the scheduler
/// calls it from worker threads.
pub trait LogSink: Send + Sync {
    /// Record a message at `level`.
    fn log(&self, level: LogLevel, message: &str);

    /// Record an informational message.
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Record a warning.
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Record an error.
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Record a success.
    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    /// Record per-task progress.
    fn task(&self, message: &str) {
        self.log(LogLevel::Task, message);
    }
}
