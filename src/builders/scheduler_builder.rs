//! Builder assembling a [`Scheduler`] from configuration and a log sink.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{LogSink, Scheduler, SchedulerError};
use crate::infra::log::TracingLogSink;
use crate::util::Priority;

/// Collects configuration and collaborators, then starts the scheduler.
///
/// ```rust
/// use prometheus_task_scheduler::builders::SchedulerBuilder;
/// use prometheus_task_scheduler::util::Priority;
///
/// let scheduler = SchedulerBuilder::new()
///     .with_worker_count(2)
///     .with_default_priority(Priority::High)
///     .build()?;
/// scheduler.submit(|| println!("hello from a worker"))?;
/// # Ok::<(), prometheus_task_scheduler::core::SchedulerError>(())
/// ```
#[derive(Default)]
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    log: Option<Arc<dyn LogSink>>,
}

impl SchedulerBuilder {
    /// Start from the default configuration and `tracing` logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.config = self.config.with_worker_count(worker_count);
        self
    }

    /// Set the priority used by [`Scheduler::submit`].
    #[must_use]
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.config = self.config.with_default_priority(priority);
        self
    }

    /// Inject the log sink used for lifecycle and failure events.
    #[must_use]
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Validate the configuration and start the workers.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the configuration is invalid
    /// - `SchedulerError::Spawn` if a worker thread cannot be started
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        let log = self.log.unwrap_or_else(|| Arc::new(TracingLogSink));
        Scheduler::with_config(self.config, log)
    }
}
