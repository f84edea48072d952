//! Scheduler configuration.

use std::env;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;
use crate::util::Priority;

/// Environment variable overriding [`SchedulerConfig::worker_count`].
pub const ENV_WORKER_COUNT: &str = "SCHEDULER_WORKER_COUNT";
/// Environment variable overriding [`SchedulerConfig::thread_name_prefix`].
pub const ENV_THREAD_PREFIX: &str = "SCHEDULER_THREAD_PREFIX";
/// Environment variable overriding [`SchedulerConfig::thread_stack_size`].
pub const ENV_STACK_SIZE: &str = "SCHEDULER_STACK_SIZE";
/// Environment variable overriding [`SchedulerConfig::default_priority`].
pub const ENV_DEFAULT_PRIORITY: &str = "SCHEDULER_DEFAULT_PRIORITY";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of worker threads started at construction. Must be at least 1.
    pub worker_count: usize,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
    /// Stack size for worker threads in bytes; `None` uses the platform default.
    pub thread_stack_size: Option<usize>,
    /// Priority used by plain submissions that do not name one.
    pub default_priority: Priority,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            thread_name_prefix: "pts-worker".into(),
            thread_stack_size: None,
            default_priority: Priority::Medium,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration: one worker per logical CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Set the priority used by plain submissions.
    #[must_use]
    pub const fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading a `.env` file first if
    /// one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails if a variable cannot be parsed or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Some(raw) = read_var(ENV_WORKER_COUNT) {
            cfg.worker_count = raw
                .parse()
                .with_context(|| format!("{ENV_WORKER_COUNT}=`{raw}` is not a worker count"))?;
        }
        if let Some(raw) = read_var(ENV_THREAD_PREFIX) {
            cfg.thread_name_prefix = raw;
        }
        if let Some(raw) = read_var(ENV_STACK_SIZE) {
            let bytes = raw
                .parse()
                .with_context(|| format!("{ENV_STACK_SIZE}=`{raw}` is not a byte count"))?;
            cfg.thread_stack_size = Some(bytes);
        }
        if let Some(raw) = read_var(ENV_DEFAULT_PRIORITY) {
            cfg.default_priority = raw
                .parse()
                .with_context(|| format!("{ENV_DEFAULT_PRIORITY} is invalid"))?;
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = SchedulerConfig::new();
        assert!(cfg.worker_count >= 1);
        assert_eq!(cfg.default_priority, Priority::Medium);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let cfg = SchedulerConfig::new()
            .with_worker_count(3)
            .with_thread_name_prefix("io")
            .with_thread_stack_size(256 * 1024)
            .with_default_priority(Priority::High);
        assert_eq!(cfg.worker_count, 3);
        assert_eq!(cfg.thread_name_prefix, "io");
        assert_eq!(cfg.thread_stack_size, Some(256 * 1024));
        assert_eq!(cfg.default_priority, Priority::High);
    }

    #[test]
    fn test_invalid_values() {
        assert!(SchedulerConfig::new().with_worker_count(0).validate().is_err());
        assert!(SchedulerConfig::new().with_thread_name_prefix("  ").validate().is_err());
        assert!(SchedulerConfig::new().with_thread_stack_size(0).validate().is_err());
    }
}
