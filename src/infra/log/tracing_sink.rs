//! Log sink that forwards to `tracing`.

use tracing::{debug, error, info, warn};

use crate::core::{LogLevel, LogSink};

/// Default sink: every record becomes a `tracing` event under the
/// `prometheus_task_scheduler` target, tagged with its level name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => {
                error!(target: "prometheus_task_scheduler", kind = %level, "{message}");
            }
            LogLevel::Warning => {
                warn!(target: "prometheus_task_scheduler", kind = %level, "{message}");
            }
            LogLevel::Info | LogLevel::Success => {
                info!(target: "prometheus_task_scheduler", kind = %level, "{message}");
            }
            // one record per finished task
            LogLevel::Task => {
                debug!(target: "prometheus_task_scheduler", kind = %level, "{message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_accepts_all_levels() {
        crate::util::init_tracing();
        let sink = TracingLogSink;
        sink.info("info");
        sink.warning("warning");
        sink.error("error");
        sink.success("success");
        sink.task("task");
    }
}
