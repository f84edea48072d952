//! In-memory log sink for tests and diagnostics.

use std::collections::VecDeque;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::core::{LogLevel, LogSink};

/// One captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
    /// Wall-clock time the record was captured.
    pub at: SystemTime,
}

/// Bounded ring buffer of log records; the oldest record is evicted when full.
pub struct InMemoryLogSink {
    records: Mutex<VecDeque<LogRecord>>,
    max_records: usize,
}

impl InMemoryLogSink {
    /// Create a sink that keeps at most `max_records` records.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records,
        }
    }

    /// Retrieve a snapshot of stored records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Records at `level`, oldest first.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl Default for InMemoryLogSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl LogSink for InMemoryLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        if self.max_records == 0 {
            return;
        }
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(LogRecord {
            level,
            message: message.to_string(),
            at: SystemTime::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_by_level() {
        let sink = InMemoryLogSink::default();
        sink.info("scheduler started");
        sink.error("task 3 panicked: boom");
        sink.success("drained");

        assert_eq!(sink.records().len(), 3);
        assert_eq!(sink.at_level(LogLevel::Error).len(), 1);
        assert!(sink.contains(LogLevel::Error, "boom"));
        assert!(!sink.contains(LogLevel::Info, "boom"));
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let sink = InMemoryLogSink::new(2);
        sink.info("one");
        sink.info("two");
        sink.info("three");

        let messages: Vec<_> = sink.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_zero_capacity_discards() {
        let sink = InMemoryLogSink::new(0);
        sink.warning("ignored");
        assert!(sink.records().is_empty());
    }
}
