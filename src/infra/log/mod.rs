//! Log sink backends.

pub mod memory;
pub mod tracing_sink;

pub use memory::{InMemoryLogSink, LogRecord};
pub use tracing_sink::TracingLogSink;
