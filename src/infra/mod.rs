//! Infrastructure adapters for the scheduler's collaborators.

pub mod log;

pub use log::{InMemoryLogSink, TracingLogSink};
