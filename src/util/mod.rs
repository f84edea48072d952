//! Shared utilities.

pub mod priority;
pub mod telemetry;

pub use priority::{ParsePriorityError, Priority, TaskId};
pub use telemetry::{init_tracing, init_tracing_with_default};
