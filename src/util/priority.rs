//! Priority levels and task identifiers shared across the scheduler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier handed out for cancellable and result-bearing submissions.
///
/// Identifiers start at 0, increase monotonically, and are never reused for the
/// lifetime of a scheduler.
pub type TaskId = u64;

/// Ordinal urgency level controlling dequeue order.
///
/// `Low < Medium < High < Critical`. A strictly higher priority is always
/// dequeued before any lower-priority task that is queued at the same time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work.
    Low = 0,
    /// Default level for plain submissions.
    #[default]
    Medium = 1,
    /// Latency-sensitive work.
    High = 2,
    /// Runs ahead of everything else.
    Critical = 3,
}

impl Priority {
    /// All levels in ascending order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Ordinal value (`Low = 0` .. `Critical = 3`).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lowercase name, as used in config files and environment variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string or ordinal does not name a priority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority `{0}` (expected low, medium, high, critical or 0-3)")]
pub struct ParsePriorityError(pub String);

impl TryFrom<u8> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| ParsePriorityError(value.to_string()))
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u8>() {
            return Self::try_from(ordinal);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParsePriorityError(trimmed.to_string())),
        }
    }
}
