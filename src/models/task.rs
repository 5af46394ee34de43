//! Task model.
//!
//! A task is a single unit of work the caller wants placed into a day.
//! Tasks are owned by the caller's pool and referenced by id from
//! scheduled items; the engine never copies one and lets it diverge.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Task importance.
///
/// Ordered `Low < Medium < High`, so `max`/`cmp` follow importance.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// Normal work.
    #[default]
    Medium,
    /// Must not slip.
    High,
}

impl Priority {
    /// Numeric rank (higher = more important).
    pub fn rank(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// A work item to be placed.
///
/// # Time Representation
/// The deadline is an absolute instant with an explicit UTC offset.
/// Durations are whole minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier (assigned by the caller).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Estimated effort in minutes. Must be positive.
    #[serde(rename = "estimatedTime")]
    pub estimated_minutes: i64,
    /// Importance.
    #[serde(default)]
    pub priority: Priority,
    /// Latest completion instant. `None` = no deadline.
    #[serde(default)]
    pub deadline: Option<DateTime<FixedOffset>>,
}

impl Task {
    /// Creates a medium-priority task without a deadline.
    pub fn new(id: impl Into<String>, title: impl Into<String>, estimated_minutes: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            estimated_minutes,
            priority: Priority::Medium,
            deadline: None,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: DateTime<FixedOffset>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Estimated effort as a duration.
    ///
    /// Saturates at [`Duration::MAX`] for estimates chrono cannot represent.
    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::try_minutes(self.estimated_minutes).unwrap_or(Duration::MAX)
    }

    /// Whether the deadline has already passed at `now`.
    pub fn is_past_deadline(&self, now: DateTime<FixedOffset>) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }
}
