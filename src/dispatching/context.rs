//! Scheduling context for dispatching rule evaluation.

use chrono::{DateTime, FixedOffset};

/// Runtime state passed to dispatching rules.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext {
    /// Current instant.
    pub now: DateTime<FixedOffset>,
}

impl SchedulingContext {
    /// Creates a context at the given instant.
    pub fn at_time(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Minutes from now until `instant` (negative if already past).
    pub fn minutes_until(&self, instant: DateTime<FixedOffset>) -> i64 {
        (instant - self.now).num_minutes()
    }
}
