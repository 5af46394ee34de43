//! Result of a synthesis or mutation call.
//!
//! The explanation text is a fixed function of the reason code so that
//! callers and tests can rely on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Schedule, UnscheduledEntry};

/// Hard rule that caused a mutation to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionRule {
    /// Target collides with a blocked period or a fixed placement.
    Overlap,
    /// Target falls outside the day's availability window.
    OutOfBounds,
    /// Target would start at or before `now`.
    PastStart,
    /// Target would end after its deadline.
    DeadlineViolation,
    /// A new task found no slot anywhere in the day.
    NoFeasibleSlot,
    /// The edit would leave durations or the task pool inconsistent.
    Inconsistent,
}

impl RejectionRule {
    /// Stable code string.
    pub fn code(self) -> &'static str {
        match self {
            Self::Overlap => "Overlap",
            Self::OutOfBounds => "OutOfBounds",
            Self::PastStart => "PastStart",
            Self::DeadlineViolation => "DeadlineViolation",
            Self::NoFeasibleSlot => "NoFeasibleSlot",
            Self::Inconsistent => "Inconsistent",
        }
    }
}

/// Terminal reason of a call. Exactly one per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Produced by the synthesizer.
    Synthesized,
    /// Edit committed as requested.
    Applied,
    /// Edit committed after shifting displaced tasks.
    AppliedWithReflow,
    /// Edit rolled back; the original schedule is returned.
    Rejected(RejectionRule),
    /// Nothing to do.
    NoOp,
}

impl ReasonCode {
    /// Caller-facing explanation, derived only from the code.
    pub fn explanation(self) -> &'static str {
        match self {
            Self::Synthesized => "Built a schedule for the day from the task pool.",
            Self::Applied => "Applied the requested change.",
            Self::AppliedWithReflow => {
                "Applied the requested change and shifted overlapping tasks to later slots."
            }
            Self::Rejected(RejectionRule::Overlap) => {
                "Rejected: the requested time overlaps a blocked period."
            }
            Self::Rejected(RejectionRule::OutOfBounds) => {
                "Rejected: the requested time is outside the day's available hours."
            }
            Self::Rejected(RejectionRule::PastStart) => {
                "Rejected: the requested time is not in the future."
            }
            Self::Rejected(RejectionRule::DeadlineViolation) => {
                "Rejected: the task would finish after its deadline."
            }
            Self::Rejected(RejectionRule::NoFeasibleSlot) => {
                "Rejected: there is no free slot for the task today."
            }
            Self::Rejected(RejectionRule::Inconsistent) => {
                "Rejected: the change would leave the schedule inconsistent."
            }
            Self::NoOp => "No change was made to the schedule.",
        }
    }

    /// Whether the call committed a change.
    pub fn is_commit(self) -> bool {
        matches!(self, Self::Synthesized | Self::Applied | Self::AppliedWithReflow)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synthesized => f.write_str("Synthesized"),
            Self::Applied => f.write_str("Applied"),
            Self::AppliedWithReflow => f.write_str("AppliedWithReflow"),
            Self::Rejected(rule) => write!(f, "Rejected:{}", rule.code()),
            Self::NoOp => f.write_str("NoOp"),
        }
    }
}

/// Machine-checkable result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Updated (or untouched) schedule.
    pub schedule: Schedule,
    /// Pool tasks not in the schedule.
    pub unscheduled: Vec<UnscheduledEntry>,
    /// Whether `schedule` differs from the input.
    pub changed: bool,
    /// Terminal reason.
    pub reason: ReasonCode,
    /// Text derived from `reason`.
    pub explanation: String,
}

impl Outcome {
    /// Unscheduled entry for a task, if any.
    pub fn unscheduled_reason(&self, task_id: &str) -> Option<super::UnscheduledReason> {
        self.unscheduled
            .iter()
            .find(|e| e.task_id == task_id)
            .map(|e| e.reason)
    }
}
