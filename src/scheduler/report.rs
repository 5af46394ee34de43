//! Outcome assembly.
//!
//! Every path out of the synthesizer and the mutator goes through
//! [`OutcomeReporter`], which guarantees that scheduled items plus
//! unscheduled entries account for the task pool exactly once.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{
    Outcome, ReasonCode, Schedule, Task, UnscheduledEntry, UnscheduledReason,
};

/// Builds [`Outcome`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeReporter;

impl OutcomeReporter {
    /// Assembles an outcome from a working schedule.
    ///
    /// Items are sorted by start. Unscheduled entries for tasks that are
    /// scheduled, unknown, or already listed are dropped; pool tasks found in
    /// neither list get [`UnscheduledReason::NotPlaced`]. Entries follow pool
    /// order.
    pub fn assemble(
        mut schedule: Schedule,
        unscheduled: Vec<UnscheduledEntry>,
        pool: &[Task],
        changed: bool,
        reason: ReasonCode,
    ) -> Outcome {
        schedule.sort();
        let unscheduled = Self::reconcile(&schedule, unscheduled, pool);
        Self::finish(schedule, unscheduled, changed, reason)
    }

    /// Outcome that hands back `current` untouched.
    ///
    /// Used by the no-op and rollback paths; pool tasks missing from the
    /// schedule are listed as [`UnscheduledReason::NotPlaced`].
    pub fn unchanged(current: &Schedule, pool: &[Task], reason: ReasonCode) -> Outcome {
        let unscheduled = Self::reconcile(current, Vec::new(), pool);
        Self::finish(current.clone(), unscheduled, false, reason)
    }

    fn reconcile(
        schedule: &Schedule,
        unscheduled: Vec<UnscheduledEntry>,
        pool: &[Task],
    ) -> Vec<UnscheduledEntry> {
        let order: HashMap<&str, usize> = pool
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();
        let placed: HashSet<&str> = schedule.items.iter().map(|i| i.task_id.as_str()).collect();

        let mut listed: HashSet<String> = HashSet::new();
        let mut entries = Vec::with_capacity(unscheduled.len());
        for entry in unscheduled {
            let id = entry.task_id.as_str();
            if placed.contains(id) || !order.contains_key(id) || listed.contains(id) {
                debug!(
                    task_id = %entry.task_id,
                    reason = %entry.reason,
                    "dropping stale unscheduled entry"
                );
                continue;
            }
            listed.insert(entry.task_id.clone());
            entries.push(entry);
        }

        for task in pool {
            if !placed.contains(task.id.as_str()) && !listed.contains(&task.id) {
                entries.push(UnscheduledEntry::new(&task.id, UnscheduledReason::NotPlaced));
            }
        }

        entries.sort_by_key(|e| order.get(e.task_id.as_str()).copied().unwrap_or(usize::MAX));
        entries
    }

    fn finish(
        schedule: Schedule,
        unscheduled: Vec<UnscheduledEntry>,
        changed: bool,
        reason: ReasonCode,
    ) -> Outcome {
        Outcome {
            schedule,
            unscheduled,
            changed,
            reason,
            explanation: reason.explanation().to_string(),
        }
    }
}
