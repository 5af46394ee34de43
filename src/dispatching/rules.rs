//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Due-date**: EDD, MST
//! - **Time-based**: SPT
//! - **Priority**: PRIORITY
//!
//! # Score Convention
//! All rules return lower scores for tasks that should be placed first.

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Prioritizes tasks with earlier deadlines. Tasks without deadlines
/// sort last.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on a single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        task.deadline
            .map(|d| d.timestamp() as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

/// Minimum Slack Time.
///
/// Slack = (deadline - now) - estimated effort, in minutes.
/// Tasks without deadlines get maximum slack.
#[derive(Debug, Clone, Copy)]
pub struct Mst;

impl DispatchingRule for Mst {
    fn name(&self) -> &'static str {
        "MST"
    }

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore {
        match task.deadline {
            Some(deadline) => (context.minutes_until(deadline) - task.estimated_minutes) as f64,
            None => f64::MAX,
        }
    }

    fn description(&self) -> &'static str {
        "Minimum Slack Time"
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes short tasks; packs more items into a tight day.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on a single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        task.estimated_minutes as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

// ======================== Priority-based rule ========================

/// Highest priority first (High > Medium > Low).
#[derive(Debug, Clone, Copy)]
pub struct HighestPriority;

impl DispatchingRule for HighestPriority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        -f64::from(task.priority.rank())
    }

    fn description(&self) -> &'static str {
        "Task Priority"
    }
}
