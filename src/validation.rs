//! Input and schedule validation.
//!
//! Two gates:
//! - [`validate_input`] rejects structurally invalid requests before any
//!   scheduling logic runs.
//! - [`validate_schedule`] checks a placement against every hard rule and
//!   collects all violations. Nothing short-circuits: the mutator needs the
//!   full list to decide whether a targeted repair is possible.
//!
//! # Hard rules (checked in this order)
//! 1. Duration fidelity
//! 2. No overlap (half-open intervals)
//! 3. Blocked-interval avoidance
//! 4. In-bounds (inside the day's availability window)
//! 5. Deadline compliance
//! 6. Future-only placement
//! 7. Completeness (each pool task exactly once, scheduled or not)

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{DayRequest, RejectionRule, Schedule, ScheduledItem, Task, UnscheduledEntry};

/// Longest estimate a single-day task may carry.
pub const MAX_ESTIMATE_MINUTES: i64 = 24 * 60;

/// Validation result.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// Hard rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleCode {
    /// Placed length differs from the task estimate.
    DurationMismatch,
    /// Two placements intersect.
    Overlap,
    /// A placement intersects a blocked occurrence.
    BlockedConflict,
    /// A placement leaves the availability window.
    OutOfBounds,
    /// A placement ends after its task's deadline.
    DeadlineViolation,
    /// A placement starts at or before `now`.
    PastStart,
    /// A pool task is missing, duplicated, or unknown.
    Incomplete,
    /// Continuous work runs past the cap (selective synthesis only).
    ContinuousWork,
    /// A gap after a task is shorter than its recovery minimum (selective synthesis only).
    RecoveryGap,
    /// No free midday break inside the midday band (selective synthesis only).
    MiddayBreak,
}

impl RuleCode {
    /// Rejection code reported when an edit introduces this violation.
    pub fn rejection(self) -> RejectionRule {
        match self {
            Self::Overlap | Self::BlockedConflict => RejectionRule::Overlap,
            Self::OutOfBounds => RejectionRule::OutOfBounds,
            Self::DeadlineViolation => RejectionRule::DeadlineViolation,
            Self::PastStart => RejectionRule::PastStart,
            Self::DurationMismatch
            | Self::Incomplete
            | Self::ContinuousWork
            | Self::RecoveryGap
            | Self::MiddayBreak => RejectionRule::Inconsistent,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A broken hard rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Which rule.
    pub rule: RuleCode,
    /// Task the violation is about.
    pub task_id: String,
    /// Second task, for pairwise rules (ids stored in sorted order).
    pub other_task_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    pub(crate) fn new(
        rule: RuleCode,
        task_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            task_id: task_id.into(),
            other_task_id: None,
            message: message.into(),
        }
    }

    fn overlap(a: &ScheduledItem, b: &ScheduledItem) -> Self {
        let (first, second) = if a.task_id <= b.task_id {
            (a, b)
        } else {
            (b, a)
        };
        Self {
            rule: RuleCode::Overlap,
            task_id: first.task_id.clone(),
            other_task_id: Some(second.task_id.clone()),
            message: format!(
                "'{}' ({} - {}) overlaps '{}' ({} - {})",
                first.task_id,
                first.start_time.format("%H:%M"),
                first.end_time.format("%H:%M"),
                second.task_id,
                second.start_time.format("%H:%M"),
                second.end_time.format("%H:%M"),
            ),
        }
    }

    /// Identity of the violation, independent of times in the message.
    pub fn key(&self) -> (RuleCode, &str, Option<&str>) {
        (self.rule, &self.task_id, self.other_task_id.as_deref())
    }

    /// Whether the violation involves the given task.
    pub fn involves(&self, task_id: &str) -> bool {
        self.task_id == task_id || self.other_task_id.as_deref() == Some(task_id)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Validates the structure of a request.
///
/// Checks:
/// 1. Availability window is well-formed (`start < end`)
/// 2. Every blocked interval is well-formed
/// 3. Every task has a non-empty id and a positive estimate of at most
///    [`MAX_ESTIMATE_MINUTES`]
/// 4. No duplicate task ids
///
/// # Errors
/// [`ScheduleError::MalformedInput`] describing every problem found.
pub fn validate_input(request: &DayRequest) -> ScheduleResult<()> {
    let mut problems = Vec::new();

    if !request.constraints.is_well_formed() {
        problems.push(format!(
            "availability window {} - {} is empty or inverted",
            request.constraints.start_time, request.constraints.end_time
        ));
    }

    for blocked in &request.blocked {
        if blocked.start_time >= blocked.end_time {
            problems.push(format!(
                "blocked interval '{}' ({} - {}) is empty or inverted",
                blocked.title, blocked.start_time, blocked.end_time
            ));
        }
    }

    let mut seen = HashSet::new();
    for task in &request.tasks {
        problems.extend(task_problems(task));
        if !seen.insert(task.id.as_str()) {
            problems.push(format!("duplicate task id '{}'", task.id));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::malformed(problems.join("; ")))
    }
}

/// Structural problems of a single task.
pub(crate) fn task_problems(task: &Task) -> Vec<String> {
    let mut problems = Vec::new();
    if task.id.trim().is_empty() {
        problems.push(format!("task '{}' has an empty id", task.title));
    }
    if task.estimated_minutes <= 0 {
        problems.push(format!(
            "task '{}' has non-positive estimated time {}",
            task.id, task.estimated_minutes
        ));
    } else if task.estimated_minutes > MAX_ESTIMATE_MINUTES {
        problems.push(format!(
            "task '{}' estimated time {} exceeds one day ({} minutes)",
            task.id, task.estimated_minutes, MAX_ESTIMATE_MINUTES
        ));
    }
    problems
}

/// Validates a schedule against every hard rule.
///
/// `unscheduled` is needed for the completeness rule: every task in
/// `request.tasks` must appear exactly once across `schedule.items` and
/// `unscheduled`.
///
/// # Returns
/// `Ok(())` if all rules hold, `Err(violations)` with every violation in
/// rule order.
pub fn validate_schedule(
    schedule: &Schedule,
    unscheduled: &[UnscheduledEntry],
    request: &DayRequest,
) -> ValidationResult {
    let tasks: HashMap<&str, &Task> = request.tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut violations = Vec::new();

    // 1. Duration fidelity
    for item in &schedule.items {
        if let Some(task) = tasks.get(item.task_id.as_str()) {
            if item.duration() != task.duration() {
                violations.push(Violation::new(
                    RuleCode::DurationMismatch,
                    &item.task_id,
                    format!(
                        "'{}' is placed for {} min but estimated at {} min",
                        item.task_id,
                        item.duration().num_minutes(),
                        task.estimated_minutes
                    ),
                ));
            }
        }
    }

    // 2. No overlap
    let mut sorted: Vec<&ScheduledItem> = schedule.items.iter().collect();
    sorted.sort_by_key(|i| i.start_time);
    for (idx, a) in sorted.iter().enumerate() {
        for b in &sorted[idx + 1..] {
            if b.start_time >= a.end_time {
                break;
            }
            if a.window().overlaps(&b.window()) {
                violations.push(Violation::overlap(a, b));
            }
        }
    }

    // 3. Blocked-interval avoidance
    for item in &schedule.items {
        let day = item.start_time.with_timezone(&request.offset).date_naive();
        for blocked in &request.blocked {
            if blocked.on(day, request.offset).overlaps(&item.window()) {
                violations.push(Violation::new(
                    RuleCode::BlockedConflict,
                    &item.task_id,
                    format!(
                        "'{}' intersects blocked period '{}' ({} - {})",
                        item.task_id, blocked.title, blocked.start_time, blocked.end_time
                    ),
                ));
            }
        }
    }

    // 4. In-bounds (on the schedule's own day)
    let window = request.constraints.on(schedule.date, request.offset);
    for item in &schedule.items {
        if !window.encloses(&item.window()) {
            violations.push(Violation::new(
                RuleCode::OutOfBounds,
                &item.task_id,
                format!(
                    "'{}' lies outside the {} - {} window",
                    item.task_id, request.constraints.start_time, request.constraints.end_time
                ),
            ));
        }
    }

    // 5. Deadline compliance
    for item in &schedule.items {
        let deadline = tasks.get(item.task_id.as_str()).and_then(|t| t.deadline);
        if let Some(deadline) = deadline {
            if item.end_time > deadline {
                violations.push(Violation::new(
                    RuleCode::DeadlineViolation,
                    &item.task_id,
                    format!(
                        "'{}' ends at {} after its deadline {}",
                        item.task_id,
                        item.end_time.to_rfc3339(),
                        deadline.to_rfc3339()
                    ),
                ));
            }
        }
    }

    // 6. Future-only placement
    for item in &schedule.items {
        if item.start_time <= request.now {
            violations.push(Violation::new(
                RuleCode::PastStart,
                &item.task_id,
                format!(
                    "'{}' starts at {}, not after now ({})",
                    item.task_id,
                    item.start_time.to_rfc3339(),
                    request.now.to_rfc3339()
                ),
            ));
        }
    }

    // 7. Completeness
    violations.extend(completeness_violations(schedule, unscheduled, &tasks, request));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn completeness_violations(
    schedule: &Schedule,
    unscheduled: &[UnscheduledEntry],
    tasks: &HashMap<&str, &Task>,
    request: &DayRequest,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut placed: HashMap<&str, usize> = HashMap::new();
    let mut left_out: HashMap<&str, usize> = HashMap::new();

    for item in &schedule.items {
        *placed.entry(item.task_id.as_str()).or_insert(0) += 1;
    }
    for entry in unscheduled {
        *left_out.entry(entry.task_id.as_str()).or_insert(0) += 1;
    }

    for task in &request.tasks {
        let id = task.id.as_str();
        let p = placed.get(id).copied().unwrap_or(0);
        let u = left_out.get(id).copied().unwrap_or(0);
        let problem = match (p, u) {
            (1, 0) | (0, 1) => None,
            (0, 0) => Some("is neither scheduled nor unscheduled"),
            (p, u) if p > 0 && u > 0 => Some("is both scheduled and unscheduled"),
            _ => Some("appears more than once"),
        };
        if let Some(problem) = problem {
            violations.push(Violation::new(
                RuleCode::Incomplete,
                id,
                format!("task '{id}' {problem}"),
            ));
        }
    }

    let mut unknown: Vec<&str> = placed
        .keys()
        .chain(left_out.keys())
        .copied()
        .filter(|id| !tasks.contains_key(id))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    for id in unknown {
        violations.push(Violation::new(
            RuleCode::Incomplete,
            id,
            format!("task '{id}' is not in the task pool"),
        ));
    }

    violations
}
