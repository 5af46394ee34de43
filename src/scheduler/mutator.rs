//! Single-edit mutation with cascading repair or atomic rejection.
//!
//! # State machine
//!
//! ```text
//! Received -> Speculating -> Validating -> Committing  -> Done
//!                                      \-> RollingBack -> Done
//! ```
//!
//! The edit is applied to a clone of the current schedule. An edit is judged
//! only by the violations it introduces: violations the current schedule
//! already had (for instance an item that has since slipped into the past)
//! do not block an unrelated edit. If the only new violations are overlaps
//! with the pinned target, the overlapped tasks are shifted to their nearest
//! later free slot; tasks with no such slot are reported as
//! [`UnscheduledReason::DisplacedNoSlot`]. Anything else rolls back and the
//! input schedule is returned untouched.

use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{
    DayRequest, EditIntent, Outcome, ReasonCode, RejectionRule, Schedule, ScheduledItem, Task,
    UnscheduledEntry, UnscheduledReason,
};
use crate::validation::{task_problems, validate_input, validate_schedule, RuleCode, Violation};

use super::placement::Timeline;
use super::report::OutcomeReporter;

/// Mutation lifecycle states (emitted as trace events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Received,
    Speculating,
    Validating,
    Committing,
    RollingBack,
    Done,
}

fn trace_state(state: State, intent: &EditIntent) {
    debug!(state = ?state, intent = intent.kind(), task_id = ?intent.target_id(), "mutation");
}

/// Applies structured edits to an existing schedule.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, NaiveDate, NaiveTime};
/// use u_dayplan::models::{
///     BlockedInterval, DayRequest, EditIntent, ReasonCode, RejectionRule, Task, TimeConstraints,
/// };
/// use u_dayplan::scheduler::{Mutator, SynthesisMode, Synthesizer};
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let request = DayRequest::new(
///     NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
///     at("2026-10-19T08:00:00+09:00"),
///     TimeConstraints::new(hm(9, 0), hm(17, 0)),
/// )
/// .with_blocked(BlockedInterval::new("Standup", hm(9, 15), hm(9, 45)))
/// .with_task(Task::new("T1", "Report", 30));
///
/// let current = Synthesizer::new()
///     .synthesize(&request, SynthesisMode::FullPool)
///     .unwrap()
///     .schedule;
/// let intent = EditIntent::MoveTask {
///     task_id: "T1".into(),
///     requested_start: at("2026-10-19T09:15:00+09:00"),
/// };
///
/// let outcome = Mutator::new().apply_intent(&current, &request, &intent).unwrap();
/// assert_eq!(outcome.reason, ReasonCode::Rejected(RejectionRule::Overlap));
/// assert_eq!(outcome.schedule, current);
/// assert!(!outcome.changed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    config: EngineConfig,
}

impl Mutator {
    /// Creates a mutator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: EngineConfig) -> ScheduleResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Applies one edit to `current`.
    ///
    /// The returned outcome either commits the whole edit (`Applied`,
    /// `AppliedWithReflow`) or hands back `current` unchanged (`Rejected`,
    /// `NoOp`).
    ///
    /// # Errors
    /// [`ScheduleError::MalformedInput`] for a structurally invalid request,
    /// an unknown task id, or an `AddTask` whose task is invalid or whose id
    /// is already in the pool.
    pub fn apply_intent(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
    ) -> ScheduleResult<Outcome> {
        trace_state(State::Received, intent);
        validate_input(request)?;

        let outcome = match intent {
            EditIntent::Query => self.roll_back(current, request, intent, ReasonCode::NoOp),
            EditIntent::MoveTask {
                task_id,
                requested_start,
            } => {
                let task = request.task(task_id).ok_or_else(|| {
                    ScheduleError::malformed(format!("unknown task id '{task_id}'"))
                })?;
                let target = ScheduledItem::for_task(task, *requested_start);
                self.place(current, request, intent, target)
            }
            EditIntent::AddTask {
                task,
                requested_start,
            } => self.add(current, request, intent, task, *requested_start)?,
            EditIntent::RemoveTask { task_id } => self.remove(current, request, intent, task_id)?,
        };

        trace_state(State::Done, intent);
        info!(
            intent = intent.kind(),
            reason = %outcome.reason,
            changed = outcome.changed,
            unscheduled = outcome.unscheduled.len(),
            "mutation complete"
        );
        Ok(outcome)
    }

    fn add(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
        task: &Task,
        requested_start: Option<DateTime<FixedOffset>>,
    ) -> ScheduleResult<Outcome> {
        let problems = task_problems(task);
        if !problems.is_empty() {
            return Err(ScheduleError::malformed(problems.join("; ")));
        }
        if request.task(&task.id).is_some() || current.contains(&task.id) {
            return Err(ScheduleError::malformed(format!(
                "task id '{}' is already in the pool",
                task.id
            )));
        }

        let extended = request.extended_with(task.clone());
        let start = match requested_start {
            Some(start) => start,
            None => match self.first_free_slot(current, &extended, task) {
                Some(start) => start,
                None => {
                    return Ok(self.roll_back(
                        current,
                        request,
                        intent,
                        ReasonCode::Rejected(RejectionRule::NoFeasibleSlot),
                    ))
                }
            },
        };

        let target = ScheduledItem::for_task(task, start);
        let outcome = self.place(current, &extended, intent, target);
        if outcome.reason.is_commit() {
            Ok(outcome)
        } else {
            // Rejected adds leave the caller's pool as it was.
            Ok(OutcomeReporter::unchanged(current, &request.tasks, outcome.reason))
        }
    }

    /// Earliest slot for a new task around the existing items, keeping the
    /// full-pool buffers.
    fn first_free_slot(
        &self,
        current: &Schedule,
        request: &DayRequest,
        task: &Task,
    ) -> Option<DateTime<FixedOffset>> {
        let window = request.window();
        let mut timeline = Timeline::new(request.placement_floor(), window.end)
            .with_fixed(request.blocked_windows());
        for item in &current.items {
            timeline.occupy(
                item.window(),
                self.config.gap_after(item.duration().num_minutes(), false),
            );
        }
        let latest_end = task.deadline.map_or(window.end, |d| d.min(window.end));
        timeline.earliest_slot(
            timeline.floor(),
            task.duration(),
            self.config.gap_after(task.estimated_minutes, false),
            latest_end,
        )
    }

    fn remove(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
        task_id: &str,
    ) -> ScheduleResult<Outcome> {
        if !current.contains(task_id) {
            if request.task(task_id).is_none() {
                return Err(ScheduleError::malformed(format!("unknown task id '{task_id}'")));
            }
            return Ok(self.roll_back(current, request, intent, ReasonCode::NoOp));
        }

        trace_state(State::Speculating, intent);
        let mut candidate = current.clone();
        candidate.remove(task_id);
        let unscheduled = vec![UnscheduledEntry::new(task_id, UnscheduledReason::Removed)];

        trace_state(State::Validating, intent);
        let introduced = self.introduced(current, &candidate, &unscheduled, request, None);
        if let Some(first) = introduced.first() {
            return Ok(self.reject(current, request, intent, first));
        }
        Ok(self.commit(candidate, unscheduled, request, intent, ReasonCode::Applied))
    }

    /// Pins `target` into a copy of `current` and validates the result.
    fn place(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
        target: ScheduledItem,
    ) -> Outcome {
        trace_state(State::Speculating, intent);
        if let Some(rule) = self.inherent_conflict(&target, current, request) {
            warn!(task_id = %target.task_id, rule = rule.code(), "target slot is infeasible");
            return self.roll_back(current, request, intent, ReasonCode::Rejected(rule));
        }

        let mut candidate = current.clone();
        candidate.remove(&target.task_id);
        candidate.insert(target.clone());

        trace_state(State::Validating, intent);
        let target_id = Some(target.task_id.as_str());
        let introduced = self.introduced(current, &candidate, &[], request, target_id);
        if introduced.is_empty() {
            return self.commit(candidate, Vec::new(), request, intent, ReasonCode::Applied);
        }
        if let Some(other) = introduced.iter().find(|v| v.rule != RuleCode::Overlap) {
            return self.reject(current, request, intent, other);
        }

        match self.reflow(current, candidate, &target, request) {
            Ok((repaired, displaced)) => {
                self.commit(repaired, displaced, request, intent, ReasonCode::AppliedWithReflow)
            }
            Err(violation) => self.reject(current, request, intent, &violation),
        }
    }

    /// Direct checks on the target placement alone.
    fn inherent_conflict(
        &self,
        target: &ScheduledItem,
        current: &Schedule,
        request: &DayRequest,
    ) -> Option<RejectionRule> {
        let window = target.window();
        if request
            .blocked
            .iter()
            .any(|b| b.on(current.date, request.offset).overlaps(&window))
        {
            return Some(RejectionRule::Overlap);
        }
        if !request.constraints.on(current.date, request.offset).encloses(&window) {
            return Some(RejectionRule::OutOfBounds);
        }
        if target.start_time <= request.now {
            return Some(RejectionRule::PastStart);
        }
        let deadline = request.task(&target.task_id).and_then(|t| t.deadline);
        if deadline.is_some_and(|d| target.end_time > d) {
            return Some(RejectionRule::DeadlineViolation);
        }
        None
    }

    /// Violations of `candidate` that `current` did not already have.
    ///
    /// Violations involving `pinned` always count as new.
    fn introduced(
        &self,
        current: &Schedule,
        candidate: &Schedule,
        unscheduled: &[UnscheduledEntry],
        request: &DayRequest,
        pinned: Option<&str>,
    ) -> Vec<Violation> {
        let baseline = violations(current, &[], request);

        violations(candidate, unscheduled, request)
            .into_iter()
            .filter(|v| {
                pinned.is_some_and(|id| v.involves(id))
                    || !baseline.iter().any(|b| b.key() == v.key())
            })
            .collect()
    }

    /// Shifts every item overlapping `target` to its nearest later free slot.
    ///
    /// Returns the repaired schedule and the entries for items that found
    /// no slot, or the first violation the repair could not clear.
    fn reflow(
        &self,
        current: &Schedule,
        mut candidate: Schedule,
        target: &ScheduledItem,
        request: &DayRequest,
    ) -> Result<(Schedule, Vec<UnscheduledEntry>), Violation> {
        let mut bystanders: Vec<ScheduledItem> = candidate
            .items
            .iter()
            .filter(|i| i.task_id != target.task_id && i.window().overlaps(&target.window()))
            .cloned()
            .collect();
        bystanders.sort_by_key(|i| i.start_time);
        for b in &bystanders {
            candidate.remove(&b.task_id);
        }

        let window = request.window();
        let mut timeline = Timeline::new(request.placement_floor(), window.end)
            .with_fixed(request.blocked_windows());
        for item in &candidate.items {
            timeline.occupy(item.window(), Duration::zero());
        }

        let mut displaced = Vec::new();
        for item in bystanders {
            let deadline = request.task(&item.task_id).and_then(|t| t.deadline);
            let latest_end = deadline.map_or(window.end, |d| d.min(window.end));
            let slot = timeline.earliest_slot(
                item.start_time,
                item.duration(),
                Duration::zero(),
                latest_end,
            );

            let Some(start) = slot else {
                warn!(task_id = %item.task_id, "displaced with no later slot");
                displaced.push(UnscheduledEntry::new(
                    &item.task_id,
                    UnscheduledReason::DisplacedNoSlot,
                ));
                continue;
            };

            let shifted = item.shifted_to(start);
            candidate.insert(shifted.clone());
            let shifted_id = Some(shifted.task_id.as_str());
            let clean = self
                .introduced(current, &candidate, &displaced, request, shifted_id)
                .iter()
                .all(|v| !v.involves(&shifted.task_id));
            if clean {
                debug!(
                    task_id = %shifted.task_id,
                    from = %item.start_time,
                    to = %start,
                    "shifted"
                );
                timeline.occupy(shifted.window(), Duration::zero());
            } else {
                candidate.remove(&shifted.task_id);
                warn!(task_id = %item.task_id, "shifted slot failed validation");
                displaced.push(UnscheduledEntry::new(
                    &item.task_id,
                    UnscheduledReason::DisplacedNoSlot,
                ));
            }
        }

        let target_id = Some(target.task_id.as_str());
        let remaining = self.introduced(current, &candidate, &displaced, request, target_id);
        match remaining.into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok((candidate, displaced)),
        }
    }

    fn commit(
        &self,
        candidate: Schedule,
        unscheduled: Vec<UnscheduledEntry>,
        request: &DayRequest,
        intent: &EditIntent,
        reason: ReasonCode,
    ) -> Outcome {
        trace_state(State::Committing, intent);
        OutcomeReporter::assemble(candidate, unscheduled, &request.tasks, true, reason)
    }

    fn reject(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
        violation: &Violation,
    ) -> Outcome {
        warn!(
            intent = intent.kind(),
            rule = %violation.rule,
            task_id = %violation.task_id,
            "{}",
            violation.message
        );
        self.roll_back(current, request, intent, ReasonCode::Rejected(violation.rule.rejection()))
    }

    fn roll_back(
        &self,
        current: &Schedule,
        request: &DayRequest,
        intent: &EditIntent,
        reason: ReasonCode,
    ) -> Outcome {
        trace_state(State::RollingBack, intent);
        OutcomeReporter::unchanged(current, &request.tasks, reason)
    }
}

/// Hard-rule violations of a schedule, excluding completeness gaps that the
/// reporter fills in.
fn violations(
    schedule: &Schedule,
    unscheduled: &[UnscheduledEntry],
    request: &DayRequest,
) -> Vec<Violation> {
    let listed: HashSet<&str> = unscheduled.iter().map(|e| e.task_id.as_str()).collect();
    let mut padded: Vec<UnscheduledEntry> = unscheduled.to_vec();
    padded.extend(
        request
            .tasks
            .iter()
            .filter(|t| !schedule.contains(&t.id) && !listed.contains(t.id.as_str()))
            .map(|t| UnscheduledEntry::new(&t.id, UnscheduledReason::NotPlaced)),
    );
    validate_schedule(schedule, &padded, request).err().unwrap_or_default()
}
