//! Constructive day synthesis.
//!
//! # Algorithm
//!
//! 1. Validate the request structure.
//! 2. Order the pool with the rule engine (EDD, priority, input order).
//! 3. Walk the ordered pool once, placing each task at its earliest
//!    feasible slot on a [`Timeline`]. No backtracking.
//! 4. Validate the result against every hard rule (plus the wellbeing rules
//!    in selective mode). A failure here is an engine bug and is returned
//!    as [`ScheduleError::SynthesisInvariantViolation`].
//!
//! # Modes
//!
//! - [`SynthesisMode::FullPool`]: every task is attempted. A fixed buffer
//!   follows each task, or a longer recovery gap after a long task.
//! - [`SynthesisMode::Selective`]: "what fits today". Tasks with passed
//!   deadlines are dropped, tasks outside the look-ahead horizon are
//!   deferred (unless nothing due can be placed, in which case the whole
//!   remaining pool is admitted), a capacity guard keeps break time reserved, recovery gaps
//!   follow every task, the midday break is excluded, and back-to-back
//!   high-intensity tasks are spread out when possible.
//!
//! # Complexity
//! O(n log n + n * m) for n tasks and m occupied intervals; intensity
//! spreading adds a factor of n in the worst case.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dispatching::{RuleEngine, SchedulingContext};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{
    DayRequest, Outcome, Priority, ReasonCode, Schedule, ScheduledItem, Task, TimeWindow,
    UnscheduledEntry, UnscheduledReason,
};
use crate::validation::{validate_input, validate_schedule};

use super::kpi::DayKpi;
use super::placement::Timeline;
use super::report::OutcomeReporter;
use super::wellbeing;

/// Which synthesis policy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SynthesisMode {
    /// Attempt every task in the pool.
    #[default]
    FullPool,
    /// Admit only what fits today while protecting breaks.
    Selective,
}

/// Builds a day schedule from a task pool.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, NaiveDate, NaiveTime};
/// use u_dayplan::models::{DayRequest, Priority, ReasonCode, Task, TimeConstraints};
/// use u_dayplan::scheduler::{SynthesisMode, Synthesizer};
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let request = DayRequest::new(
///     NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
///     at("2026-10-19T08:00:00+09:00"),
///     TimeConstraints::new(
///         NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///         NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     ),
/// )
/// .with_task(
///     Task::new("A", "Draft", 120)
///         .with_priority(Priority::High)
///         .with_deadline(at("2026-10-19T13:00:00+09:00")),
/// )
/// .with_task(Task::new("B", "Review", 90).with_deadline(at("2026-10-19T17:00:00+09:00")));
///
/// let outcome = Synthesizer::new()
///     .synthesize(&request, SynthesisMode::FullPool)
///     .unwrap();
/// assert_eq!(outcome.reason, ReasonCode::Synthesized);
/// assert_eq!(outcome.schedule.items[0].start_time, at("2026-10-19T09:00:00+09:00"));
/// assert_eq!(outcome.schedule.items[1].start_time, at("2026-10-19T11:30:00+09:00"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: EngineConfig,
    rule_engine: RuleEngine,
}

impl Synthesizer {
    /// Creates a synthesizer with default configuration and ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: EngineConfig) -> ScheduleResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the task ordering.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds a schedule for `request.date`.
    ///
    /// # Errors
    /// - [`ScheduleError::MalformedInput`] if the request is structurally invalid.
    /// - [`ScheduleError::SynthesisInvariantViolation`] if the produced
    ///   schedule breaks a rule.
    pub fn synthesize(&self, request: &DayRequest, mode: SynthesisMode) -> ScheduleResult<Outcome> {
        validate_input(request)?;

        let ordered = self.order(request);
        let (schedule, unscheduled) = match mode {
            SynthesisMode::FullPool => self.full_pool(request, &ordered),
            SynthesisMode::Selective => self.selective(request, &ordered),
        };

        self.verify(&schedule, &unscheduled, request, mode)?;

        let kpi = DayKpi::calculate(&schedule, request, &self.config);
        debug!(
            scheduled_minutes = kpi.scheduled_minutes,
            utilization = kpi.utilization,
            longest_run_minutes = kpi.longest_run_minutes,
            on_time = kpi.on_time_count,
            min_slack = ?kpi.min_deadline_slack_minutes,
            "day kpi"
        );
        info!(
            date = %request.date,
            ?mode,
            pool = request.tasks.len(),
            scheduled = schedule.len(),
            unscheduled = unscheduled.len(),
            "synthesis complete"
        );

        Ok(OutcomeReporter::assemble(
            schedule,
            unscheduled,
            &request.tasks,
            true,
            ReasonCode::Synthesized,
        ))
    }

    fn order<'a>(&self, request: &'a DayRequest) -> Vec<&'a Task> {
        let mut ordered: Vec<&Task> = request.tasks.iter().collect();
        self.rule_engine
            .sort_refs(&mut ordered, &SchedulingContext::at_time(request.now));
        ordered
    }

    fn latest_end(task: &Task, window: TimeWindow) -> DateTime<FixedOffset> {
        task.deadline.map_or(window.end, |d| d.min(window.end))
    }

    fn full_pool(
        &self,
        request: &DayRequest,
        ordered: &[&Task],
    ) -> (Schedule, Vec<UnscheduledEntry>) {
        let window = request.window();
        let mut timeline = Timeline::new(request.placement_floor(), window.end)
            .with_fixed(request.blocked_windows());
        let mut schedule = Schedule::new(request.date);
        let mut unscheduled = Vec::new();

        for task in ordered {
            let gap = self.config.gap_after(task.estimated_minutes, false);
            let slot = timeline.earliest_slot(
                timeline.floor(),
                task.duration(),
                gap,
                Self::latest_end(task, window),
            );
            match slot {
                Some(start) => {
                    let item = ScheduledItem::for_task(task, start);
                    debug!(task_id = %task.id, start = %start, "placed");
                    timeline.occupy(item.window(), gap);
                    schedule.insert(item);
                }
                None => {
                    debug!(task_id = %task.id, reason = "NoFeasibleSlot", "not placed");
                    unscheduled.push(UnscheduledEntry::new(
                        &task.id,
                        UnscheduledReason::NoFeasibleSlot,
                    ));
                }
            }
        }

        (schedule, unscheduled)
    }

    /// Splits the ordered pool into tasks due inside the look-ahead horizon
    /// and every task whose deadline has not passed, plus the entries for
    /// tasks whose deadline already passed.
    fn prefilter<'a>(
        &self,
        request: &DayRequest,
        ordered: &[&'a Task],
    ) -> (Vec<&'a Task>, Vec<&'a Task>, Vec<UnscheduledEntry>) {
        let horizon =
            request.at(NaiveTime::default()) + Duration::days(self.config.lookahead_days + 1);
        let mut past = Vec::new();
        let mut due = Vec::new();
        let mut open = Vec::new();

        for &task in ordered {
            if task.is_past_deadline(request.now) {
                past.push(UnscheduledEntry::new(&task.id, UnscheduledReason::PastDeadline));
                continue;
            }
            if task.deadline.is_some_and(|deadline| deadline < horizon) {
                due.push(task);
            }
            open.push(task);
        }

        (due, open, past)
    }

    fn selective(
        &self,
        request: &DayRequest,
        ordered: &[&Task],
    ) -> (Schedule, Vec<UnscheduledEntry>) {
        let (due, open, mut unscheduled) = self.prefilter(request, ordered);

        if due.len() < open.len() {
            let (schedule, mut missed) = self.fit(request, &due);
            if !schedule.is_empty() {
                missed.extend(
                    open.iter()
                        .filter(|t| !due.iter().any(|d| d.id == t.id))
                        .map(|t| UnscheduledEntry::new(&t.id, UnscheduledReason::Deferred)),
                );
                unscheduled.extend(missed);
                return (schedule, unscheduled);
            }
            debug!(
                due = due.len(),
                deferred = open.len() - due.len(),
                "nothing due fits, admitting the whole pool"
            );
        }

        let (schedule, missed) = self.fit(request, &open);
        unscheduled.extend(missed);
        (schedule, unscheduled)
    }

    /// Places admitted tasks under the capacity guard, the continuous-work
    /// cap, the midday break and intensity spreading.
    fn fit(&self, request: &DayRequest, admitted: &[&Task]) -> (Schedule, Vec<UnscheduledEntry>) {
        let window = request.window();
        let mut unscheduled = Vec::new();

        let mut timeline = Timeline::new(request.placement_floor(), window.end)
            .with_fixed(request.blocked_windows());
        let (break_start, break_end) = self.config.midday_reserve();
        timeline.exclude(TimeWindow::new(request.at(break_start), request.at(break_end)));
        let capacity = timeline.free_minutes();

        let mut pending: Vec<&Task> = Vec::with_capacity(admitted.len());
        for &task in admitted {
            if task.estimated_minutes > self.config.max_continuous_minutes {
                unscheduled.push(UnscheduledEntry::new(
                    &task.id,
                    UnscheduledReason::ExceedsContinuousLimit,
                ));
            } else {
                pending.push(task);
            }
        }

        let mut schedule = Schedule::new(request.date);
        let mut committed = 0;

        while !pending.is_empty() {
            let head = pending[0];
            if committed + self.demand(head) > capacity {
                debug!(task_id = %head.id, committed, capacity, "admission closed");
                unscheduled.extend(
                    pending
                        .drain(..)
                        .map(|t| UnscheduledEntry::new(&t.id, UnscheduledReason::CapacityReserved)),
                );
                break;
            }

            let Some(start) = self.slot(&timeline, head, timeline.floor(), window) else {
                debug!(task_id = %head.id, reason = "NoFeasibleSlot", "not placed");
                unscheduled.push(UnscheduledEntry::new(
                    &head.id,
                    UnscheduledReason::NoFeasibleSlot,
                ));
                pending.remove(0);
                continue;
            };

            let spread = match self.preceding_high_end(&schedule, request, start) {
                Some(after) if head.priority == Priority::High => {
                    let between = TimeWindow::new(after, start);
                    self.spread(&timeline, &pending, committed, capacity, window, between)
                }
                _ => None,
            };
            let (index, start) = spread.unwrap_or((0, start));

            let task = pending.remove(index);
            let item = ScheduledItem::for_task(task, start);
            debug!(task_id = %task.id, start = %start, spread = index != 0, "placed");
            timeline.occupy(item.window(), self.config.gap_after(task.estimated_minutes, true));
            schedule.insert(item);
            committed += self.demand(task);
        }

        (schedule, unscheduled)
    }

    /// Minutes a task consumes from capacity, including its recovery gap.
    fn demand(&self, task: &Task) -> i64 {
        task.estimated_minutes + self.config.gap_after(task.estimated_minutes, true).num_minutes()
    }

    fn slot(
        &self,
        timeline: &Timeline,
        task: &Task,
        from: DateTime<FixedOffset>,
        window: TimeWindow,
    ) -> Option<DateTime<FixedOffset>> {
        timeline.earliest_slot(
            from,
            task.duration(),
            self.config.gap_after(task.estimated_minutes, true),
            Self::latest_end(task, window),
        )
    }

    /// End of the item right before `start`, if that item is high priority.
    fn preceding_high_end(
        &self,
        schedule: &Schedule,
        request: &DayRequest,
        start: DateTime<FixedOffset>,
    ) -> Option<DateTime<FixedOffset>> {
        let previous = schedule
            .items
            .iter()
            .filter(|i| i.end_time <= start)
            .max_by_key(|i| i.end_time)?;
        request
            .task(&previous.task_id)
            .filter(|t| t.priority == Priority::High)
            .map(|_| previous.end_time)
    }

    /// First lower-intensity candidate that can start inside `between`
    /// (from the end of the previous high-priority item up to the head's
    /// slot) without costing the head its own slot.
    fn spread(
        &self,
        timeline: &Timeline,
        pending: &[&Task],
        committed: i64,
        capacity: i64,
        window: TimeWindow,
        between: TimeWindow,
    ) -> Option<(usize, DateTime<FixedOffset>)> {
        let head = pending[0];
        pending.iter().enumerate().skip(1).find_map(|(index, &alt)| {
            if alt.priority == Priority::High
                || committed + self.demand(alt) + self.demand(head) > capacity
            {
                return None;
            }
            let start = self
                .slot(timeline, alt, between.start, window)
                .filter(|&s| s <= between.end)?;
            let mut trial = timeline.clone();
            trial.occupy(
                ScheduledItem::for_task(alt, start).window(),
                self.config.gap_after(alt.estimated_minutes, true),
            );
            self.slot(&trial, head, trial.floor(), window).map(|_| (index, start))
        })
    }

    fn verify(
        &self,
        schedule: &Schedule,
        unscheduled: &[UnscheduledEntry],
        request: &DayRequest,
        mode: SynthesisMode,
    ) -> ScheduleResult<()> {
        let mut violations = validate_schedule(schedule, unscheduled, request)
            .err()
            .unwrap_or_default();
        if mode == SynthesisMode::Selective {
            violations.extend(wellbeing::check(schedule, request, &self.config));
        }
        if violations.is_empty() {
            return Ok(());
        }
        for v in &violations {
            warn!(rule = %v.rule, task_id = %v.task_id, "{}", v.message);
        }
        Err(ScheduleError::SynthesisInvariantViolation { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockedInterval, TimeConstraints};
    use crate::validation::RuleCode;
    use chrono::NaiveDate;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn local(hm: &str) -> DateTime<FixedOffset> {
        at(&format!("2026-10-19T{hm}:00+09:00"))
    }

    fn request(now: &str) -> DayRequest {
        DayRequest::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            local(now),
            TimeConstraints::new(hm(9, 0), hm(17, 0)),
        )
    }

    fn starts(outcome: &Outcome) -> Vec<(String, String)> {
        outcome
            .schedule
            .items
            .iter()
            .map(|i| (i.task_id.clone(), i.start_time.format("%H:%M").to_string()))
            .collect()
    }

    fn pair(id: &str, hm: &str) -> (String, String) {
        (id.to_string(), hm.to_string())
    }

    #[test]
    fn test_full_pool_gap_after_long_task() {
        let r = request("08:00")
            .with_task(
                Task::new("A", "Draft", 120)
                    .with_priority(Priority::High)
                    .with_deadline(local("13:00")),
            )
            .with_task(Task::new("B", "Review", 90).with_deadline(local("17:00")));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::FullPool).unwrap();
        assert_eq!(starts(&outcome), vec![pair("A", "09:00"), pair("B", "11:30")]);
        assert!(outcome.unscheduled.is_empty());
        assert!(outcome.changed);
    }

    #[test]
    fn test_full_pool_buffer_and_blocked() {
        let r = request("08:00")
            .with_blocked(BlockedInterval::new("Standup", hm(9, 30), hm(10, 0)))
            .with_task(Task::new("A", "Mail", 20))
            .with_task(Task::new("B", "Notes", 30))
            .with_task(Task::new("C", "Call", 15));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::FullPool).unwrap();
        // A 09:00-09:20, buffer to 09:30; B cannot fit before the standup
        assert_eq!(
            starts(&outcome),
            vec![pair("A", "09:00"), pair("B", "10:00"), pair("C", "10:40")]
        );
    }

    #[test]
    fn test_full_pool_reports_infeasible() {
        let r = request("08:00")
            .with_task(Task::new("big", "Too big", 600))
            .with_task(Task::new("tight", "Tight", 60).with_deadline(local("09:30")))
            .with_task(Task::new("ok", "Fine", 30));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::FullPool).unwrap();
        assert_eq!(outcome.unscheduled_reason("big"), Some(UnscheduledReason::NoFeasibleSlot));
        assert_eq!(outcome.unscheduled_reason("tight"), Some(UnscheduledReason::NoFeasibleSlot));
        assert_eq!(starts(&outcome), vec![pair("ok", "09:00")]);
    }

    #[test]
    fn test_starts_after_now() {
        let r = request("10:17").with_task(Task::new("A", "Mail", 20));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::FullPool).unwrap();
        assert_eq!(starts(&outcome), vec![pair("A", "10:18")]);
    }

    #[test]
    fn test_malformed_input() {
        let r = request("08:00").with_task(Task::new("A", "Zero", 0));
        assert!(matches!(
            Synthesizer::new().synthesize(&r, SynthesisMode::FullPool),
            Err(ScheduleError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_selective_prefilter() {
        let tomorrow = at("2026-10-20T17:00:00+09:00");
        let next_week = at("2026-10-25T17:00:00+09:00");
        let r = request("10:00")
            .with_task(Task::new("past", "Missed", 30).with_deadline(local("09:30")))
            .with_task(Task::new("today", "Due", 30).with_deadline(local("17:00")))
            .with_task(Task::new("tomorrow", "Soon", 30).with_deadline(tomorrow))
            .with_task(Task::new("later", "Week", 30).with_deadline(next_week))
            .with_task(Task::new("open", "Whenever", 30));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();

        assert_eq!(outcome.unscheduled_reason("past"), Some(UnscheduledReason::PastDeadline));
        assert_eq!(outcome.unscheduled_reason("later"), Some(UnscheduledReason::Deferred));
        assert_eq!(outcome.unscheduled_reason("open"), Some(UnscheduledReason::Deferred));
        assert!(outcome.schedule.contains("today"));
        assert!(outcome.schedule.contains("tomorrow"));
    }

    #[test]
    fn test_selective_admits_all_when_nothing_is_due() {
        let r = request("08:00")
            .with_task(Task::new("A", "Open", 30))
            .with_task(Task::new("B", "Open", 30));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        // 30 min task then a 15 min recovery gap
        assert_eq!(starts(&outcome), vec![pair("A", "09:00"), pair("B", "09:45")]);
    }

    #[test]
    fn test_selective_continuous_limit_and_midday() {
        let r = request("08:00")
            .with_task(Task::new("huge", "Marathon", 150))
            .with_task(Task::new("A", "Deep work", 120))
            .with_task(Task::new("B", "Deep work", 60))
            .with_task(Task::new("C", "Deep work", 60));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        assert_eq!(
            outcome.unscheduled_reason("huge"),
            Some(UnscheduledReason::ExceedsContinuousLimit)
        );
        // A 09:00-11:00 +30; B 11:30-12:30 crosses the break, so it waits
        assert_eq!(
            starts(&outcome),
            vec![pair("A", "09:00"), pair("B", "13:00"), pair("C", "14:15")]
        );
    }

    #[test]
    fn test_selective_capacity_guard_closes_admission() {
        let r = request("14:00")
            .with_task(Task::new("A", "First", 60).with_deadline(local("17:00")))
            .with_task(Task::new("B", "Second", 60).with_deadline(local("17:00")))
            .with_task(Task::new("C", "Third", 15).with_deadline(local("17:00")));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        // 179 free minutes: A takes 75, B 75, C would need 30 more
        assert_eq!(starts(&outcome), vec![pair("A", "14:01"), pair("B", "15:16")]);
        assert_eq!(outcome.unscheduled_reason("C"), Some(UnscheduledReason::CapacityReserved));
    }

    #[test]
    fn test_selective_spreads_high_intensity() {
        let task = |id: &str, minutes, priority| {
            Task::new(id, id, minutes)
                .with_priority(priority)
                .with_deadline(local("17:00"))
        };
        let r = request("08:00")
            .with_task(task("H1", 60, Priority::High))
            .with_task(task("H2", 60, Priority::High))
            .with_task(task("L", 30, Priority::Low));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        assert_eq!(
            starts(&outcome),
            vec![pair("H1", "09:00"), pair("L", "10:15"), pair("H2", "11:00")]
        );
    }

    #[test]
    fn test_oversized_estimate_is_malformed() {
        let r = request("08:00").with_task(Task::new("big", "Huge", 1_000_000_000_000));
        for mode in [SynthesisMode::FullPool, SynthesisMode::Selective] {
            assert!(matches!(
                Synthesizer::new().synthesize(&r, mode),
                Err(ScheduleError::MalformedInput { .. })
            ));
        }
    }

    #[test]
    fn test_selective_admits_deferred_when_nothing_due_fits() {
        // the due task ends before the window opens, so nothing due can be placed
        let r = request("08:00")
            .with_task(Task::new("due", "Early", 30).with_deadline(local("08:30")))
            .with_task(Task::new("open", "Whenever", 30));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        assert_eq!(starts(&outcome), vec![pair("open", "09:00")]);
        assert_eq!(outcome.unscheduled_reason("due"), Some(UnscheduledReason::NoFeasibleSlot));
        assert_eq!(outcome.unscheduled_reason("open"), None);
    }

    #[test]
    fn test_selective_spreading_stays_between_high_items() {
        // L fits before the standup, but that would not separate H1 and H2
        let task = |id: &str, minutes, priority, deadline| {
            Task::new(id, id, minutes)
                .with_priority(priority)
                .with_deadline(local(deadline))
        };
        let r = request("08:00")
            .with_blocked(BlockedInterval::new("Standup", hm(9, 20), hm(10, 0)))
            .with_task(task("H1", 60, Priority::High, "11:00"))
            .with_task(task("H2", 30, Priority::High, "14:00"))
            .with_task(task("L", 15, Priority::Low, "17:00"));
        let outcome = Synthesizer::new().synthesize(&r, SynthesisMode::Selective).unwrap();
        assert_eq!(
            starts(&outcome),
            vec![pair("H1", "10:00"), pair("L", "11:15"), pair("H2", "13:00")]
        );
    }

    #[test]
    fn test_least_slack_ordering() {
        let r = request("08:00")
            .with_task(Task::new("short", "Call", 15).with_deadline(local("10:00")))
            .with_task(Task::new("long", "Draft", 150).with_deadline(local("11:35")));

        let by_deadline = Synthesizer::new().synthesize(&r, SynthesisMode::FullPool).unwrap();
        assert_eq!(starts(&by_deadline), vec![pair("short", "09:00")]);

        let by_slack = Synthesizer::new()
            .with_rule_engine(RuleEngine::slack_then_priority())
            .synthesize(&r, SynthesisMode::FullPool)
            .unwrap();
        assert_eq!(starts(&by_slack), vec![pair("long", "09:00")]);
        assert_eq!(
            by_slack.unscheduled_reason("short"),
            Some(UnscheduledReason::NoFeasibleSlot)
        );
    }

    #[test]
    fn test_verify_flags_invalid_schedule() {
        let r = request("08:00")
            .with_task(Task::new("A", "One", 30))
            .with_task(Task::new("B", "Two", 30));
        let mut schedule = Schedule::new(r.date);
        schedule.insert(ScheduledItem::for_task(&r.tasks[0], local("09:00")));
        schedule.insert(ScheduledItem::for_task(&r.tasks[1], local("09:15")));

        let err = Synthesizer::new()
            .verify(&schedule, &[], &r, SynthesisMode::FullPool)
            .unwrap_err();
        assert!(err.is_internal());
        match err {
            ScheduleError::SynthesisInvariantViolation { violations } => {
                assert!(violations.iter().any(|v| v.rule == RuleCode::Overlap));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_runs_wellbeing_in_selective_mode() {
        let r = request("08:00")
            .with_task(Task::new("A", "One", 60))
            .with_task(Task::new("B", "Two", 60));
        let mut schedule = Schedule::new(r.date);
        schedule.insert(ScheduledItem::for_task(&r.tasks[0], local("09:00")));
        schedule.insert(ScheduledItem::for_task(&r.tasks[1], local("10:05")));

        let synthesizer = Synthesizer::new();
        assert!(synthesizer.verify(&schedule, &[], &r, SynthesisMode::FullPool).is_ok());
        assert!(matches!(
            synthesizer.verify(&schedule, &[], &r, SynthesisMode::Selective),
            Err(ScheduleError::SynthesisInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_with_config_rejects_oversized_lookahead() {
        let huge = EngineConfig {
            lookahead_days: i64::MAX / 2,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Synthesizer::new().with_config(huge),
            Err(ScheduleError::Config(_))
        ));
    }

    #[test]
    fn test_with_config_validates() {
        let bad = EngineConfig {
            buffer_minutes: 25,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Synthesizer::new().with_config(bad),
            Err(ScheduleError::Config(_))
        ));
    }
}
