//! Burnout and midday-break analysis.
//!
//! # Continuous work
//! Items are walked in start order. A gap shorter than the recovery minimum
//! required after the preceding task does not break a run; the idle minutes
//! inside such a gap count toward the run's length.
//!
//! # Midday break
//! The midday band `[midday_start, midday_end)` on the target day must
//! contain a contiguous stretch of at least `midday_break_minutes` with no
//! scheduled item. Blocked periods do not consume the break.

use chrono::{DateTime, Duration, FixedOffset};

use crate::config::EngineConfig;
use crate::models::{DayRequest, Schedule, ScheduledItem, TimeWindow};
use crate::validation::{RuleCode, Violation};

/// A maximal stretch of work without a qualifying recovery gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRun {
    /// Start of the first item.
    pub start: DateTime<FixedOffset>,
    /// End of the last item.
    pub end: DateTime<FixedOffset>,
    /// Task ids in the run, in start order.
    pub task_ids: Vec<String>,
}

impl WorkRun {
    fn open(item: &ScheduledItem) -> Self {
        Self {
            start: item.start_time,
            end: item.end_time,
            task_ids: vec![item.task_id.clone()],
        }
    }

    /// Run length including short gaps.
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Recovery gap required after an item.
pub fn required_gap(item: &ScheduledItem, config: &EngineConfig) -> Duration {
    config.gap_after(item.duration().num_minutes(), true)
}

/// Splits a schedule into continuous work runs.
pub fn continuous_runs(schedule: &Schedule, config: &EngineConfig) -> Vec<WorkRun> {
    let mut items: Vec<&ScheduledItem> = schedule.items.iter().collect();
    items.sort_by_key(|i| i.start_time);

    let mut runs: Vec<WorkRun> = Vec::new();
    let mut previous: Option<&ScheduledItem> = None;

    for item in items {
        let continues = previous
            .map(|p| item.start_time - p.end_time < required_gap(p, config))
            .unwrap_or(false);

        match runs.last_mut() {
            Some(run) if continues => {
                run.end = run.end.max(item.end_time);
                run.task_ids.push(item.task_id.clone());
            }
            _ => runs.push(WorkRun::open(item)),
        }
        previous = Some(item);
    }

    runs
}

/// Longest free stretch inside the midday band.
pub fn longest_midday_gap(schedule: &Schedule, request: &DayRequest, config: &EngineConfig) -> i64 {
    let band = TimeWindow::new(request.at(config.midday_start), request.at(config.midday_end));

    let mut busy: Vec<TimeWindow> = schedule
        .items
        .iter()
        .map(ScheduledItem::window)
        .filter(|w| w.overlaps(&band))
        .collect();
    busy.sort_by_key(|w| w.start);

    let mut cursor = band.start;
    let mut longest = Duration::zero();
    for w in busy {
        if w.start > cursor {
            longest = longest.max(w.start - cursor);
        }
        cursor = cursor.max(w.end);
    }
    if band.end > cursor {
        longest = longest.max(band.end - cursor);
    }

    longest.num_minutes()
}

/// Checks the selective-mode wellbeing rules.
///
/// Returns every violation found: short recovery gaps, runs over the
/// continuous-work cap, and a missing midday break.
pub fn check(schedule: &Schedule, request: &DayRequest, config: &EngineConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut items: Vec<&ScheduledItem> = schedule.items.iter().collect();
    items.sort_by_key(|i| i.start_time);
    for pair in items.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let gap = next.start_time - prev.end_time;
        let required = required_gap(prev, config);
        if gap < required {
            violations.push(Violation::new(
                RuleCode::RecoveryGap,
                &prev.task_id,
                format!(
                    "only {} min between '{}' and '{}', {} min required",
                    gap.num_minutes(),
                    prev.task_id,
                    next.task_id,
                    required.num_minutes()
                ),
            ));
        }
    }

    for run in continuous_runs(schedule, config) {
        if run.minutes() > config.max_continuous_minutes {
            violations.push(Violation::new(
                RuleCode::ContinuousWork,
                &run.task_ids[0],
                format!(
                    "{} min of continuous work ({}), cap is {} min",
                    run.minutes(),
                    run.task_ids.join(", "),
                    config.max_continuous_minutes
                ),
            ));
        }
    }

    let midday = longest_midday_gap(schedule, request, config);
    if midday < config.midday_break_minutes {
        violations.push(Violation::new(
            RuleCode::MiddayBreak,
            "",
            format!(
                "longest midday break is {midday} min, {} min required between {} and {}",
                config.midday_break_minutes, config.midday_start, config.midday_end
            ),
        ));
    }

    violations
}
