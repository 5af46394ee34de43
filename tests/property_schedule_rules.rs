use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashSet;
use u_dayplan::models::{
    BlockedInterval, DayRequest, EditIntent, Outcome, Priority, Task, TimeConstraints,
};
use u_dayplan::scheduler::{wellbeing, Mutator, SynthesisMode, Synthesizer};
use u_dayplan::validation::validate_schedule;
use u_dayplan::EngineConfig;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

/// Instant `minutes` after local midnight of the target day.
fn minute_of_day(minutes: i64) -> DateTime<FixedOffset> {
    let midnight = date().and_hms_opt(0, 0, 0).unwrap();
    DateTime::from_naive_utc_and_offset(midnight - Duration::seconds(9 * 3600), offset())
        + Duration::minutes(minutes)
}

fn time_of_day(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn arb_task(index: usize) -> impl Strategy<Value = Task> {
    (5i64..=150, arb_priority(), proptest::option::of(8 * 60i64..=36 * 60)).prop_map(
        move |(minutes, priority, deadline)| {
            let task = Task::new(format!("T{index}"), format!("Task {index}"), minutes)
                .with_priority(priority);
            match deadline {
                Some(m) => task.with_deadline(minute_of_day(m)),
                None => task,
            }
        },
    )
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    (0usize..10).prop_flat_map(|n| (0..n).map(arb_task).collect::<Vec<_>>())
}

fn arb_blocked() -> impl Strategy<Value = Vec<BlockedInterval>> {
    proptest::collection::vec((8 * 60u32..18 * 60, 5u32..90), 0..4).prop_map(|spans| {
        spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, len))| {
                let title = format!("Block {i}");
                BlockedInterval::new(title, time_of_day(start), time_of_day(start + len))
            })
            .collect()
    })
}

fn arb_request() -> impl Strategy<Value = DayRequest> {
    (arb_tasks(), arb_blocked(), 6 * 60i64..15 * 60, 0i64..60).prop_map(
        |(tasks, blocked, now_minute, now_second)| {
            let now = minute_of_day(now_minute) + Duration::seconds(now_second);
            let mut request = DayRequest::new(
                date(),
                now,
                TimeConstraints::new(time_of_day(9 * 60), time_of_day(17 * 60)),
            )
            .with_tasks(tasks);
            request.blocked = blocked;
            request
        },
    )
}

fn arb_mode() -> impl Strategy<Value = SynthesisMode> {
    prop_oneof![Just(SynthesisMode::FullPool), Just(SynthesisMode::Selective)]
}

fn accounted_once(outcome: &Outcome, request: &DayRequest) -> bool {
    let mut seen = HashSet::new();
    let all_once = outcome
        .schedule
        .items
        .iter()
        .map(|i| i.task_id.as_str())
        .chain(outcome.unscheduled.iter().map(|e| e.task_id.as_str()))
        .all(|id| seen.insert(id));
    let pool: HashSet<&str> = request.tasks.iter().map(|t| t.id.as_str()).collect();
    all_once && seen == pool
}

proptest! {
    /// Property: synthesis output satisfies every hard rule.
    ///
    /// Covers duration fidelity, no overlap, blocked avoidance, bounds,
    /// deadlines and future-only placement in one validator pass.
    #[test]
    fn prop_synthesis_passes_validation(request in arb_request(), mode in arb_mode()) {
        let outcome = Synthesizer::new()
            .synthesize(&request, mode)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(validate_schedule(&outcome.schedule, &outcome.unscheduled, &request).is_ok());
        for item in &outcome.schedule.items {
            let task = request.task(&item.task_id).unwrap();
            prop_assert_eq!(item.end_time - item.start_time, task.duration());
            prop_assert!(item.start_time > request.now);
        }
    }

    /// Property: every pool task is either scheduled or unscheduled, once.
    #[test]
    fn prop_synthesis_is_complete(request in arb_request(), mode in arb_mode()) {
        let outcome = Synthesizer::new()
            .synthesize(&request, mode)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(accounted_once(&outcome, &request));
    }

    /// Property: placements never overlap each other.
    #[test]
    fn prop_no_overlap(request in arb_request(), mode in arb_mode()) {
        let outcome = Synthesizer::new()
            .synthesize(&request, mode)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let items = &outcome.schedule.items;
        for pair in items.windows(2) {
            prop_assert!(pair[0].end_time <= pair[1].start_time);
        }
    }

    /// Property: selective mode keeps continuous work under the cap and
    /// leaves an hour free in the midday band.
    #[test]
    fn prop_selective_wellbeing(request in arb_request()) {
        let config = EngineConfig::default();
        let outcome = Synthesizer::new()
            .synthesize(&request, SynthesisMode::Selective)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for run in wellbeing::continuous_runs(&outcome.schedule, &config) {
            prop_assert!(run.minutes() <= config.max_continuous_minutes);
        }
        prop_assert!(
            wellbeing::longest_midday_gap(&outcome.schedule, &request, &config)
                >= config.midday_break_minutes
        );
        prop_assert!(wellbeing::check(&outcome.schedule, &request, &config).is_empty());
    }

    /// Property: a query never changes anything.
    #[test]
    fn prop_query_is_idempotent(request in arb_request()) {
        let current = Synthesizer::new()
            .synthesize(&request, SynthesisMode::FullPool)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .schedule;
        let outcome = Mutator::new()
            .apply_intent(&current, &request, &EditIntent::Query)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&outcome.schedule, &current);
        prop_assert!(!outcome.changed);
    }

    /// Property: a rejected move returns the input schedule untouched, and
    /// a committed move yields a valid schedule.
    #[test]
    fn prop_move_commits_or_rolls_back(
        request in arb_request(),
        pick in 0usize..10,
        target_minute in 8 * 60i64..18 * 60,
    ) {
        prop_assume!(!request.tasks.is_empty());
        let current = Synthesizer::new()
            .synthesize(&request, SynthesisMode::FullPool)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .schedule;
        let task_id = request.tasks[pick % request.tasks.len()].id.clone();
        let intent = EditIntent::MoveTask {
            task_id,
            requested_start: minute_of_day(target_minute),
        };

        let outcome = Mutator::new()
            .apply_intent(&current, &request, &intent)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        if outcome.reason.is_commit() {
            prop_assert!(outcome.changed);
            let checked = validate_schedule(&outcome.schedule, &outcome.unscheduled, &request);
            prop_assert!(checked.is_ok());
        } else {
            prop_assert_eq!(&outcome.schedule, &current);
            prop_assert!(!outcome.changed);
        }
        prop_assert!(accounted_once(&outcome, &request));
    }
}
