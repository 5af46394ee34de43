//! Day quality metrics (KPIs).
//!
//! Computes plan-level indicators from a schedule and its request.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled minutes | Sum of placed durations |
//! | Utilization | Scheduled minutes / window minutes not blocked |
//! | Longest run | Longest stretch of work without a recovery gap |
//! | On-time count | Placed tasks with a deadline that end by it |
//! | Minimum slack | Smallest `deadline - end` over placed tasks |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use crate::config::EngineConfig;
use crate::models::{DayRequest, Schedule};

use super::placement::Timeline;
use super::wellbeing;

/// Day-plan performance indicators. Times are in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct DayKpi {
    /// Total placed minutes.
    pub scheduled_minutes: i64,
    /// Fraction of unblocked window time that is placed (0.0..1.0).
    pub utilization: f64,
    /// Longest continuous run of work.
    pub longest_run_minutes: i64,
    /// Placed tasks with a deadline that finish by it.
    pub on_time_count: usize,
    /// Placed tasks with a deadline.
    pub deadline_count: usize,
    /// Smallest slack to a deadline among placed tasks, if any have one.
    pub min_deadline_slack_minutes: Option<i64>,
}

impl DayKpi {
    /// Computes KPIs for a schedule.
    pub fn calculate(schedule: &Schedule, request: &DayRequest, config: &EngineConfig) -> Self {
        let scheduled_minutes = schedule.scheduled_minutes();

        let window = request.window();
        let available = Timeline::new(window.start, window.end)
            .with_fixed(request.blocked_windows())
            .free_minutes();
        let utilization = if available > 0 {
            scheduled_minutes as f64 / available as f64
        } else {
            0.0
        };

        let longest_run_minutes = wellbeing::continuous_runs(schedule, config)
            .iter()
            .map(|r| r.minutes())
            .max()
            .unwrap_or(0);

        let mut on_time_count = 0;
        let mut deadline_count = 0;
        let mut min_slack: Option<i64> = None;
        for item in &schedule.items {
            let Some(deadline) = request.task(&item.task_id).and_then(|t| t.deadline) else {
                continue;
            };
            deadline_count += 1;
            let slack = (deadline - item.end_time).num_minutes();
            if slack >= 0 {
                on_time_count += 1;
            }
            min_slack = Some(min_slack.map_or(slack, |m| m.min(slack)));
        }

        Self {
            scheduled_minutes,
            utilization,
            longest_run_minutes,
            on_time_count,
            deadline_count,
            min_deadline_slack_minutes: min_slack,
        }
    }

    /// Fraction of deadline-bound placements that are on time (1.0 if none).
    pub fn on_time_rate(&self) -> f64 {
        if self.deadline_count == 0 {
            1.0
        } else {
            self.on_time_count as f64 / self.deadline_count as f64
        }
    }
}
