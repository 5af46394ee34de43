//! Per-call planning environment.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::calendar::local_instant;
use super::{BlockedInterval, Task, TimeConstraints, TimeWindow};

/// Everything one synthesis or mutation call needs besides the intent.
///
/// Supplied fresh by the session layer on every call; the engine keeps no
/// copy between calls.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, NaiveDate, NaiveTime};
/// use u_dayplan::models::{DayRequest, Task, TimeConstraints};
///
/// let now = DateTime::parse_from_rfc3339("2026-10-19T08:00:00+09:00").unwrap();
/// let constraints = TimeConstraints::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
/// );
/// let request = DayRequest::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), now, constraints)
///     .with_task(Task::new("T1", "Write report", 60));
///
/// assert_eq!(request.window().start.to_rfc3339(), "2026-10-19T09:00:00+09:00");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRequest {
    /// Target day.
    pub date: NaiveDate,
    /// Time zone the time-of-day fields are interpreted in
    /// (seconds east of UTC on the wire).
    #[serde(with = "offset_seconds")]
    pub offset: FixedOffset,
    /// Current instant. Nothing may be placed at or before it.
    pub now: DateTime<FixedOffset>,
    /// Task pool.
    pub tasks: Vec<Task>,
    /// Recurring daily busy periods.
    pub blocked: Vec<BlockedInterval>,
    /// Daily availability window.
    pub constraints: TimeConstraints,
}

impl DayRequest {
    /// Creates a request in the time zone of `now`.
    pub fn new(date: NaiveDate, now: DateTime<FixedOffset>, constraints: TimeConstraints) -> Self {
        Self {
            date,
            offset: *now.offset(),
            now,
            tasks: Vec::new(),
            blocked: Vec::new(),
            constraints,
        }
    }

    /// Overrides the time zone.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Adds a task to the pool.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Replaces the task pool.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Adds a blocked interval.
    pub fn with_blocked(mut self, blocked: BlockedInterval) -> Self {
        self.blocked.push(blocked);
        self
    }

    /// Target-day instant for a time of day.
    pub fn at(&self, time: NaiveTime) -> DateTime<FixedOffset> {
        local_instant(self.date, time, self.offset)
    }

    /// Availability window on the target day.
    pub fn window(&self) -> TimeWindow {
        self.constraints.on(self.date, self.offset)
    }

    /// Blocked occurrences on the target day.
    pub fn blocked_windows(&self) -> Vec<TimeWindow> {
        self.blocked
            .iter()
            .map(|b| b.on(self.date, self.offset))
            .collect()
    }

    /// Looks up a pool task.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// First whole minute strictly after `now`.
    pub fn earliest_start(&self) -> DateTime<FixedOffset> {
        let now = self.now.with_timezone(&self.offset);
        let truncated = now - Duration::seconds(i64::from(now.second()))
            - Duration::nanoseconds(i64::from(now.nanosecond()));
        truncated + Duration::minutes(1)
    }

    /// Earliest instant a placement may start on the target day.
    pub fn placement_floor(&self) -> DateTime<FixedOffset> {
        self.window().start.max(self.earliest_start())
    }

    /// Copy of this request with `task` appended to the pool.
    pub(crate) fn extended_with(&self, task: Task) -> Self {
        let mut request = self.clone();
        request.tasks.push(task);
        request
    }
}

mod offset_seconds {
    use chrono::FixedOffset;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i32(offset.local_minus_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FixedOffset, D::Error> {
        let secs = i32::deserialize(d)?;
        FixedOffset::east_opt(secs)
            .ok_or_else(|| D::Error::custom(format!("invalid UTC offset: {secs} seconds")))
    }
}
