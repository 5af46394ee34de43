//! Schedule (solution) model.
//!
//! A schedule is an ordered list of placements for one target day.
//! Tasks that are not placed are reported separately as
//! [`UnscheduledEntry`] values, each with a machine-checkable reason.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Task, TimeWindow};

/// A placement of exactly one task.
///
/// Invariant: `end_time - start_time == task.estimated_minutes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    /// Back-reference to the placed task.
    pub task_id: String,
    /// Task title (denormalized for display).
    pub title: String,
    /// Start instant.
    pub start_time: DateTime<FixedOffset>,
    /// End instant (exclusive).
    pub end_time: DateTime<FixedOffset>,
}

impl ScheduledItem {
    /// Places `task` starting at `start`.
    pub fn for_task(task: &Task, start: DateTime<FixedOffset>) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            start_time: start,
            end_time: end_after(start, task.duration()),
        }
    }

    /// Occupied interval.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Placed length.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Same item moved to a new start, keeping its length.
    pub fn shifted_to(&self, start: DateTime<FixedOffset>) -> Self {
        Self {
            start_time: start,
            end_time: end_after(start, self.duration()),
            ..self.clone()
        }
    }
}

/// `start + length`, saturating at the latest representable instant.
fn end_after(start: DateTime<FixedOffset>, length: Duration) -> DateTime<FixedOffset> {
    start
        .checked_add_signed(length)
        .unwrap_or_else(|| DateTime::<Utc>::MAX_UTC.fixed_offset())
}

/// Ordered placements for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Target day.
    pub date: NaiveDate,
    /// Placements, ordered by start time.
    pub items: Vec<ScheduledItem>,
}

impl Schedule {
    /// Creates an empty schedule for a day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
        }
    }

    /// Adds an item, keeping start order.
    pub fn insert(&mut self, item: ScheduledItem) {
        let idx = self
            .items
            .partition_point(|existing| existing.start_time <= item.start_time);
        self.items.insert(idx, item);
    }

    /// Removes and returns the item for a task.
    pub fn remove(&mut self, task_id: &str) -> Option<ScheduledItem> {
        let idx = self.items.iter().position(|i| i.task_id == task_id)?;
        Some(self.items.remove(idx))
    }

    /// Re-sorts items by start time (stable).
    pub fn sort(&mut self) {
        self.items.sort_by_key(|i| i.start_time);
    }

    /// Finds the placement for a task.
    pub fn item_for_task(&self, task_id: &str) -> Option<&ScheduledItem> {
        self.items.iter().find(|i| i.task_id == task_id)
    }

    /// Whether a task is placed.
    pub fn contains(&self, task_id: &str) -> bool {
        self.item_for_task(task_id).is_some()
    }

    /// Total placed minutes.
    pub fn scheduled_minutes(&self) -> i64 {
        self.items.iter().map(|i| i.duration().num_minutes()).sum()
    }

    /// Latest end across all items.
    pub fn last_end(&self) -> Option<DateTime<FixedOffset>> {
        self.items.iter().map(|i| i.end_time).max()
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Why a task was left out of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnscheduledReason {
    /// No slot satisfies the window, blocked periods and deadline.
    NoFeasibleSlot,
    /// The deadline had already passed.
    PastDeadline,
    /// Admitting it would eat into reserved break time.
    CapacityReserved,
    /// Pushed out by an edit and no later slot was free.
    DisplacedNoSlot,
    /// Deadline is beyond the look-ahead horizon; not needed today.
    Deferred,
    /// Longer than the continuous-work cap on its own.
    ExceedsContinuousLimit,
    /// Taken off the schedule by request.
    Removed,
    /// Not present in the schedule handed in, with no recorded reason.
    NotPlaced,
}

impl UnscheduledReason {
    /// Stable code string.
    pub fn code(self) -> &'static str {
        match self {
            Self::NoFeasibleSlot => "NoFeasibleSlot",
            Self::PastDeadline => "PastDeadline",
            Self::CapacityReserved => "CapacityReserved",
            Self::DisplacedNoSlot => "DisplacedNoSlot",
            Self::Deferred => "Deferred",
            Self::ExceedsContinuousLimit => "ExceedsContinuousLimit",
            Self::Removed => "Removed",
            Self::NotPlaced => "NotPlaced",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A task that is in the pool but not in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledEntry {
    /// Task identifier.
    pub task_id: String,
    /// Why it is not placed.
    pub reason: UnscheduledReason,
}

impl UnscheduledEntry {
    /// Creates an entry.
    pub fn new(task_id: impl Into<String>, reason: UnscheduledReason) -> Self {
        Self {
            task_id: task_id.into(),
            reason,
        }
    }
}
