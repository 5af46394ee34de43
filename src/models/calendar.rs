//! Calendar and time window models.
//!
//! Defines the daily availability window, recurring blocked periods
//! (meetings, commutes), and the absolute interval type used for all
//! overlap arithmetic.
//!
//! # Time Model
//! [`TimeConstraints`] and [`BlockedInterval`] are time-of-day values with no
//! date. They are projected onto a concrete day with [`TimeConstraints::on`]
//! and [`BlockedInterval::on`], producing absolute [`TimeWindow`]s.
//!
//! # Precedence
//! Blocked periods override the availability window. An instant is usable iff:
//! - It falls within the day's availability window, AND
//! - It does NOT fall within any blocked occurrence for that day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Projects a local date and time-of-day onto an absolute instant.
pub(crate) fn local_instant(
    date: NaiveDate,
    time: NaiveTime,
    offset: FixedOffset,
) -> DateTime<FixedOffset> {
    let local = date.and_time(time);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<FixedOffset>,
    /// Interval end (exclusive).
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Duration of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether `other` lies entirely inside this window.
    pub fn encloses(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the intersection in whole minutes (0 if disjoint).
    pub fn overlap_minutes(&self, other: &Self) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            (end - start).num_minutes()
        } else {
            0
        }
    }
}

/// Daily availability window (time-of-day, no date).
///
/// Invariant: `start_time < end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConstraints {
    /// Earliest time of day work may start.
    pub start_time: NaiveTime,
    /// Latest time of day work may end.
    pub end_time: NaiveTime,
}

impl TimeConstraints {
    /// Creates an availability window.
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Whether the window is well-formed.
    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }

    /// Absolute window for the given day.
    pub fn on(&self, date: NaiveDate, offset: FixedOffset) -> TimeWindow {
        TimeWindow::new(
            local_instant(date, self.start_time, offset),
            local_instant(date, self.end_time, offset),
        )
    }
}

/// A recurring daily busy period (meeting, commute, school run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedInterval {
    /// Label shown to the user.
    pub title: String,
    /// Start time of day.
    pub start_time: NaiveTime,
    /// End time of day (exclusive).
    pub end_time: NaiveTime,
}

impl BlockedInterval {
    /// Creates a blocked interval.
    pub fn new(title: impl Into<String>, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            title: title.into(),
            start_time,
            end_time,
        }
    }

    /// Occurrence of this interval on the given day.
    pub fn on(&self, date: NaiveDate, offset: FixedOffset) -> TimeWindow {
        TimeWindow::new(
            local_instant(date, self.start_time, offset),
            local_instant(date, self.end_time, offset),
        )
    }
}
