//! Busy-interval bookkeeping and earliest-slot search.
//!
//! A [`Timeline`] covers `[floor, ceiling)` of one day and holds two kinds
//! of occupancy:
//! - **fixed** intervals (blocked occurrences, standing exclusions) that a
//!   placement must not intersect;
//! - **placed** items, each followed by a trailing gap that the next
//!   placement must also respect.
//!
//! # Algorithm
//! Slot search starts at the requested instant and, whenever the candidate
//! `[start, end + trailing_gap)` conflicts, jumps to the latest end among
//! the conflicting intervals. The start strictly increases and each jump
//! lands on one of finitely many interval ends, so the search terminates
//! after at most one jump per occupied interval.

use chrono::{DateTime, Duration, FixedOffset};

use crate::models::TimeWindow;

#[derive(Debug, Clone, Copy)]
struct Placed {
    window: TimeWindow,
    trailing_gap: Duration,
}

impl Placed {
    fn padded_end(&self) -> DateTime<FixedOffset> {
        self.window.end + self.trailing_gap
    }
}

/// Occupancy of one day for slot searching.
#[derive(Debug, Clone)]
pub struct Timeline {
    floor: DateTime<FixedOffset>,
    ceiling: DateTime<FixedOffset>,
    fixed: Vec<TimeWindow>,
    placed: Vec<Placed>,
}

impl Timeline {
    /// Empty timeline; nothing may start before `floor` or end after `ceiling`.
    pub fn new(floor: DateTime<FixedOffset>, ceiling: DateTime<FixedOffset>) -> Self {
        Self {
            floor,
            ceiling,
            fixed: Vec::new(),
            placed: Vec::new(),
        }
    }

    /// Adds fixed intervals (blocked occurrences).
    pub fn with_fixed(mut self, windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        self.fixed.extend(windows);
        self
    }

    /// Adds a standing exclusion no placement may touch.
    pub fn exclude(&mut self, window: TimeWindow) {
        self.fixed.push(window);
    }

    /// Records a placement followed by `trailing_gap` of required idle time.
    pub fn occupy(&mut self, window: TimeWindow, trailing_gap: Duration) {
        self.placed.push(Placed {
            window,
            trailing_gap,
        });
    }

    /// Earliest bound for placements.
    pub fn floor(&self) -> DateTime<FixedOffset> {
        self.floor
    }

    /// Earliest start at or after `from` for a placement of `duration`
    /// followed by `trailing_gap`, ending no later than `latest_end`.
    ///
    /// Returns `None` if no such slot exists.
    pub fn earliest_slot(
        &self,
        from: DateTime<FixedOffset>,
        duration: Duration,
        trailing_gap: Duration,
        latest_end: DateTime<FixedOffset>,
    ) -> Option<DateTime<FixedOffset>> {
        let latest_end = latest_end.min(self.ceiling);
        let mut start = from.max(self.floor);

        loop {
            let end = start.checked_add_signed(duration)?;
            if end > latest_end {
                return None;
            }
            match self.conflict_end(start, end, trailing_gap) {
                None => return Some(start),
                Some(next) => start = next,
            }
        }
    }

    /// Whether `[start, end)` plus `trailing_gap` fits without conflict.
    pub fn is_free(&self, window: TimeWindow, trailing_gap: Duration) -> bool {
        window.start >= self.floor
            && window.end <= self.ceiling
            && self
                .conflict_end(window.start, window.end, trailing_gap)
                .is_none()
    }

    /// Latest end among intervals conflicting with the candidate, if any.
    fn conflict_end(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        trailing_gap: Duration,
    ) -> Option<DateTime<FixedOffset>> {
        let fixed = self
            .fixed
            .iter()
            .filter(|f| start < f.end && f.start < end)
            .map(|f| f.end);

        let padded_end = end + trailing_gap;
        let placed = self
            .placed
            .iter()
            .filter(|p| start < p.padded_end() && p.window.start < padded_end)
            .map(Placed::padded_end);

        fixed.chain(placed).max()
    }

    /// Minutes in `[floor, ceiling)` not covered by fixed intervals.
    pub fn free_minutes(&self) -> i64 {
        if self.ceiling <= self.floor {
            return 0;
        }
        let span = TimeWindow::new(self.floor, self.ceiling);

        let mut clipped: Vec<TimeWindow> = self
            .fixed
            .iter()
            .filter(|f| f.overlaps(&span))
            .map(|f| TimeWindow::new(f.start.max(span.start), f.end.min(span.end)))
            .collect();
        clipped.sort_by_key(|w| w.start);

        let mut covered = 0;
        let mut current: Option<TimeWindow> = None;
        for w in clipped {
            current = match current {
                Some(c) if w.start <= c.end => Some(TimeWindow::new(c.start, c.end.max(w.end))),
                Some(c) => {
                    covered += c.duration().num_minutes();
                    Some(w)
                }
                None => Some(w),
            };
        }
        if let Some(c) = current {
            covered += c.duration().num_minutes();
        }

        span.duration().num_minutes() - covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hm: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(&format!("2026-10-19T{hm}:00+09:00")).unwrap()
    }

    fn win(a: &str, b: &str) -> TimeWindow {
        TimeWindow::new(at(a), at(b))
    }

    fn mins(m: i64) -> Duration {
        Duration::minutes(m)
    }

    fn day() -> Timeline {
        Timeline::new(at("09:00"), at("17:00"))
    }

    #[test]
    fn test_empty_day_starts_at_floor() {
        let t = day();
        assert_eq!(
            t.earliest_slot(at("08:00"), mins(60), mins(0), at("17:00")),
            Some(at("09:00"))
        );
    }

    #[test]
    fn test_skips_blocked() {
        let t = day().with_fixed([win("09:15", "09:45")]);
        // 30 min does not fit 09:00-09:15
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(30), mins(0), at("17:00")),
            Some(at("09:45"))
        );
        // 15 min fits exactly before the meeting
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(15), mins(0), at("17:00")),
            Some(at("09:00"))
        );
    }

    #[test]
    fn test_trailing_gaps_are_respected() {
        let mut t = day();
        t.occupy(win("09:00", "11:00"), mins(30));
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(90), mins(10), at("17:00")),
            Some(at("11:30"))
        );

        // A candidate placed before an item must leave its own gap.
        let mut t = day();
        t.occupy(win("10:00", "11:00"), mins(0));
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(50), mins(15), at("17:00")),
            Some(at("11:00"))
        );
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(45), mins(15), at("17:00")),
            Some(at("09:00"))
        );
    }

    #[test]
    fn test_respects_latest_end() {
        let mut t = day();
        t.occupy(win("09:00", "12:00"), mins(0));
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(60), mins(0), at("12:30")),
            None
        );
        assert_eq!(
            t.earliest_slot(at("09:00"), mins(30), mins(0), at("12:30")),
            Some(at("12:00"))
        );
        // ceiling caps latest_end
        assert_eq!(
            t.earliest_slot(at("16:30"), mins(60), mins(0), at("23:00")),
            None
        );
    }

    #[test]
    fn test_unrepresentable_end_has_no_slot() {
        let t = day();
        assert_eq!(
            t.earliest_slot(at("09:00"), Duration::MAX, mins(0), at("17:00")),
            None
        );
    }

    #[test]
    fn test_is_free() {
        let mut t = day().with_fixed([win("12:00", "13:00")]);
        t.occupy(win("09:00", "10:00"), mins(10));
        assert!(!t.is_free(win("10:05", "10:30"), mins(0)));
        assert!(t.is_free(win("10:10", "10:30"), mins(0)));
        assert!(!t.is_free(win("11:30", "12:30"), mins(0)));
        assert!(!t.is_free(win("08:30", "09:00"), mins(0)));
    }

    #[test]
    fn test_free_minutes_merges_overlaps() {
        let mut t = day().with_fixed([win("09:15", "09:45"), win("09:30", "10:00")]);
        t.exclude(win("16:30", "18:00"));
        // 480 - 45 - 30
        assert_eq!(t.free_minutes(), 405);
        assert_eq!(Timeline::new(at("17:00"), at("09:00")).free_minutes(), 0);
    }
}
