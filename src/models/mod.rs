//! Day-planning domain models.
//!
//! Provides the core data types exchanged with the session layer: the task
//! pool, the day's availability and blocked periods, placements, edit
//! intents, and outcomes.
//!
//! # Ownership
//!
//! | Type | Owner | Lifetime |
//! |------|-------|----------|
//! | Task | caller's pool | across calls, immutable |
//! | BlockedInterval / TimeConstraints | session | supplied fresh per call |
//! | Schedule / ScheduledItem | caller | returned in each Outcome |
//! | EditIntent | intent classifier | one call |

mod calendar;
mod intent;
mod outcome;
mod request;
mod schedule;
mod task;

pub use calendar::{BlockedInterval, TimeConstraints, TimeWindow};
pub use intent::EditIntent;
pub use outcome::{Outcome, ReasonCode, RejectionRule};
pub use request::DayRequest;
pub use schedule::{Schedule, ScheduledItem, UnscheduledEntry, UnscheduledReason};
pub use task::{Priority, Task};
