//! Day synthesis, single-edit mutation, and day KPIs.
//!
//! # Algorithm
//!
//! `Synthesizer` is a greedy, deadline-driven, earliest-feasible-slot
//! heuristic over a single day. It is not optimal, but it is deterministic
//! and every result is checked against the hard rules before it leaves the
//! engine.
//!
//! `Mutator` applies one structured edit at a time. An edit either commits
//! whole (possibly shifting the tasks it displaced) or rolls back, so the
//! caller never sees a half-applied change.
//!
//! # KPI
//!
//! `DayKpi` reports scheduled minutes, utilization, the longest continuous
//! run, and deadline slack.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod mutator;
pub mod placement;
mod report;
mod synthesizer;
pub mod wellbeing;

pub use kpi::DayKpi;
pub use mutator::Mutator;
pub use placement::Timeline;
pub use report::OutcomeReporter;
pub use synthesizer::{SynthesisMode, Synthesizer};
