//! Single-day planning engine.
//!
//! Places a pool of prioritized, deadline-bound tasks into one day's
//! availability window without breaking a fixed set of hard rules, and
//! applies structured edits to an existing day plan with cascading repair
//! or atomic rejection. Deterministic: no I/O, no clocks, no randomness.
//! The current instant is always passed in.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `BlockedInterval`, `TimeConstraints`,
//!   `Schedule`, `EditIntent`, `Outcome`, `DayRequest`
//! - **`validation`**: Request checks and the hard-rule validator
//! - **`dispatching`**: Task ordering rules and the rule engine
//! - **`scheduler`**: `Synthesizer`, `Mutator`, outcome assembly, KPIs
//! - **`config`**: Engine tunables (gaps, caps, midday break)
//! - **`error`**: Error types
//!
//! # Hard rules
//!
//! Duration fidelity, no overlap, blocked-interval avoidance, in-bounds,
//! deadline compliance, future-only placement, completeness.
//!
//! # Logging
//!
//! The engine emits [`tracing`] events and never installs a subscriber.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::EngineConfig;
pub use error::{ConfigError, ScheduleError, ScheduleResult};
pub use scheduler::{Mutator, SynthesisMode, Synthesizer};
