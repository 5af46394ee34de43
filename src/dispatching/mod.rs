//! Dispatching rules and rule engine for task ordering.
//!
//! The synthesizer walks the task pool in the order produced here. The
//! default engine is earliest deadline first, then priority descending,
//! then original input order. [`RuleEngine::slack_then_priority`] orders by
//! least slack instead.
//!
//! # Usage
//!
//! ```
//! use u_dayplan::dispatching::{RuleEngine, SchedulingContext};
//! use u_dayplan::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Edd)
//!     .with_tie_breaker(rules::HighestPriority);
//! assert_eq!(engine.rule_names(), vec!["EDD", "PRIORITY"]);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Jackson (1955), earliest-due-date sequencing

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{RuleEngine, TieBreaker};

use crate::models::Task;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (scheduled first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates task priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for tasks that should be placed first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "EDD").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a task given the current context.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
