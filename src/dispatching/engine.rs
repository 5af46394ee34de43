//! Rule engine for multi-criteria task ordering.
//!
//! Composes dispatching rules lexicographically: the first rule decides,
//! later rules only break ties, and a final tie-breaker settles the rest.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep original input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by task id (lexicographic).
    ById,
}

/// A composable rule engine for task ordering.
///
/// # Example
/// ```
/// use u_dayplan::dispatching::RuleEngine;
///
/// // Earliest deadline, then highest priority, then input order.
/// let engine = RuleEngine::deadline_then_priority();
/// assert_eq!(engine.rule_names(), vec!["EDD", "PRIORITY"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Default day-planning order: EDD, then priority, then input order.
    pub fn deadline_then_priority() -> Self {
        Self::new()
            .with_rule(rules::Edd)
            .with_tie_breaker(rules::HighestPriority)
    }

    /// Least-slack order: MST, then priority, then input order.
    ///
    /// Puts long tasks with tight deadlines ahead of short tasks that are
    /// due earlier but have room to spare. Pass it to
    /// `Synthesizer::with_rule_engine` to replace the default order.
    pub fn slack_then_priority() -> Self {
        Self::new()
            .with_rule(rules::Mst)
            .with_tie_breaker(rules::HighestPriority)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a tie-breaking rule, consulted only when earlier rules tie.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts tasks by priority (first = placed first).
    ///
    /// Returns indices into the original slice. The sort is stable, so
    /// fully tied tasks keep input order under [`TieBreaker::InputOrder`].
    pub fn sort_indices(&self, tasks: &[Task], context: &SchedulingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&tasks[a], &tasks[b], context));
        indices
    }

    /// Sorts borrowed tasks, preserving input order on ties.
    pub fn sort_refs(&self, tasks: &mut [&Task], context: &SchedulingContext) {
        tasks.sort_by(|a, b| self.compare(a, b, context));
    }

    /// Evaluates a single task and returns the score from each rule.
    pub fn evaluate(&self, task: &Task, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(task, context)).collect()
    }

    fn compare(&self, a: &Task, b: &Task, context: &SchedulingContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::deadline_then_priority()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{DateTime, FixedOffset};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn ctx() -> SchedulingContext {
        SchedulingContext::at_time(at("2026-10-19T08:00:00+00:00"))
    }

    fn make_task(id: &str, minutes: i64, deadline: Option<&str>, priority: Priority) -> Task {
        let task = Task::new(id, id, minutes).with_priority(priority);
        match deadline {
            Some(d) => task.with_deadline(at(d)),
            None => task,
        }
    }

    fn order(tasks: &[Task], engine: &RuleEngine) -> Vec<String> {
        engine
            .sort_indices(tasks, &ctx())
            .into_iter()
            .map(|i| tasks[i].id.clone())
            .collect()
    }

    #[test]
    fn test_deadline_first() {
        let tasks = vec![
            make_task("late", 30, Some("2026-10-20T12:00:00+00:00"), Priority::High),
            make_task("early", 30, Some("2026-10-19T12:00:00+00:00"), Priority::Low),
            make_task("none", 30, None, Priority::High),
        ];
        assert_eq!(
            order(&tasks, &RuleEngine::default()),
            vec!["early", "late", "none"]
        );
    }

    #[test]
    fn test_priority_breaks_deadline_tie() {
        let tasks = vec![
            make_task("low", 30, Some("2026-10-19T12:00:00+00:00"), Priority::Low),
            make_task("high", 30, Some("2026-10-19T12:00:00+00:00"), Priority::High),
            make_task("medium", 30, Some("2026-10-19T12:00:00+00:00"), Priority::Medium),
        ];
        assert_eq!(
            order(&tasks, &RuleEngine::default()),
            vec!["high", "medium", "low"]
        );
    }

    #[test]
    fn test_slack_then_priority() {
        // slack 90 for the long task, 165 for the short one
        let tasks = vec![
            make_task("short", 15, Some("2026-10-19T11:00:00+00:00"), Priority::Low),
            make_task("long", 150, Some("2026-10-19T12:00:00+00:00"), Priority::Low),
            make_task("none", 15, None, Priority::High),
        ];
        let engine = RuleEngine::slack_then_priority();
        assert_eq!(engine.rule_names(), vec!["MST", "PRIORITY"]);
        assert_eq!(order(&tasks, &engine), vec!["long", "short", "none"]);
        assert_eq!(
            order(&tasks, &RuleEngine::default()),
            vec!["short", "long", "none"]
        );
    }

    #[test]
    fn test_input_order_is_stable() {
        let tasks = vec![
            make_task("C", 30, None, Priority::Medium),
            make_task("A", 60, None, Priority::Medium),
            make_task("B", 15, None, Priority::Medium),
        ];
        assert_eq!(order(&tasks, &RuleEngine::default()), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_by_id_tie_breaker() {
        let tasks = vec![
            make_task("B", 30, None, Priority::Medium),
            make_task("A", 30, None, Priority::Medium),
        ];
        let engine = RuleEngine::default().with_final_tie_breaker(TieBreaker::ById);
        assert_eq!(order(&tasks, &engine), vec!["A", "B"]);
    }

    #[test]
    fn test_custom_engine() {
        let tasks = vec![
            make_task("long", 120, None, Priority::High),
            make_task("short", 15, None, Priority::Low),
        ];
        let engine = RuleEngine::new().with_rule(rules::Spt);
        assert_eq!(order(&tasks, &engine), vec!["short", "long"]);
    }

    #[test]
    fn test_sort_refs_matches_indices() {
        let tasks = vec![
            make_task("late", 30, Some("2026-10-20T12:00:00+00:00"), Priority::Low),
            make_task("early", 30, Some("2026-10-19T12:00:00+00:00"), Priority::Low),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        RuleEngine::default().sort_refs(&mut refs, &ctx());
        assert_eq!(refs[0].id, "early");
    }

    #[test]
    fn test_empty_and_scores() {
        let engine = RuleEngine::default();
        assert!(engine.sort_indices(&[], &ctx()).is_empty());

        let task = make_task("T", 30, None, Priority::High);
        let scores = engine.evaluate(&task, &ctx());
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], f64::MAX);
        assert!((scores[1] + 2.0).abs() < 1e-10);
    }
}
