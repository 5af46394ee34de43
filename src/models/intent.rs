//! Structured edit instructions.
//!
//! Intents are produced outside the engine (typically by a classifier over
//! free text). A classifier that is not confident must emit
//! [`EditIntent::Query`]; the engine never guesses.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Task;

/// One requested change to an existing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditIntent {
    /// Relocate a task to start at `requested_start`.
    #[serde(rename_all = "camelCase")]
    MoveTask {
        task_id: String,
        requested_start: DateTime<FixedOffset>,
    },
    /// Add a new task. Without a requested start it goes into the earliest
    /// feasible slot.
    #[serde(rename_all = "camelCase")]
    AddTask {
        task: Task,
        #[serde(default)]
        requested_start: Option<DateTime<FixedOffset>>,
    },
    /// Take a task off the schedule.
    #[serde(rename_all = "camelCase")]
    RemoveTask { task_id: String },
    /// Conversational turn with no schedule change.
    Query,
}

impl EditIntent {
    /// Intent name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MoveTask { .. } => "move_task",
            Self::AddTask { .. } => "add_task",
            Self::RemoveTask { .. } => "remove_task",
            Self::Query => "query",
        }
    }

    /// Id of the task the edit targets directly.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::MoveTask { task_id, .. } | Self::RemoveTask { task_id } => Some(task_id),
            Self::AddTask { task, .. } => Some(&task.id),
            Self::Query => None,
        }
    }
}
