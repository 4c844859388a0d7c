//! Read-only projections of tasks for rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::subtask::{Subtask, SubtaskId};
use super::task::{Task, TaskId};

#[derive(Debug, Clone, Serialize)]
pub struct SubtaskView {
    pub id: SubtaskId,
    pub title: String,
    pub completed: bool,
}

impl From<&Subtask> for SubtaskView {
    fn from(subtask: &Subtask) -> Self {
        Self {
            id: subtask.id(),
            title: subtask.title().to_string(),
            completed: subtask.is_completed(),
        }
    }
}

/// Snapshot of a task with the derived data a view needs.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub subtasks: Vec<SubtaskView>,

    /// Show a loading affordance instead of the subtask list
    pub pending: bool,

    pub completed_count: usize,
    pub total_count: usize,

    /// `completed_count / total_count`, absent when there are no subtasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            completed: task.is_completed(),
            subtasks: task.subtasks().iter().map(SubtaskView::from).collect(),
            pending: task.is_pending(),
            completed_count: task.completed_count(),
            total_count: task.subtasks().len(),
            progress: task.progress(),
            created_at: task.created_at(),
        }
    }
}
