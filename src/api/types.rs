//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::task::TaskView;

/// Request to create a task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (trimmed; must not be blank)
    pub title: String,

    /// Explicit subtask titles, in display order
    #[serde(default)]
    pub subtasks: Vec<String>,

    /// Ask the breakdown gateway for subtasks instead
    #[serde(default)]
    pub breakdown: bool,
}

/// The whole task list, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,

    /// No tasks at all; the view shows its empty state
    pub is_empty: bool,
}

impl From<Vec<TaskView>> for TaskListResponse {
    fn from(tasks: Vec<TaskView>) -> Self {
        Self {
            is_empty: tasks.is_empty(),
            tasks,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,

    /// Which breakdown gateway is active ("http" or "keyword")
    pub breakdown_gateway: String,
}
