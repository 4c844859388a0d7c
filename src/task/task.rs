//! Core Task type and its completion reconciliation rules.
//!
//! # Invariants
//! - `title` is non-empty and trimmed
//! - After any completion transition, `completed` agrees with the subtasks:
//!   toggling the task forces every subtask to the same state, toggling a
//!   subtask recomputes the task from the full subtask list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subtask::{Subtask, SubtaskId};

/// Unique identifier for a task.
///
/// # Properties
/// - Globally unique within the process
/// - Immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID.
    ///
    /// # Postcondition
    /// Returns a fresh ID that has never been used before in this process.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TaskId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A top-level todo item, optionally decomposed into subtasks.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Unique identifier for this task
    id: TaskId,

    /// Display text, trimmed
    title: String,

    completed: bool,

    /// Ordered steps; insertion order is display order
    subtasks: Vec<Subtask>,

    /// Set while a breakdown request for this task is in flight
    pending: bool,

    created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with the given subtask titles.
    ///
    /// # Postconditions
    /// - `completed == false`, every subtask incomplete
    /// - `task.id` is a fresh unique identifier
    ///
    /// # Errors
    /// Returns `TaskError::Validation` if the title or any subtask title is
    /// blank after trimming.
    pub fn new<I, S>(title: &str, subtask_titles: I) -> Result<Self, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let title = validate_title(title)?;
        let subtasks = Subtask::from_titles(subtask_titles)?;

        Ok(Self {
            id: TaskId::new(),
            title,
            completed: false,
            subtasks,
            pending: false,
            created_at: Utc::now(),
        })
    }

    /// Create a task whose subtasks are still being produced.
    pub fn new_pending(title: &str) -> Result<Self, TaskError> {
        let mut task = Self::new(title, std::iter::empty::<&str>())?;
        task.pending = true;
        Ok(task)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of completed subtasks.
    pub fn completed_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.is_completed()).count()
    }

    /// Fraction of completed subtasks in `[0.0, 1.0]`, or `None` without subtasks.
    pub fn progress(&self) -> Option<f64> {
        if self.subtasks.is_empty() {
            None
        } else {
            Some(self.completed_count() as f64 / self.subtasks.len() as f64)
        }
    }

    // Completion transitions

    /// Set the completion flag and force every subtask to the same value.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        for subtask in &mut self.subtasks {
            subtask.set_completed(completed);
        }
    }

    /// Flip the completion flag, cascading to subtasks. Returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.set_completed(!self.completed);
        self.completed
    }

    /// Flip one subtask and recompute the task from the whole list.
    ///
    /// # Postcondition
    /// `completed == subtasks.all(completed)` (the list is non-empty here,
    /// since the subtask was found).
    ///
    /// # Errors
    /// Returns `TaskError::SubtaskNotFound` if no subtask has `subtask_id`.
    pub fn toggle_subtask(&mut self, subtask_id: SubtaskId) -> Result<bool, TaskError> {
        let subtask = self
            .subtasks
            .iter_mut()
            .find(|s| s.id() == subtask_id)
            .ok_or(TaskError::SubtaskNotFound {
                task_id: self.id,
                subtask_id,
            })?;
        let now_completed = subtask.toggle();
        self.reconcile_from_subtasks();
        Ok(now_completed)
    }

    /// Recompute `completed` from the subtasks; unchanged when there are none.
    fn reconcile_from_subtasks(&mut self) {
        if !self.subtasks.is_empty() {
            self.completed = self.subtasks.iter().all(Subtask::is_completed);
        }
    }

    // Breakdown lifecycle

    pub(crate) fn mark_pending(&mut self) {
        self.pending = true;
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending = false;
    }

    /// Replace the subtasks with a freshly built list and leave the pending state.
    ///
    /// All new subtasks start incomplete, so a non-empty list also resets the
    /// task to incomplete.
    pub(crate) fn replace_subtasks(&mut self, subtasks: Vec<Subtask>) {
        self.subtasks = subtasks;
        self.pending = false;
        self.reconcile_from_subtasks();
    }
}

/// Trim a title and reject it if nothing is left.
pub fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation(
            "Task title cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Errors that can occur during task operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Subtask {subtask_id} not found in task {task_id}")]
    SubtaskNotFound {
        task_id: TaskId,
        subtask_id: SubtaskId,
    },

    #[error("Task {0} is reserved by an in-flight breakdown")]
    Reserved(TaskId),
}

impl TaskError {
    /// Whether this error is expected when racing a deletion and can be ignored.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            TaskError::NotFound(_) | TaskError::SubtaskNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip() -> Task {
        Task::new("trip", ["pick destination", "book hotel"]).unwrap()
    }

    #[test]
    fn toggle_cascades_to_every_subtask() {
        let mut task = trip();
        assert!(task.toggle());
        assert!(task.subtasks().iter().all(|s| s.is_completed()));

        assert!(!task.toggle());
        assert!(task.subtasks().iter().all(|s| !s.is_completed()));
    }

    #[test]
    fn subtask_toggle_recomputes_parent() {
        let mut task = trip();
        let first = task.subtasks()[0].id();
        let second = task.subtasks()[1].id();

        task.toggle_subtask(first).unwrap();
        assert!(!task.is_completed());
        task.toggle_subtask(second).unwrap();
        assert!(task.is_completed());

        // Un-completing one step reopens the task
        task.toggle_subtask(first).unwrap();
        assert!(!task.is_completed());
    }

    #[test]
    fn unknown_subtask_is_reported() {
        let mut task = trip();
        let err = task.toggle_subtask(SubtaskId::new()).unwrap_err();
        assert!(matches!(err, TaskError::SubtaskNotFound { .. }));
        assert!(err.is_benign());
    }

    #[test]
    fn progress_is_ratio_of_completed_subtasks() {
        let mut task = trip();
        assert_eq!(task.progress(), Some(0.0));
        let first = task.subtasks()[0].id();
        task.toggle_subtask(first).unwrap();
        assert_eq!(task.progress(), Some(0.5));
        assert_eq!(task.completed_count(), 1);

        let empty = Task::new("buy milk", Vec::<String>::new()).unwrap();
        assert_eq!(empty.progress(), None);
    }

    #[test]
    fn title_is_trimmed_and_validated() {
        assert_eq!(validate_title("  buy milk ").unwrap(), "buy milk");
        assert!(matches!(validate_title(" \t "), Err(TaskError::Validation(_))));
        assert!(Task::new("", ["a"]).is_err());
    }
}
