//! In-memory task store (non-persistent).
//!
//! Holds the ordered task collection, newest first. Every mutation runs to
//! completion on `&mut self`; sharing across async handlers goes through a
//! `tokio::sync::RwLock` owned by the service layer.

use tracing::debug;

use super::subtask::{Subtask, SubtaskId};
use super::task::{Task, TaskError, TaskId};
use super::view::TaskView;

#[derive(Debug, Default)]
pub struct TaskStore {
    /// Newest first
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    // Read side

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Read-only projection of the whole collection for rendering.
    pub fn snapshot(&self) -> Vec<TaskView> {
        self.tasks.iter().map(TaskView::from).collect()
    }

    // Mutations

    /// Create a task with the given subtasks and put it first.
    ///
    /// # Errors
    /// `TaskError::Validation` for a blank title or subtask title; the
    /// collection is left untouched.
    pub fn add_task<I, S>(&mut self, title: &str, subtask_titles: I) -> Result<TaskId, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let task = Task::new(title, subtask_titles)?;
        let id = task.id();
        debug!(task_id = %id, subtasks = task.subtasks().len(), "Task added");
        self.tasks.insert(0, task);
        Ok(id)
    }

    /// Create a task whose breakdown is still in flight and put it first.
    ///
    /// The returned id is reserved for the caller until it resolves or
    /// discards the task.
    pub fn add_pending_task(&mut self, title: &str) -> Result<TaskId, TaskError> {
        let task = Task::new_pending(title)?;
        let id = task.id();
        debug!(task_id = %id, "Pending task added");
        self.tasks.insert(0, task);
        Ok(id)
    }

    /// Populate a pending task with its subtasks and clear the pending marker.
    ///
    /// # Errors
    /// - `TaskError::NotFound` if the task is gone
    /// - `TaskError::Validation` if any title is blank (the task is unchanged)
    pub fn resolve_pending_task<I, S>(
        &mut self,
        id: TaskId,
        subtask_titles: I,
    ) -> Result<(), TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subtasks = Subtask::from_titles(subtask_titles)?;
        let task = self.find_mut(id)?;
        debug!(task_id = %id, subtasks = subtasks.len(), "Pending task resolved");
        task.replace_subtasks(subtasks);
        Ok(())
    }

    /// Remove a pending task after its breakdown failed.
    ///
    /// Returns `false` if it was already gone.
    pub fn discard_pending_task(&mut self, id: TaskId) -> bool {
        let removed = self.remove(id);
        if removed {
            debug!(task_id = %id, "Pending task discarded");
        }
        removed
    }

    /// Reserve an existing task for an on-demand breakdown.
    ///
    /// # Errors
    /// - `TaskError::NotFound` if the task is gone
    /// - `TaskError::Reserved` if a breakdown is already in flight for it
    pub fn begin_breakdown(&mut self, id: TaskId) -> Result<(), TaskError> {
        let task = self.find_mut(id)?;
        if task.is_pending() {
            return Err(TaskError::Reserved(id));
        }
        task.mark_pending();
        Ok(())
    }

    /// Clear the pending marker without touching the subtasks.
    pub fn release_pending(&mut self, id: TaskId) {
        if let Ok(task) = self.find_mut(id) {
            task.clear_pending();
        }
    }

    /// Flip a task's completion flag, cascading to its subtasks.
    ///
    /// Returns the new completion state.
    pub fn toggle_task(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let task = self.find_unreserved_mut(id)?;
        Ok(task.toggle())
    }

    /// Flip one subtask and recompute its parent.
    ///
    /// Returns the parent's new completion state.
    pub fn toggle_subtask(
        &mut self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> Result<bool, TaskError> {
        let task = self.find_unreserved_mut(task_id)?;
        task.toggle_subtask(subtask_id)?;
        Ok(task.is_completed())
    }

    /// Remove a task and all of its subtasks.
    ///
    /// Returns `Ok(false)` if it was already gone.
    ///
    /// # Errors
    /// `TaskError::Reserved` while a breakdown is in flight for the task.
    pub fn delete_task(&mut self, id: TaskId) -> Result<bool, TaskError> {
        if self.get(id).is_some_and(Task::is_pending) {
            return Err(TaskError::Reserved(id));
        }
        Ok(self.remove(id))
    }

    fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id() != id);
        self.tasks.len() != before
    }

    fn find_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn find_unreserved_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskError> {
        let task = self.find_mut(id)?;
        if task.is_pending() {
            return Err(TaskError::Reserved(id));
        }
        Ok(task)
    }
}
