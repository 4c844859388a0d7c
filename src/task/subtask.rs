//! Subtask definitions.
//!
//! A subtask is a child item owned by exactly one [`Task`](super::Task).
//! Its title is fixed at creation; only the completion flag changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::TaskError;

/// Unique identifier for a subtask.
///
/// # Properties
/// - Unique within the owning task (in practice globally unique)
/// - Immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(Uuid);

impl SubtaskId {
    /// Create a new unique subtask ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubtaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SubtaskId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single step of a task.
///
/// # Invariants
/// - `title` is non-empty and trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtask {
    id: SubtaskId,
    title: String,
    completed: bool,
}

impl Subtask {
    /// Create a new, incomplete subtask.
    ///
    /// # Errors
    /// Returns `TaskError::Validation` if `title` is blank.
    pub fn new(title: impl AsRef<str>) -> Result<Self, TaskError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(TaskError::Validation(
                "Subtask title cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id: SubtaskId::new(),
            title: title.to_string(),
            completed: false,
        })
    }

    /// Build an ordered subtask list from titles, preserving their order.
    ///
    /// Fails as a whole if any title is blank, so a caller never applies a
    /// partial list.
    pub fn from_titles<I, S>(titles: I) -> Result<Vec<Self>, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        titles.into_iter().map(Subtask::new).collect()
    }

    pub fn id(&self) -> SubtaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Flip the completion flag and return the new value.
    pub(crate) fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}
