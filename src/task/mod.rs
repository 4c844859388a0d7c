//! Task module - defines tasks, subtasks, and the in-memory task store.
//!
//! This module is pure data plus synchronous transitions:
//! - Completion reconciliation lives on `Task` and is applied per mutation
//! - `TaskStore` owns the ordered collection and the pending reservations
//! - No IO happens here

mod store;
mod subtask;
pub mod task;
mod view;

pub use store::TaskStore;
pub use subtask::{Subtask, SubtaskId};
pub use task::{validate_title, Task, TaskError, TaskId};
pub use view::{SubtaskView, TaskView};
