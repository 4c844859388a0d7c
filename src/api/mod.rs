//! HTTP API for ai-todo.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/tasks` - List tasks, newest first
//! - `POST /api/tasks` - Create a task (optionally with a breakdown)
//! - `DELETE /api/tasks/{id}` - Delete a task and its subtasks
//! - `POST /api/tasks/{id}/toggle` - Toggle a task, cascading to its subtasks
//! - `POST /api/tasks/{id}/subtasks/{subtask_id}/toggle` - Toggle one subtask
//! - `POST /api/tasks/{id}/breakdown` - Break an existing task down on demand
//! - `POST /api/tasks/breakdown` - Breakdown contract: `{ task }` -> `{ subtasks }`

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
