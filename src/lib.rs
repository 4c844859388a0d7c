//! # ai-todo
//!
//! Task list service with AI-assisted subtask breakdown.
//!
//! This library provides:
//! - An in-memory task store that keeps task and subtask completion consistent
//! - A breakdown gateway that turns a task title into ordered subtask titles
//! - An HTTP API that a view layer renders from
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────────────────────────┐
//!        │            HTTP API              │
//!        └────────────────┬─────────────────┘
//!                         │
//!                         ▼
//!                ┌─────────────────┐        ┌──────────────────────┐
//!                │   TodoService   │ ─────▶ │  BreakdownGateway    │
//!                └────────┬────────┘        │  (http | keyword)    │
//!                         │                 └──────────────────────┘
//!                         ▼
//!                ┌─────────────────┐
//!                │    TaskStore    │
//!                └─────────────────┘
//! ```
//!
//! ## Add-with-breakdown Flow
//! 1. Validate the title
//! 2. Insert a pending task (empty subtasks, loading state)
//! 3. Call the breakdown gateway without holding the store lock
//! 4. Resolve the pending task with the subtasks, or discard it on failure
//!
//! ## Modules
//! - `task`: Task, Subtask and the in-memory `TaskStore`
//! - `breakdown`: `BreakdownGateway` trait with HTTP and keyword implementations
//! - `service`: `TodoService` tying the store to a gateway
//! - `api`: axum routes

pub mod api;
pub mod breakdown;
pub mod config;
pub mod service;
pub mod task;
pub mod util;

pub use breakdown::{BreakdownError, BreakdownGateway};
pub use config::Config;
pub use service::{ServiceError, TodoService};
pub use task::{Task, TaskError, TaskId, TaskStore};
