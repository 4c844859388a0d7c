//! Breakdown gateway: turns a task title into an ordered list of subtask titles.
//!
//! This module provides a trait-based abstraction over breakdown sources:
//! - `HttpBreakdownGateway`: the remote breakdown service (authoritative)
//! - `KeywordBreakdownGateway`: a deterministic local fallback, also used as
//!   a test double
//!
//! Both sit behind `BreakdownGateway` so the task store never knows which one
//! produced its subtasks.

mod error;
mod http;
mod keyword;

pub use error::{BreakdownError, BreakdownErrorKind};
pub use http::HttpBreakdownGateway;
pub use keyword::KeywordBreakdownGateway;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BreakdownConfig;

/// Wire request for a breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRequest {
    /// Title of the task to break down
    pub task: String,
}

/// Wire response for a successful breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownResponse {
    /// Subtask titles in display order
    pub subtasks: Vec<String>,
}

/// Produces subtask titles for a task title.
///
/// # Contract
/// - `title` must be non-empty; a blank title fails with `InvalidInput`
/// - On success the list is non-empty and its order is the display order
/// - On failure nothing has been applied anywhere
#[async_trait]
pub trait BreakdownGateway: Send + Sync {
    async fn breakdown(&self, title: &str) -> Result<Vec<String>, BreakdownError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

pub type GatewayRef = Arc<dyn BreakdownGateway>;

/// Build the gateway selected by configuration.
///
/// A configured remote URL wins; otherwise the keyword fallback is used.
pub fn from_config(config: &BreakdownConfig) -> Result<GatewayRef, BreakdownError> {
    match &config.api_url {
        Some(url) => Ok(Arc::new(HttpBreakdownGateway::with_timeout(
            url.clone(),
            config.timeout,
        )?)),
        None => Ok(Arc::new(KeywordBreakdownGateway::with_delay(
            config.mock_delay,
        ))),
    }
}

/// Check a breakdown result against the contract.
///
/// Titles are trimmed; an empty list or a blank entry is malformed.
pub(crate) fn validate_subtasks(subtasks: Vec<String>) -> Result<Vec<String>, BreakdownError> {
    if subtasks.is_empty() {
        return Err(BreakdownError::malformed("No subtasks in response"));
    }
    subtasks
        .into_iter()
        .enumerate()
        .map(|(i, title)| {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                Err(BreakdownError::malformed(format!("Subtask {} is blank", i)))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
