//! Deterministic keyword breakdown.
//!
//! Stands in for the remote service when none is configured. Titles that
//! mention a known keyword get that keyword's fixed plan; anything else gets
//! a generic four-step plan built from the title.

use std::time::Duration;

use async_trait::async_trait;

use super::{BreakdownError, BreakdownGateway};

/// A trigger and its fixed plan.
struct KeywordPlan {
    /// Any of these (case-insensitive substring) selects the plan
    triggers: &'static [&'static str],
    subtasks: &'static [&'static str],
}

/// Checked in order; the first matching entry wins.
const KEYWORD_PLANS: &[KeywordPlan] = &[
    KeywordPlan {
        triggers: &["travel", "trip", "旅行"],
        subtasks: &[
            "decide on a destination",
            "set a budget",
            "book accommodation",
            "arrange transportation",
            "make a packing list",
        ],
    },
    KeywordPlan {
        triggers: &["shopping", "買い物"],
        subtasks: &[
            "list what you need",
            "check the budget",
            "choose a store",
            "make the purchase",
            "keep the receipt",
        ],
    },
    KeywordPlan {
        triggers: &["study", "勉強"],
        subtasks: &[
            "set a learning goal",
            "prepare materials",
            "create a study schedule",
            "study",
            "review and self-test",
        ],
    },
    KeywordPlan {
        triggers: &["project", "プロジェクト"],
        subtasks: &[
            "organize requirements",
            "break down the work",
            "create a schedule",
            "implement",
            "review and test",
        ],
    },
    KeywordPlan {
        triggers: &["cooking", "料理"],
        subtasks: &[
            "choose a recipe",
            "list ingredients",
            "buy ingredients",
            "prep",
            "cook and serve",
        ],
    },
];

/// Local breakdown that answers after a fixed delay.
#[derive(Debug, Clone)]
pub struct KeywordBreakdownGateway {
    delay: Duration,
}

impl KeywordBreakdownGateway {
    /// Create a gateway with the default one second delay.
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(1000))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Compute the plan for a title without waiting.
    pub fn plan_for(title: &str) -> Vec<String> {
        let lowered = title.to_lowercase();
        let matched = KEYWORD_PLANS.iter().find(|plan| {
            plan.triggers
                .iter()
                .any(|trigger| lowered.contains(&trigger.to_lowercase()))
        });

        match matched {
            Some(plan) => plan.subtasks.iter().map(|s| s.to_string()).collect(),
            None => vec![
                format!("plan {}", title),
                "identify resources".to_string(),
                format!("execute {}", title),
                "verify result".to_string(),
            ],
        }
    }
}

impl Default for KeywordBreakdownGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BreakdownGateway for KeywordBreakdownGateway {
    async fn breakdown(&self, title: &str) -> Result<Vec<String>, BreakdownError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BreakdownError::invalid_input("Task title cannot be empty"));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::plan_for(title))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
