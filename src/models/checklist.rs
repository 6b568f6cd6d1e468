// SPDX-License-Identifier: MIT

//! Checklist metadata and per-user progress models for the recurring reset
//! sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Checklist definition (shared content, not per-user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChecklistKind,
    /// Present only for recurring checklists
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChecklistKind {
    OneTime,
    Recurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Weekly,
}

/// Per-user, per-checklist completion state, stored under
/// `users/{user_id}/checklist_progress/{checklist_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub checklist_id: String,
    /// One flag per checklist item, in item order
    pub checked_items: Vec<bool>,
    /// Period tokens in which every item was checked
    /// (e.g. "month-2025-08", "week-2025-W31", "one-time")
    #[serde(default)]
    pub completed_periods: Vec<String>,
    /// First time the user completed the whole checklist
    pub first_completion_date: Option<DateTime<Utc>>,
    /// Fully-completed flag for one-time checklists
    #[serde(default)]
    pub is_completed: bool,
}

impl ChecklistProgress {
    /// Whether the given period token is already recorded as completed.
    pub fn completed_in(&self, period_token: &str) -> bool {
        self.completed_periods.iter().any(|p| p == period_token)
    }
}
