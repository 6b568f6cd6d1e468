// SPDX-License-Identifier: MIT

//! Per-user notification record.

use crate::models::alert::AlertSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery receipt of one alert to one user, stored under
/// `users/{user_id}/notifications/{event_id}-{episode_id}-{user_id}`.
///
/// At most one record exists per (event, episode, user); the writer checks
/// existence before staging a new one. The app mutates `is_read` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNotification {
    pub title: String,
    pub description: String,
    pub is_read: bool,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub data: AlertSummary,
}

impl UserNotification {
    /// Document id for an (alert, user) pair:
    /// `"{event_id}-{episode_id}-{user_id}"`.
    pub fn doc_id(event_id: i64, episode_id: i64, user_id: &str) -> String {
        format!("{}-{}-{}", event_id, episode_id, user_id)
    }
}
