// SPDX-License-Identifier: MIT

//! Database layer.
//!
//! The document store is an injected collaborator: every service takes a
//! [`Store`] rather than a concrete client, so tests substitute the
//! in-memory [`MemoryStore`] for the production [`FirestoreStore`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{AlertRecord, Checklist, ChecklistProgress, UserNotification, UserProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const DISASTERS: &str = "disasters";
    pub const USERS: &str = "users";
    pub const CHECKLISTS: &str = "checklists";
    /// Sub-collection of `users`
    pub const NOTIFICATIONS: &str = "notifications";
    /// Sub-collection of `users`
    pub const CHECKLIST_PROGRESS: &str = "checklist_progress";
}

/// Upper bound on values per equality-membership ("in") query.
pub const MEMBERSHIP_QUERY_LIMIT: usize = 10;

/// An alert record staged for the cycle's atomic batch commit.
#[derive(Debug, Clone)]
pub struct StagedAlert {
    pub doc_id: String,
    pub record: AlertRecord,
}

/// A notification record staged for a per-alert atomic batch commit.
#[derive(Debug, Clone)]
pub struct StagedNotification {
    pub user_id: String,
    pub doc_id: String,
    pub record: UserNotification,
}

/// Document store operations used by the alert pipeline and the checklist
/// reset sweep.
///
/// Reads are single-document gets or bounded queries; writes are either
/// single-document updates or atomic batch commits of staged records.
/// Idempotency is key-based: callers check existence before staging, and
/// re-committing an identical staged record is harmless.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Alerts ──────────────────────────────────────────────────

    /// Get an alert by its `"{event_id}-{episode_id}"` document id.
    async fn get_alert(&self, doc_id: &str) -> Result<Option<AlertRecord>, AppError>;

    /// All persisted alerts (the reactor filters them in memory).
    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, AppError>;

    /// Atomically commit staged alert records. Callers skip the call when
    /// nothing is staged.
    async fn commit_alerts(&self, staged: &[StagedAlert]) -> Result<(), AppError>;

    // ─── Users ───────────────────────────────────────────────────

    /// Ids of users whose stored country code is one of `codes`.
    ///
    /// Issues a single membership query; `codes` must respect
    /// [`MEMBERSHIP_QUERY_LIMIT`]. Chunking across the limit is the
    /// resolver's job.
    async fn find_user_ids_by_country(&self, codes: &[String]) -> Result<Vec<String>, AppError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    /// All user ids (reset sweep).
    async fn list_user_ids(&self) -> Result<Vec<String>, AppError>;

    // ─── Notifications ───────────────────────────────────────────

    /// Get a user's notification by its
    /// `"{event_id}-{episode_id}-{user_id}"` document id.
    async fn get_notification(
        &self,
        user_id: &str,
        doc_id: &str,
    ) -> Result<Option<UserNotification>, AppError>;

    /// Atomically commit staged notification records.
    async fn commit_notifications(&self, staged: &[StagedNotification]) -> Result<(), AppError>;

    // ─── Checklists ──────────────────────────────────────────────

    async fn get_checklist(&self, checklist_id: &str) -> Result<Option<Checklist>, AppError>;

    /// All checklist progress records for one user.
    async fn list_checklist_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChecklistProgress>, AppError>;

    /// Overwrite the `checked_items` array of one progress record.
    async fn set_checked_items(
        &self,
        user_id: &str,
        checklist_id: &str,
        checked_items: &[bool],
    ) -> Result<(), AppError>;
}
