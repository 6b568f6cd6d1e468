// SPDX-License-Identifier: MIT

//! In-memory [`Store`] for tests and offline development.
//!
//! Mimics the backend's observable behavior: bounded membership queries,
//! last-write-wins batch commits, per-key document addressing. Query counts
//! are recorded so tests can assert how many membership queries a resolver
//! run issued.

use crate::db::{StagedAlert, StagedNotification, Store, MEMBERSHIP_QUERY_LIMIT};
use crate::error::AppError;
use crate::models::{AlertRecord, Checklist, ChecklistProgress, UserNotification, UserProfile};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    alerts: BTreeMap<String, AlertRecord>,
    users: BTreeMap<String, UserProfile>,
    /// Keyed by (user_id, notification doc id)
    notifications: BTreeMap<(String, String), UserNotification>,
    checklists: BTreeMap<String, Checklist>,
    /// Keyed by (user_id, checklist_id)
    progress: BTreeMap<(String, String), ChecklistProgress>,
}

/// In-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    membership_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Seeding helpers ─────────────────────────────────────────

    pub fn insert_user(&self, user: UserProfile) {
        let mut inner = self.inner.lock().unwrap();
        inner.users.insert(user.user_id.clone(), user);
    }

    pub fn insert_alert(&self, alert: AlertRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner.alerts.insert(alert.doc_id(), alert);
    }

    pub fn insert_checklist(&self, checklist_id: &str, checklist: Checklist) {
        let mut inner = self.inner.lock().unwrap();
        inner.checklists.insert(checklist_id.to_string(), checklist);
    }

    pub fn insert_progress(&self, user_id: &str, progress: ChecklistProgress) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .progress
            .insert((user_id.to_string(), progress.checklist_id.clone()), progress);
    }

    // ─── Inspection helpers ──────────────────────────────────────

    pub fn alert_count(&self) -> usize {
        self.inner.lock().unwrap().alerts.len()
    }

    pub fn notification_count(&self) -> usize {
        self.inner.lock().unwrap().notifications.len()
    }

    pub fn notification(&self, user_id: &str, doc_id: &str) -> Option<UserNotification> {
        self.inner
            .lock()
            .unwrap()
            .notifications
            .get(&(user_id.to_string(), doc_id.to_string()))
            .cloned()
    }

    pub fn progress(&self, user_id: &str, checklist_id: &str) -> Option<ChecklistProgress> {
        self.inner
            .lock()
            .unwrap()
            .progress
            .get(&(user_id.to_string(), checklist_id.to_string()))
            .cloned()
    }

    /// Number of membership queries issued so far.
    pub fn membership_query_count(&self) -> usize {
        self.membership_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_alert(&self, doc_id: &str) -> Result<Option<AlertRecord>, AppError> {
        Ok(self.inner.lock().unwrap().alerts.get(doc_id).cloned())
    }

    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, AppError> {
        Ok(self.inner.lock().unwrap().alerts.values().cloned().collect())
    }

    async fn commit_alerts(&self, staged: &[StagedAlert]) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        for alert in staged {
            inner
                .alerts
                .insert(alert.doc_id.clone(), alert.record.clone());
        }
        Ok(())
    }

    async fn find_user_ids_by_country(&self, codes: &[String]) -> Result<Vec<String>, AppError> {
        self.membership_queries.fetch_add(1, Ordering::SeqCst);
        if codes.len() > MEMBERSHIP_QUERY_LIMIT {
            return Err(AppError::Database(format!(
                "Membership query over limit: {} codes",
                codes.len()
            )));
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .filter(|u| {
                u.country_code()
                    .map(|code| codes.contains(&code))
                    .unwrap_or(false)
            })
            .map(|u| u.user_id.clone())
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.inner.lock().unwrap().users.get(user_id).cloned())
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, AppError> {
        Ok(self.inner.lock().unwrap().users.keys().cloned().collect())
    }

    async fn get_notification(
        &self,
        user_id: &str,
        doc_id: &str,
    ) -> Result<Option<UserNotification>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .notifications
            .get(&(user_id.to_string(), doc_id.to_string()))
            .cloned())
    }

    async fn commit_notifications(&self, staged: &[StagedNotification]) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        for notification in staged {
            inner.notifications.insert(
                (notification.user_id.clone(), notification.doc_id.clone()),
                notification.record.clone(),
            );
        }
        Ok(())
    }

    async fn get_checklist(&self, checklist_id: &str) -> Result<Option<Checklist>, AppError> {
        Ok(self.inner.lock().unwrap().checklists.get(checklist_id).cloned())
    }

    async fn list_checklist_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChecklistProgress>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .progress
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn set_checked_items(
        &self,
        user_id: &str,
        checklist_id: &str,
        checked_items: &[bool],
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let progress = inner
            .progress
            .get_mut(&(user_id.to_string(), checklist_id.to_string()))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "checklist progress {}/{}",
                    user_id, checklist_id
                ))
            })?;
        progress.checked_items = checked_items.to_vec();
        Ok(())
    }
}
