// SPDX-License-Identifier: MIT

//! Per-user notification writing and the location-change reactor.
//!
//! The writer is idempotent: at most one record ever exists per
//! (event, episode, user) key, whichever trigger fires first (the poll
//! cycle, a retried scheduled run, or the location reactor).

use crate::db::{StagedNotification, Store};
use crate::error::AppError;
use crate::models::{AlertRecord, AlertSummary, UserNotification};
use crate::services::push::{self, PushSender};
use chrono::{DateTime, NaiveDate, Utc};

/// Outcome of preparing one (alert, user) notification.
#[derive(Debug)]
pub enum NotificationOutcome {
    /// No record existed; this one is ready for the batch commit.
    Save(StagedNotification),
    /// The user was already notified of this alert.
    Skipped,
}

/// Build the notification record for one alert.
pub fn build_notification(alert: &AlertRecord, now: DateTime<Utc>) -> UserNotification {
    UserNotification {
        title: format!("{} Alert", alert.alert_level),
        description: alert.html_description.clone(),
        is_read: false,
        icon: alert.icon.clone(),
        created_at: now,
        data: AlertSummary::from(alert),
    }
}

/// Check for an existing record and prepare a new one if absent.
///
/// Persistence stays with the caller so many users' notifications for one
/// alert commit in a single batch.
pub async fn prepare_user_notification(
    store: &dyn Store,
    alert: &AlertRecord,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<NotificationOutcome, AppError> {
    let doc_id = UserNotification::doc_id(alert.event_id, alert.episode_id, user_id);

    if store.get_notification(user_id, &doc_id).await?.is_some() {
        return Ok(NotificationOutcome::Skipped);
    }

    Ok(NotificationOutcome::Save(StagedNotification {
        user_id: user_id.to_string(),
        doc_id,
        record: build_notification(alert, now),
    }))
}

/// Notify one user of all ongoing disasters affecting their new country.
///
/// Runs when a user's stored country code changes value. Scoped to that
/// single user: already-notified alerts are skipped by the writer, pushes
/// go out per alert when the user has a token, and all staged records
/// commit in one batch. Returns the number of records written.
pub async fn notify_user_of_ongoing_disasters(
    store: &dyn Store,
    push: &dyn PushSender,
    user_id: &str,
    country_code: &str,
    today: NaiveDate,
) -> Result<usize, AppError> {
    let relevant: Vec<AlertRecord> = store
        .list_alerts()
        .await?
        .into_iter()
        .filter(|alert| alert.is_ongoing_on(today) && alert.affects_country(country_code))
        .collect();

    if relevant.is_empty() {
        tracing::info!(user_id, country_code, "No relevant ongoing disasters");
        return Ok(0);
    }

    tracing::info!(
        user_id,
        country_code,
        count = relevant.len(),
        "Found relevant ongoing disasters"
    );

    let token = store
        .get_user(user_id)
        .await?
        .and_then(|profile| profile.push_token);

    let mut staged = Vec::new();
    let now = Utc::now();

    for alert in &relevant {
        match prepare_user_notification(store, alert, user_id, now).await? {
            NotificationOutcome::Save(notification) => staged.push(notification),
            NotificationOutcome::Skipped => {
                tracing::debug!(
                    user_id,
                    alert_id = %alert.doc_id(),
                    "Already notified (idempotent skip)"
                );
                continue;
            }
        }

        if let Some(token) = &token {
            push::dispatch(push, std::slice::from_ref(token), alert).await;
        }
    }

    let written = staged.len();
    if !staged.is_empty() {
        store.commit_notifications(&staged).await?;
    }

    tracing::info!(user_id, written, "Location-change notifications committed");
    Ok(written)
}
