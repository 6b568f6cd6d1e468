// SPDX-License-Identifier: MIT

//! Poll orchestrator.
//!
//! Scheduled entry point of the pipeline: fetch the feed once, run each
//! feature through normalize → resolve → dispatch → prepare-notification,
//! then batch-commit everything staged. Invocations are at-least-once, so
//! every step is idempotent by key: a retried or truncated cycle re-skips
//! what a previous cycle already persisted and picks up the rest.

use crate::db::{StagedAlert, Store};
use crate::error::AppError;
use crate::models::GdacsFeed;
use crate::services::alerts::{self, AlertOutcome};
use crate::services::feed::GdacsClient;
use crate::services::notifications::{self, NotificationOutcome};
use crate::services::push::{self, PushSender};
use crate::services::users;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Counts emitted at the end of a poll cycle.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CycleSummary {
    /// Features in the fetched feed
    pub fetched: usize,
    /// Newly persisted alert records
    pub new_alerts: usize,
    /// Features whose key already existed
    pub skipped_alerts: usize,
    /// Features dropped for per-event errors (malformed data, failed fan-out)
    pub failed_events: usize,
    /// Notification records staged and committed this cycle
    pub notifications_written: usize,
}

/// Drives one poll cycle end to end.
pub struct AlertPoller {
    store: Arc<dyn Store>,
    feed: GdacsClient,
    push: Arc<dyn PushSender>,
}

impl AlertPoller {
    pub fn new(store: Arc<dyn Store>, feed: GdacsClient, push: Arc<dyn PushSender>) -> Self {
        Self { store, feed, push }
    }

    /// Run one cycle: fetch the feed and process it.
    ///
    /// A fetch failure aborts the whole cycle with no partial work; the
    /// next scheduled run is the retry.
    pub async fn run(&self) -> Result<CycleSummary, AppError> {
        let feed = self.feed.fetch_latest().await?;
        tracing::info!(count = feed.features.len(), "Fetched hazard alerts");
        self.process_feed(feed).await
    }

    /// Process an already-fetched feed.
    ///
    /// Events are independent; an error in one is logged and the loop
    /// continues. The staged alert batch commits once at the end, and only
    /// when at least one record was staged.
    pub async fn process_feed(&self, feed: GdacsFeed) -> Result<CycleSummary, AppError> {
        let mut summary = CycleSummary {
            fetched: feed.features.len(),
            ..CycleSummary::default()
        };
        let mut staged_alerts: Vec<StagedAlert> = Vec::new();

        for value in &feed.features {
            match self.process_feature(value).await {
                Ok(FeatureOutcome::New {
                    alert,
                    notifications_written,
                }) => {
                    summary.new_alerts += 1;
                    summary.notifications_written += notifications_written;
                    staged_alerts.push(alert);
                }
                Ok(FeatureOutcome::Skipped) => summary.skipped_alerts += 1,
                Err(e) => {
                    summary.failed_events += 1;
                    tracing::warn!(error = %e, "Event processing failed, continuing cycle");
                }
            }
        }

        // Only commit if there are actual changes to make
        if !staged_alerts.is_empty() {
            self.store.commit_alerts(&staged_alerts).await?;
        }

        tracing::info!(
            new = summary.new_alerts,
            skipped = summary.skipped_alerts,
            failed = summary.failed_events,
            notifications = summary.notifications_written,
            "Alert processing summary"
        );

        Ok(summary)
    }

    /// Normalize one feature and, if new, fan it out.
    async fn process_feature(
        &self,
        value: &serde_json::Value,
    ) -> Result<FeatureOutcome, AppError> {
        let feature = alerts::parse_feature(value)?;
        let now = Utc::now();

        let staged = match alerts::check_and_prepare_alert(self.store.as_ref(), feature, now)
            .await?
        {
            AlertOutcome::New(staged) => staged,
            AlertOutcome::Skipped { doc_id } => {
                tracing::debug!(alert_id = %doc_id, "Alert already stored, skipping");
                return Ok(FeatureOutcome::Skipped);
            }
        };

        let codes = alerts::extract_affected_country_codes(&staged.record);
        let affected_users = users::resolve_affected_users(self.store.as_ref(), &codes).await?;
        tracing::info!(
            alert_id = %staged.doc_id,
            users = affected_users.len(),
            "Alert affects users"
        );

        let tokens = users::collect_push_tokens(self.store.as_ref(), &affected_users).await?;
        if !tokens.is_empty() {
            push::dispatch(self.push.as_ref(), &tokens, &staged.record).await;
        }

        let mut staged_notifications = Vec::new();
        for user_id in &affected_users {
            match notifications::prepare_user_notification(
                self.store.as_ref(),
                &staged.record,
                user_id,
                now,
            )
            .await?
            {
                NotificationOutcome::Save(notification) => staged_notifications.push(notification),
                NotificationOutcome::Skipped => {}
            }
        }

        let notifications_written = staged_notifications.len();
        if !staged_notifications.is_empty() {
            self.store.commit_notifications(&staged_notifications).await?;
        }

        Ok(FeatureOutcome::New {
            alert: staged,
            notifications_written,
        })
    }
}

enum FeatureOutcome {
    New {
        alert: StagedAlert,
        notifications_written: usize,
    },
    Skipped,
}
