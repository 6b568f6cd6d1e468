// SPDX-License-Identifier: MIT

//! Firestore-backed [`Store`] implementation.
//!
//! Collections:
//! - `disasters` (canonical alert records, keyed `{event_id}-{episode_id}`)
//! - `users` (profiles, with `notifications` and `checklist_progress`
//!   sub-collections)
//! - `checklists` (shared checklist definitions)

use crate::db::{collections, StagedAlert, StagedNotification, Store, MEMBERSHIP_QUERY_LIMIT};
use crate::error::AppError;
use crate::models::{AlertRecord, Checklist, ChecklistProgress, UserNotification, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    fn user_path(&self, user_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Partial update payload for checklist progress resets.
#[derive(Serialize, Deserialize)]
struct CheckedItemsUpdate {
    checked_items: Vec<bool>,
}

#[async_trait]
impl Store for FirestoreStore {
    // ─── Alerts ──────────────────────────────────────────────────

    async fn get_alert(&self, doc_id: &str) -> Result<Option<AlertRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::DISASTERS)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::DISASTERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn commit_alerts(&self, staged: &[StagedAlert]) -> Result<(), AppError> {
        for chunk in staged.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for alert in chunk {
                self.client
                    .fluent()
                    .update()
                    .in_col(collections::DISASTERS)
                    .document_id(&alert.doc_id)
                    .object(&alert.record)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add alert to transaction: {}", e))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Alert batch commit failed: {}", e)))?;
        }

        Ok(())
    }

    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_ids_by_country(&self, codes: &[String]) -> Result<Vec<String>, AppError> {
        if codes.len() > MEMBERSHIP_QUERY_LIMIT {
            return Err(AppError::Database(format!(
                "Membership query over limit: {} codes",
                codes.len()
            )));
        }

        let codes = codes.to_vec();
        let users: Vec<UserProfile> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                q.for_all([q.field("location.country_code").is_in(codes.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().map(|u| u.user_id).collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, AppError> {
        let users: Vec<UserProfile> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().map(|u| u.user_id).collect())
    }

    // ─── Notifications ───────────────────────────────────────────

    async fn get_notification(
        &self,
        user_id: &str,
        doc_id: &str,
    ) -> Result<Option<UserNotification>, AppError> {
        let parent = self.user_path(user_id)?;
        self.client
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .parent(&parent)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn commit_notifications(&self, staged: &[StagedNotification]) -> Result<(), AppError> {
        for chunk in staged.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for notification in chunk {
                let parent = self.user_path(&notification.user_id)?;
                self.client
                    .fluent()
                    .update()
                    .in_col(collections::NOTIFICATIONS)
                    .document_id(&notification.doc_id)
                    .parent(&parent)
                    .object(&notification.record)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add notification to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Notification batch commit failed: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── Checklists ──────────────────────────────────────────────

    async fn get_checklist(&self, checklist_id: &str) -> Result<Option<Checklist>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::CHECKLISTS)
            .obj()
            .one(checklist_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_checklist_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChecklistProgress>, AppError> {
        let parent = self.user_path(user_id)?;
        self.client
            .fluent()
            .select()
            .from(collections::CHECKLIST_PROGRESS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_checked_items(
        &self,
        user_id: &str,
        checklist_id: &str,
        checked_items: &[bool],
    ) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        let update = CheckedItemsUpdate {
            checked_items: checked_items.to_vec(),
        };

        // Only the checked_items field is rewritten; completed periods and
        // completion timestamps stay untouched.
        let _: () = self
            .client
            .fluent()
            .update()
            .fields(firestore::paths!(CheckedItemsUpdate::{checked_items}))
            .in_col(collections::CHECKLIST_PROGRESS)
            .document_id(checklist_id)
            .parent(&parent)
            .object(&update)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
