// SPDX-License-Identifier: MIT

//! Shared helpers for integration tests: an in-memory store is seeded per
//! test, and pushes go to a recording double instead of the network.

use chrono::{NaiveDate, TimeZone, Utc};
use hazard_relay::db::{MemoryStore, StagedAlert, StagedNotification, Store};
use hazard_relay::error::AppError;
use hazard_relay::models::{
    AffectedCountry, AlertRecord, Checklist, ChecklistProgress, GdacsFeed, SeverityData,
    UserLocation, UserNotification, UserProfile,
};
use hazard_relay::services::push::PushMessage;
use hazard_relay::services::{GdacsClient, PushSender};
use std::sync::Arc;
use std::sync::Mutex;

/// Push double that records every batch it is handed.
#[derive(Default)]
pub struct RecordingPush {
    batches: Mutex<Vec<Vec<PushMessage>>>,
}

#[async_trait::async_trait]
impl PushSender for RecordingPush {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError> {
        self.batches.lock().unwrap().push(messages.to_vec());
        Ok(())
    }
}

impl RecordingPush {
    #[allow(dead_code)]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(|b| b.len()).collect()
    }

    #[allow(dead_code)]
    pub fn messages(&self) -> Vec<PushMessage> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

/// Push double that fails every batch.
#[derive(Default)]
pub struct FailingPush;

#[async_trait::async_trait]
impl PushSender for FailingPush {
    async fn send_batch(&self, _messages: &[PushMessage]) -> Result<(), AppError> {
        Err(AppError::Push("gateway unreachable".to_string()))
    }
}

/// Store wrapper that fails selected operations while delegating the rest,
/// so error-isolation paths can be driven deterministically.
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    failing_country_codes: Vec<String>,
    failing_reset_ids: Vec<String>,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failing_country_codes: Vec::new(),
            failing_reset_ids: Vec::new(),
        }
    }

    /// Fail any membership query whose code set contains `code`.
    pub fn fail_country_query(mut self, code: &str) -> Self {
        self.failing_country_codes.push(code.to_uppercase());
        self
    }

    /// Fail `set_checked_items` for the given checklist id.
    pub fn fail_reset(mut self, checklist_id: &str) -> Self {
        self.failing_reset_ids.push(checklist_id.to_string());
        self
    }
}

#[async_trait::async_trait]
impl Store for FaultyStore {
    async fn get_alert(&self, doc_id: &str) -> Result<Option<AlertRecord>, AppError> {
        self.inner.get_alert(doc_id).await
    }

    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, AppError> {
        self.inner.list_alerts().await
    }

    async fn commit_alerts(&self, staged: &[StagedAlert]) -> Result<(), AppError> {
        self.inner.commit_alerts(staged).await
    }

    async fn find_user_ids_by_country(&self, codes: &[String]) -> Result<Vec<String>, AppError> {
        if codes.iter().any(|c| self.failing_country_codes.contains(c)) {
            return Err(AppError::Database("query backend unavailable".to_string()));
        }
        self.inner.find_user_ids_by_country(codes).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.inner.get_user(user_id).await
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, AppError> {
        self.inner.list_user_ids().await
    }

    async fn get_notification(
        &self,
        user_id: &str,
        doc_id: &str,
    ) -> Result<Option<UserNotification>, AppError> {
        self.inner.get_notification(user_id, doc_id).await
    }

    async fn commit_notifications(&self, staged: &[StagedNotification]) -> Result<(), AppError> {
        self.inner.commit_notifications(staged).await
    }

    async fn get_checklist(&self, checklist_id: &str) -> Result<Option<Checklist>, AppError> {
        self.inner.get_checklist(checklist_id).await
    }

    async fn list_checklist_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChecklistProgress>, AppError> {
        self.inner.list_checklist_progress(user_id).await
    }

    async fn set_checked_items(
        &self,
        user_id: &str,
        checklist_id: &str,
        checked_items: &[bool],
    ) -> Result<(), AppError> {
        if self.failing_reset_ids.iter().any(|id| id == checklist_id) {
            return Err(AppError::Database("write rejected".to_string()));
        }
        self.inner
            .set_checked_items(user_id, checklist_id, checked_items)
            .await
    }
}

/// Feed client pointed at nothing; tests drive `process_feed` directly.
#[allow(dead_code)]
pub fn offline_feed() -> GdacsClient {
    GdacsClient::new("http://localhost:0/unused".to_string())
}

/// A raw feed feature with the given identity and affected countries.
#[allow(dead_code)]
pub fn feature(event_id: i64, episode_id: i64, iso2: &[&str]) -> serde_json::Value {
    let countries: Vec<serde_json::Value> = iso2
        .iter()
        .map(|code| serde_json::json!({ "iso2": code, "countryname": "Testland" }))
        .collect();

    serde_json::json!({
        "type": "Feature",
        "bbox": [120.0, 10.0, 125.0, 15.0],
        "geometry": { "type": "Point", "coordinates": [122.5, 12.5] },
        "properties": {
            "eventid": event_id,
            "episodeid": episode_id,
            "eventtype": "EQ",
            "name": "Test event",
            "description": "Test description",
            "htmldescription": "<b>Test</b> description",
            "alertlevel": "Orange",
            "alertscore": 2.0,
            "fromdate": "2025-08-10T00:00:00",
            "todate": "2025-08-20T00:00:00",
            "datemodified": "2025-08-10T06:00:00",
            "affectedcountries": countries,
            "severitydata": {
                "severity": 6.0,
                "severitytext": "Magnitude 6.0M",
                "severityunit": "M"
            },
            "url": { "report": "https://example.org/report" }
        }
    })
}

#[allow(dead_code)]
pub fn feed_of(features: Vec<serde_json::Value>) -> GdacsFeed {
    GdacsFeed { features }
}

/// A user profile with a country code and optional push token.
#[allow(dead_code)]
pub fn user(user_id: &str, country_code: &str, push_token: Option<&str>) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        location: Some(UserLocation {
            country_code: Some(country_code.to_string()),
            latitude: 14.6,
            longitude: 121.0,
        }),
        push_token: push_token.map(|t| t.to_string()),
    }
}

/// A stored alert record with the given identity, country, and validity
/// window (day granularity).
#[allow(dead_code)]
pub fn stored_alert(
    event_id: i64,
    episode_id: i64,
    iso2: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> AlertRecord {
    AlertRecord {
        event_id,
        episode_id,
        event_type: "TC".to_string(),
        name: "Stored event".to_string(),
        description: "Stored description".to_string(),
        html_description: "<b>Stored</b> description".to_string(),
        icon: None,
        alert_level: "Red".to_string(),
        alert_score: 3.0,
        geometry: None,
        bbox: vec![],
        affected_countries: vec![AffectedCountry {
            iso2: iso2.to_string(),
            country_name: "Testland".to_string(),
        }],
        from_date: Utc.from_utc_datetime(&from.and_hms_opt(0, 0, 0).unwrap()),
        to_date: Utc.from_utc_datetime(&to.and_hms_opt(12, 0, 0).unwrap()),
        date_modified: Utc::now(),
        severity: SeverityData::default(),
        report_url: None,
        source: "GDACS".to_string(),
        last_updated: Utc::now(),
    }
}

#[allow(dead_code)]
pub fn store_with_users(users: Vec<UserProfile>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for u in users {
        store.insert_user(u);
    }
    store
}

/// Create a test app over an in-memory store and a recording push double.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryStore>, Arc<RecordingPush>) {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(RecordingPush::default());

    let state = Arc::new(hazard_relay::AppState {
        config: hazard_relay::config::Config::default(),
        store: store.clone(),
        feed: offline_feed(),
        push: push.clone(),
    });

    (hazard_relay::routes::create_router(state), store, push)
}
