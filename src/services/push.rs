// SPDX-License-Identifier: MIT

//! Push delivery via the Expo push gateway.
//!
//! Delivery is best-effort and fire-and-forget: a failed batch is logged
//! and the remaining batches still go out. There is no retry; the persisted
//! notification record is the source of truth, not the push.

use crate::error::AppError;
use crate::models::{AlertRecord, AlertSummary};
use async_trait::async_trait;
use serde::Serialize;

/// Max messages per request accepted by the push gateway.
pub const PUSH_BATCH_SIZE: usize = 100;

/// One message in the gateway's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub sound: String,
    pub priority: String,
    pub title: String,
    pub body: String,
    pub data: AlertSummary,
}

/// Push gateway boundary.
///
/// A trait so tests can record batches instead of hitting the network;
/// the production impl is [`ExpoPushClient`].
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver one batch (at most [`PUSH_BATCH_SIZE`] messages).
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError>;
}

/// HTTP client for the Expo push endpoint.
#[derive(Clone)]
pub struct ExpoPushClient {
    http: reqwest::Client,
    push_url: String,
}

impl ExpoPushClient {
    pub fn new(push_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            push_url,
        }
    }
}

#[async_trait]
impl PushSender for ExpoPushClient {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError> {
        let response = self
            .http
            .post(&self.push_url)
            .json(messages)
            .send()
            .await
            .map_err(|e| AppError::Push(format!("Push request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Push(format!("HTTP {}: {}", status, body)));
        }

        // The gateway returns per-token receipts; log them, don't validate.
        let receipts: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Push(format!("Invalid push receipt: {}", e)))?;

        tracing::info!(
            batch_size = messages.len(),
            receipts = %receipts,
            "Push batch accepted"
        );

        Ok(())
    }
}

/// Build the wire messages for one alert.
pub fn build_push_messages(tokens: &[String], alert: &AlertRecord) -> Vec<PushMessage> {
    tokens
        .iter()
        .map(|token| PushMessage {
            to: token.clone(),
            sound: "default".to_string(),
            priority: "high".to_string(),
            title: format!("⚠️ {} Alert", alert.alert_level),
            body: alert.html_description.clone(),
            data: AlertSummary::from(alert),
        })
        .collect()
}

/// Dispatch an alert to a list of push tokens, batching per the gateway's
/// accepted request size.
///
/// Empty token lists are a no-op. Batch failures are logged and do not
/// abort delivery of subsequent batches or the surrounding loop.
pub async fn dispatch(push: &dyn PushSender, tokens: &[String], alert: &AlertRecord) {
    for chunk in tokens.chunks(PUSH_BATCH_SIZE) {
        let messages = build_push_messages(chunk, alert);
        if let Err(e) = push.send_batch(&messages).await {
            tracing::warn!(
                alert_id = %alert.doc_id(),
                batch_size = chunk.len(),
                error = %e,
                "Push batch failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AffectedCountry, SeverityData};
    use chrono::Utc;

    fn alert() -> AlertRecord {
        AlertRecord {
            event_id: 100,
            episode_id: 1,
            event_type: "TC".to_string(),
            name: "Typhoon".to_string(),
            description: "Typhoon approaching".to_string(),
            html_description: "<b>Typhoon</b> approaching".to_string(),
            icon: None,
            alert_level: "Red".to_string(),
            alert_score: 3.0,
            geometry: None,
            bbox: vec![],
            affected_countries: vec![AffectedCountry {
                iso2: "PH".to_string(),
                country_name: "Philippines".to_string(),
            }],
            from_date: Utc::now(),
            to_date: Utc::now(),
            date_modified: Utc::now(),
            severity: SeverityData {
                severity: 3.0,
                severity_text: "Category 4".to_string(),
                severity_unit: String::new(),
            },
            report_url: Some("https://gdacs.org/report/100".to_string()),
            source: "GDACS".to_string(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn message_carries_alert_payload() {
        let tokens = vec!["ExponentPushToken[abc]".to_string()];
        let messages = build_push_messages(&tokens, &alert());

        assert_eq!(messages.len(), 1);
        let m = &messages[0];
        assert_eq!(m.to, "ExponentPushToken[abc]");
        assert_eq!(m.title, "⚠️ Red Alert");
        assert_eq!(m.body, "<b>Typhoon</b> approaching");
        assert_eq!(m.sound, "default");
        assert_eq!(m.priority, "high");
        assert_eq!(m.data.event_id, 100);
        assert_eq!(m.data.severity, "Category 4");
    }

    #[test]
    fn batching_respects_gateway_limit() {
        let tokens: Vec<String> = (0..250).map(|i| format!("token-{}", i)).collect();
        let batches: Vec<usize> = tokens
            .chunks(PUSH_BATCH_SIZE)
            .map(|chunk| chunk.len())
            .collect();
        assert_eq!(batches, vec![100, 100, 50]);
    }
}
