// SPDX-License-Identifier: MIT

//! Scheduled job routes, invoked by Cloud Scheduler.
//!
//! These endpoints are called by the scheduler, not directly by users.
//! A 500 response triggers the scheduler's retry; partial progress is fine
//! because every write is idempotent by key.

use crate::config;
use crate::services::checklists;
use crate::services::poller::AlertPoller;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Scheduled job routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs/poll-alerts", post(poll_alerts))
        .route("/jobs/reset-checklists", post(reset_checklists))
}

/// Verify that a request came from the expected scheduler job.
///
/// Cloud Run strips this header from external requests, so its presence
/// guarantees internal origin; the value pins the specific job.
fn is_scheduled_by(headers: &HeaderMap, job_name: &str) -> bool {
    headers
        .get("x-cloudscheduler-jobname")
        .and_then(|h| h.to_str().ok())
        .map(|name| name == job_name)
        .unwrap_or(false)
}

/// Run one feed poll cycle.
async fn poll_alerts(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !is_scheduled_by(&headers, config::POLL_JOB_NAME) {
        tracing::warn!("Blocked unauthorized access to poll_alerts");
        return StatusCode::FORBIDDEN.into_response();
    }

    let poller = AlertPoller::new(
        state.store.clone(),
        state.feed.clone(),
        state.push.clone(),
    );

    match poller.run().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            // Fetch and commit failures abort the cycle; the next scheduled
            // run retries.
            tracing::error!(error = %e, "Poll cycle failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run the monthly recurring-checklist reset sweep.
async fn reset_checklists(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !is_scheduled_by(&headers, config::RESET_JOB_NAME) {
        tracing::warn!("Blocked unauthorized access to reset_checklists");
        return StatusCode::FORBIDDEN.into_response();
    }

    let today = chrono::Utc::now().date_naive();
    match checklists::reset_recurring_checklists(state.store.as_ref(), today).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Checklist reset sweep failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
