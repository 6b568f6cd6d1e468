// SPDX-License-Identifier: MIT

//! Change-data-capture hook routes.
//!
//! Fired by the document-update trigger on a user profile. The platform
//! serializes invocations per document, so two hooks never race on the
//! same user's change stream.

use crate::models::UserLocation;
use crate::services::notifications;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/hooks/user-location", post(user_location_changed))
}

/// Before/after snapshot of a user's stored location.
#[derive(Debug, Deserialize)]
pub struct UserLocationChange {
    pub user_id: String,
    pub before: Option<UserLocation>,
    pub after: Option<UserLocation>,
}

#[derive(Serialize)]
struct HookResult {
    notified: usize,
}

/// Re-notify a user whose country code changed.
///
/// No-ops unless the code actually changed value and the new one is
/// present; the reactor itself skips alerts the user already knows about.
async fn user_location_changed(
    State(state): State<Arc<AppState>>,
    Json(change): Json<UserLocationChange>,
) -> Response {
    // Compare normalized codes so a pure case change is not a real change
    let old_code = change
        .before
        .as_ref()
        .and_then(|l| l.country_code.as_deref())
        .map(str::to_uppercase);
    let new_code = change
        .after
        .as_ref()
        .and_then(|l| l.country_code.as_deref())
        .map(str::to_uppercase);

    let new_code = match new_code {
        Some(code) if old_code.as_deref() != Some(code.as_str()) => code,
        _ => {
            tracing::debug!(user_id = %change.user_id, "Country code unchanged, ignoring hook");
            return (StatusCode::OK, Json(HookResult { notified: 0 })).into_response();
        }
    };

    tracing::info!(
        user_id = %change.user_id,
        old = ?old_code,
        new = %new_code,
        "User country changed"
    );

    let today = chrono::Utc::now().date_naive();
    match notifications::notify_user_of_ongoing_disasters(
        state.store.as_ref(),
        state.push.as_ref(),
        &change.user_id,
        &new_code,
        today,
    )
    .await
    {
        Ok(notified) => (StatusCode::OK, Json(HookResult { notified })).into_response(),
        Err(e) => {
            tracing::error!(user_id = %change.user_id, error = %e, "Location hook failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
