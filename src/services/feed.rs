// SPDX-License-Identifier: MIT

//! GDACS feed client.
//!
//! One GET per poll cycle; any transport error or non-2xx status is fatal
//! to that cycle and the next scheduled run is the retry.

use crate::error::AppError;
use crate::models::GdacsFeed;

/// HTTP client for the GDACS event-list endpoint.
#[derive(Clone)]
pub struct GdacsClient {
    http: reqwest::Client,
    feed_url: String,
}

impl GdacsClient {
    pub fn new(feed_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            feed_url,
        }
    }

    /// Fetch the latest event list.
    pub async fn fetch_latest(&self) -> Result<GdacsFeed, AppError> {
        let response = self
            .http
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| AppError::Feed(format!("Feed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Feed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Feed(format!("Invalid feed response: {}", e)))
    }
}
