// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;

/// GDACS event-list endpoint polled by the orchestrator.
pub const DEFAULT_FEED_URL: &str =
    "https://www.gdacs.org/gdacsapi/api/events/geteventlist/latest";

/// Expo push gateway endpoint.
pub const DEFAULT_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Cloud Scheduler job name expected on `/jobs/poll-alerts`.
pub const POLL_JOB_NAME: &str = "poll-hazard-alerts";

/// Cloud Scheduler job name expected on `/jobs/reset-checklists`.
pub const RESET_JOB_NAME: &str = "reset-recurring-checklists";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Hazard feed URL (override for staging/tests)
    pub feed_url: String,
    /// Push gateway URL (override for staging/tests)
    pub push_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            feed_url: DEFAULT_FEED_URL.to_string(),
            push_url: DEFAULT_PUSH_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `GCP_PROJECT_ID` is required; everything else has a default. Nothing
    /// here is a secret; the GDACS feed and the Expo push endpoint are both
    /// unauthenticated.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            feed_url: env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            push_url: env::var("PUSH_URL").unwrap_or_else(|_| DEFAULT_PUSH_URL.to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
