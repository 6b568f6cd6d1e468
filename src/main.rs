// SPDX-License-Identifier: MIT

//! Hazard-Relay API Server
//!
//! Ingests the GDACS disaster feed and fans alerts out to affected users
//! as push notifications and persisted notification records.

use hazard_relay::{
    config::Config,
    db::FirestoreStore,
    services::{ExpoPushClient, GdacsClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Hazard-Relay API");

    // Initialize Firestore database
    let store = FirestoreStore::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Feed and push gateway clients
    let feed = GdacsClient::new(config.feed_url.clone());
    let push = ExpoPushClient::new(config.push_url.clone());
    tracing::info!(feed_url = %config.feed_url, "Feed client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store: Arc::new(store),
        feed,
        push: Arc::new(push),
    });

    // Build router
    let app = hazard_relay::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hazard_relay=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
