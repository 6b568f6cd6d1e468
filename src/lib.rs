// SPDX-License-Identifier: MIT

//! Hazard-Relay: disaster-alert ingestion and notification fan-out.
//!
//! This crate provides the backend pipeline for a disaster-preparedness
//! app: it polls the GDACS hazard feed, deduplicates and persists alert
//! records, resolves which users are geographically affected, and fans out
//! push notifications plus per-user notification records.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod period;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{GdacsClient, PushSender};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub feed: GdacsClient,
    pub push: Arc<dyn PushSender>,
}
