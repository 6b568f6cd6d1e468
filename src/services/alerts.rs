// SPDX-License-Identifier: MIT

//! Alert normalization.
//!
//! Transforms one raw feed feature into the canonical stored record and
//! decides whether it is new or a duplicate. Duplicates (same
//! `(event_id, episode_id)`) are skipped outright; re-broadcast episodes
//! with revised data are not merged. No side effects here: persistence is
//! the orchestrator's batch commit.

use crate::db::{StagedAlert, Store};
use crate::error::AppError;
use crate::models::{AffectedCountry, AlertRecord, GdacsFeature};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeSet;

/// Outcome of normalizing one feed feature.
#[derive(Debug)]
pub enum AlertOutcome {
    /// First sighting of this key; record is ready for the batch commit.
    New(StagedAlert),
    /// A record with this key already exists and is left untouched.
    Skipped { doc_id: String },
}

/// Decode one raw feed feature.
///
/// Missing identity fields surface here as a per-event error.
pub fn parse_feature(value: &serde_json::Value) -> Result<GdacsFeature, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::BadRequest(format!("Malformed feed feature: {}", e)))
}

/// Check a feature against the store and prepare its canonical record.
pub async fn check_and_prepare_alert(
    store: &dyn Store,
    feature: GdacsFeature,
    now: DateTime<Utc>,
) -> Result<AlertOutcome, AppError> {
    let doc_id = format!(
        "{}-{}",
        feature.properties.event_id, feature.properties.episode_id
    );

    if store.get_alert(&doc_id).await?.is_some() {
        return Ok(AlertOutcome::Skipped { doc_id });
    }

    let record = canonicalize(feature, now)?;
    Ok(AlertOutcome::New(StagedAlert { doc_id, record }))
}

/// Map a raw feature into the canonical record shape.
pub fn canonicalize(feature: GdacsFeature, now: DateTime<Utc>) -> Result<AlertRecord, AppError> {
    let props = feature.properties;

    Ok(AlertRecord {
        event_id: props.event_id,
        episode_id: props.episode_id,
        event_type: props.event_type,
        name: props.name,
        description: props.description,
        html_description: props.html_description,
        icon: props.icon,
        alert_level: props.alert_level,
        alert_score: props.alert_score,
        geometry: feature.geometry,
        bbox: feature.bbox.unwrap_or_default(),
        affected_countries: props
            .affected_countries
            .into_iter()
            .map(|c| AffectedCountry {
                iso2: c.iso2.to_uppercase(),
                country_name: c.country_name,
            })
            .collect(),
        from_date: parse_feed_date(&props.from_date)?,
        to_date: parse_feed_date(&props.to_date)?,
        date_modified: parse_feed_date(&props.date_modified)?,
        severity: props.severity_data,
        report_url: props.url.and_then(|u| u.report),
        source: "GDACS".to_string(),
        last_updated: now,
    })
}

/// Affected ISO2 codes of a record, uppercased and deduplicated.
pub fn extract_affected_country_codes(alert: &AlertRecord) -> Vec<String> {
    let codes: BTreeSet<String> = alert
        .affected_countries
        .iter()
        .map(|c| c.iso2.to_uppercase())
        .collect();
    codes.into_iter().collect()
}

/// Parse a feed date.
///
/// GDACS mixes RFC3339 timestamps with timezone-less local strings; the
/// latter are taken as UTC.
fn parse_feed_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| AppError::BadRequest(format!("Malformed feed date {:?}: {}", raw, e)))
}
