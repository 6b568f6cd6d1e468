// SPDX-License-Identifier: MIT

//! Disaster alert models: the raw GDACS feed shapes and the canonical
//! stored record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One page of the GDACS event-list feed.
///
/// Features are kept as raw JSON so a single malformed feature can be
/// rejected on its own instead of failing the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct GdacsFeed {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

/// A single feature from the feed: alert properties plus geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct GdacsFeature {
    pub properties: GdacsProperties,
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

/// Raw alert fields as GDACS publishes them.
///
/// Field names follow the feed's all-lowercase convention. Dates are kept
/// as strings here; the normalizer parses them (the feed sometimes omits
/// the timezone suffix).
#[derive(Debug, Clone, Deserialize)]
pub struct GdacsProperties {
    #[serde(rename = "eventid")]
    pub event_id: i64,
    #[serde(rename = "episodeid")]
    pub episode_id: i64,
    #[serde(rename = "eventtype")]
    pub event_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "htmldescription", default)]
    pub html_description: String,
    #[serde(rename = "alertlevel")]
    pub alert_level: String,
    #[serde(rename = "alertscore", default)]
    pub alert_score: f64,
    #[serde(rename = "fromdate")]
    pub from_date: String,
    #[serde(rename = "todate")]
    pub to_date: String,
    #[serde(rename = "datemodified")]
    pub date_modified: String,
    #[serde(rename = "affectedcountries", default)]
    pub affected_countries: Vec<GdacsCountry>,
    #[serde(rename = "severitydata", default)]
    pub severity_data: SeverityData,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<GdacsUrls>,
}

/// Affected country entry from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct GdacsCountry {
    pub iso2: String,
    #[serde(rename = "countryname", default)]
    pub country_name: String,
}

/// Link block from the feed; only the report link is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct GdacsUrls {
    #[serde(default)]
    pub report: Option<String>,
}

/// Severity block, stored verbatim on the canonical record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityData {
    #[serde(default)]
    pub severity: f64,
    #[serde(rename = "severitytext", default)]
    pub severity_text: String,
    #[serde(rename = "severityunit", default)]
    pub severity_unit: String,
}

/// Affected country as persisted on the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AffectedCountry {
    pub iso2: String,
    pub country_name: String,
}

/// Canonical disaster alert record.
///
/// Identity is the `(event_id, episode_id)` pair; the document id is
/// `"{event_id}-{episode_id}"`. Records are written once on first sighting
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub event_id: i64,
    pub episode_id: i64,
    pub event_type: String,
    pub name: String,
    pub description: String,
    pub html_description: String,
    pub icon: Option<String>,
    pub alert_level: String,
    pub alert_score: f64,
    pub geometry: Option<geojson::Geometry>,
    pub bbox: Vec<f64>,
    pub affected_countries: Vec<AffectedCountry>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub severity: SeverityData,
    pub report_url: Option<String>,
    /// Ingestion source tag ("GDACS")
    pub source: String,
    /// When this record was written
    pub last_updated: DateTime<Utc>,
}

impl AlertRecord {
    /// Document id for this record: `"{event_id}-{episode_id}"`.
    pub fn doc_id(&self) -> String {
        format!("{}-{}", self.event_id, self.episode_id)
    }

    /// Whether the validity window contains `date`, inclusive on both ends,
    /// compared at day granularity.
    pub fn is_ongoing_on(&self, date: NaiveDate) -> bool {
        self.from_date.date_naive() <= date && self.to_date.date_naive() >= date
    }

    /// Whether `country_code` (uppercase ISO2) is listed as affected.
    pub fn affects_country(&self, country_code: &str) -> bool {
        self.affected_countries
            .iter()
            .any(|c| c.iso2.eq_ignore_ascii_case(country_code))
    }
}

/// Denormalized alert summary embedded in notification records and push
/// payload data blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    pub event_id: i64,
    pub episode_id: i64,
    pub event_type: String,
    pub severity: String,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub report_url: Option<String>,
}

impl From<&AlertRecord> for AlertSummary {
    fn from(alert: &AlertRecord) -> Self {
        Self {
            event_id: alert.event_id,
            episode_id: alert.episode_id,
            event_type: alert.event_type.clone(),
            severity: alert.severity.severity_text.clone(),
            from_date: alert.from_date,
            to_date: alert.to_date,
            report_url: alert.report_url.clone(),
        }
    }
}
