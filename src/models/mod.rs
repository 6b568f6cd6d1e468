// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod alert;
pub mod checklist;
pub mod notification;
pub mod user;

pub use alert::{
    AffectedCountry, AlertRecord, AlertSummary, GdacsFeature, GdacsFeed, SeverityData,
};
pub use checklist::{Checklist, ChecklistKind, ChecklistProgress, Frequency};
pub use notification::UserNotification;
pub use user::{UserLocation, UserProfile};
