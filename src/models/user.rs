// SPDX-License-Identifier: MIT

//! User profile model, reduced to the fields the alert pipeline reads.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The mobile app owns the rest of the profile document; this backend only
/// reads the location and push token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id (also used as document ID)
    pub user_id: String,
    /// Last known device location, maintained by the app's location tracker
    pub location: Option<UserLocation>,
    /// Expo push token, absent until the user grants notifications
    pub push_token: Option<String>,
}

/// Device location subset relevant to alert fan-out.
///
/// Only the country code determines affectedness; coordinates are
/// informational here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocation {
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl UserProfile {
    /// Uppercase country code, if the profile has one.
    pub fn country_code(&self) -> Option<String> {
        self.location
            .as_ref()
            .and_then(|l| l.country_code.as_deref())
            .map(|c| c.to_uppercase())
    }
}
