// SPDX-License-Identifier: MIT

//! Affected-user resolution.
//!
//! The backing store caps equality-membership queries at
//! [`MEMBERSHIP_QUERY_LIMIT`] values, so country-code sets are partitioned
//! into chunks and the per-chunk results unioned.

use crate::db::{Store, MEMBERSHIP_QUERY_LIMIT};
use crate::error::AppError;
use futures_util::{stream, StreamExt};
use std::collections::HashSet;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Resolve the ids of users whose stored country code is in `codes`.
///
/// Empty input returns an empty list without querying. The result carries
/// no duplicate ids; order is unspecified.
pub async fn resolve_affected_users(
    store: &dyn Store,
    codes: &[String],
) -> Result<Vec<String>, AppError> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let mut user_ids = Vec::new();

    for chunk in codes.chunks(MEMBERSHIP_QUERY_LIMIT) {
        for user_id in store.find_user_ids_by_country(chunk).await? {
            if seen.insert(user_id.clone()) {
                user_ids.push(user_id);
            }
        }
    }

    Ok(user_ids)
}

/// Collect push tokens for the given users, skipping users without one.
///
/// Lookups run concurrently with a cap to avoid overloading the store.
pub async fn collect_push_tokens(
    store: &dyn Store,
    user_ids: &[String],
) -> Result<Vec<String>, AppError> {
    let profiles = stream::iter(user_ids.to_vec())
        .map(|user_id| async move { store.get_user(&user_id).await })
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(profiles
        .into_iter()
        .flatten()
        .filter_map(|profile| profile.push_token)
        .collect())
}
