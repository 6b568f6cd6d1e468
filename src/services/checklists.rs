// SPDX-License-Identifier: MIT

//! Monthly recurring-checklist reset sweep.
//!
//! Runs at the first instant of each month. For every user's progress
//! record on a monthly recurring checklist, clears the checked items for
//! the new period, unless the current month's period token is already
//! recorded as completed (the user finished within the grace window).

use crate::db::Store;
use crate::error::AppError;
use crate::models::{ChecklistKind, Frequency};
use crate::period::month_token;
use chrono::NaiveDate;
use serde::Serialize;

/// Counts emitted at the end of a reset sweep.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ResetSummary {
    /// Progress records examined
    pub scanned: usize,
    /// Records whose checked items were cleared
    pub reset: usize,
    /// Monthly recurring records left alone (already completed this period)
    pub skipped_completed: usize,
    /// Per-record update failures (logged, sweep continued)
    pub failed: usize,
}

/// Reset monthly recurring checklists for all users.
///
/// Each record's update is independent: one failure is logged and the
/// sweep moves on.
pub async fn reset_recurring_checklists(
    store: &dyn Store,
    today: NaiveDate,
) -> Result<ResetSummary, AppError> {
    let current_period = month_token(today);
    tracing::info!(period = %current_period, "Starting recurring checklist reset");

    let mut summary = ResetSummary::default();

    for user_id in store.list_user_ids().await? {
        let progress_records = match store.list_checklist_progress(&user_id).await {
            Ok(records) => records,
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(user_id, error = %e, "Failed to list checklist progress");
                continue;
            }
        };

        for progress in progress_records {
            summary.scanned += 1;

            let checklist = match store.get_checklist(&progress.checklist_id).await {
                Ok(Some(checklist)) => checklist,
                Ok(None) => continue,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        user_id,
                        checklist_id = %progress.checklist_id,
                        error = %e,
                        "Failed to fetch checklist definition"
                    );
                    continue;
                }
            };

            // Only monthly recurring checklists are swept
            if checklist.kind != ChecklistKind::Recurring
                || checklist.frequency != Some(Frequency::Monthly)
            {
                continue;
            }

            // Grace window: completed this period already, leave it alone
            if progress.completed_in(&current_period) {
                summary.skipped_completed += 1;
                continue;
            }

            let cleared = vec![false; progress.checked_items.len()];
            match store
                .set_checked_items(&user_id, &progress.checklist_id, &cleared)
                .await
            {
                Ok(()) => {
                    summary.reset += 1;
                    tracing::debug!(
                        user_id,
                        checklist_id = %progress.checklist_id,
                        period = %current_period,
                        "Checklist reset"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        user_id,
                        checklist_id = %progress.checklist_id,
                        error = %e,
                        "Failed to reset checklist"
                    );
                }
            }
        }
    }

    tracing::info!(
        scanned = summary.scanned,
        reset = summary.reset,
        skipped = summary.skipped_completed,
        failed = summary.failed,
        "Recurring checklist reset complete"
    );

    Ok(summary)
}
