// SPDX-License-Identifier: MIT

//! Recurrence period tokens.
//!
//! Checklist completion is tracked against string tokens identifying a
//! recurrence window. These formats are persisted and must stay stable:
//! `"month-{year}-{MM}"` and `"week-{year}-W{WW}"` (ISO week number).

use crate::models::Frequency;
use chrono::{Datelike, NaiveDate};

/// Monthly token for `date`, e.g. `"month-2025-08"`.
pub fn month_token(date: NaiveDate) -> String {
    format!("month-{}-{:02}", date.year(), date.month())
}

/// Weekly token for `date`, e.g. `"week-2025-W31"`.
///
/// Uses the calendar year with the ISO week number, matching the tokens the
/// mobile app already wrote.
pub fn week_token(date: NaiveDate) -> String {
    format!("week-{}-W{:02}", date.year(), date.iso_week().week())
}

/// Token for the period containing `date` at the given recurrence frequency.
pub fn period_token(frequency: Frequency, date: NaiveDate) -> String {
    match frequency {
        Frequency::Monthly => month_token(date),
        Frequency::Weekly => week_token(date),
    }
}
