//! Day streak over completed focus sessions.
//!
//! The streak walks backward from today through calendar days (UTC) that hold
//! at least one completed focus session. If today has none yet, yesterday may
//! start the count instead, so an unfinished morning does not zero the streak.
//! The first missing day ends it.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

use crate::session::SessionRecord;

/// UTC dates carrying at least one completed focus session.
pub fn completed_focus_days(records: &[SessionRecord]) -> HashSet<NaiveDate> {
    records
        .iter()
        .filter(|r| r.is_completed_focus())
        .filter_map(|r| r.ended_at_utc())
        .map(|at| at.date_naive())
        .collect()
}

/// Count consecutive days ending at `today`, with one grace day.
pub fn count_streak(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = today;
    if !days.contains(&cursor) {
        match cursor.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => cursor = yesterday,
            _ => return 0,
        }
    }

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

/// Streak over the whole history, independent of any summary window.
pub fn streak_days(records: &[SessionRecord], now: DateTime<Utc>) -> u32 {
    count_streak(&completed_focus_days(records), now.date_naive())
}
