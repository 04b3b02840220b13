//! Rolling-window session summaries.
//!
//! Every summary is recomputed from the full record history and an explicit
//! `now`. Nothing here is stored.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::momentum::{finish_pressure_score, MomentumInputs};
use super::streak::streak_days;
use crate::session::{format_timestamp, unit_ratio, SessionMode, SessionRecord};

/// Minimum actual length of a deep focus session (45 minutes).
pub const DEEP_FOCUS_SECONDS: u64 = 2700;

/// Metrics for one trailing window, or for all time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    /// Window length in days; `None` means unbounded.
    pub window_days: Option<u32>,
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub completion_rate: f64,
    pub total_planned_seconds: u64,
    pub total_actual_seconds: u64,
    pub focus_sessions: u64,
    pub focus_actual_seconds: u64,
    pub deep_focus_sessions: u64,
    pub unfinished_sessions: u64,
    pub unfinished_seconds: u64,
    pub average_completion: f64,
    pub active_days: u32,
    /// Spans the whole history regardless of the window.
    pub streak_days: u32,
    pub consistency_rate: f64,
    pub deep_focus_rate: f64,
    pub finish_pressure_score: u32,
}

/// The three standard windows plus bookkeeping for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub last_updated_at: String,
    pub storage_path: String,
    pub seven_day: WindowSummary,
    pub thirty_day: WindowSummary,
    pub all_time: WindowSummary,
}

/// Computes [`WindowSummary`] values from a record history.
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    /// Actual seconds a completed focus session needs to count as deep focus
    pub deep_focus_threshold_secs: u64,
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self {
            deep_focus_threshold_secs: DEEP_FOCUS_SECONDS,
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Sum that pins at `u64::MAX` instead of overflowing.
fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

impl WindowAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deep_focus_threshold(deep_focus_threshold_secs: u64) -> Self {
        Self {
            deep_focus_threshold_secs,
        }
    }

    /// Records whose `ended_at` falls within the trailing window.
    ///
    /// Unbounded windows keep every record, including ones whose timestamp
    /// no longer parses.
    pub fn filter_window<'a>(
        &self,
        records: &'a [SessionRecord],
        window_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Vec<&'a SessionRecord> {
        let Some(days) = window_days else {
            return records.iter().collect();
        };
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        records
            .iter()
            .filter(|r| r.ended_at_utc().is_some_and(|at| at >= cutoff))
            .collect()
    }

    /// Summarize `records` over a trailing window of `window_days`.
    ///
    /// A zero-day window has no meaningful day coverage, so its consistency
    /// falls back to the completion rate like the unbounded window does.
    pub fn summarize(
        &self,
        records: &[SessionRecord],
        window_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> WindowSummary {
        let in_window = self.filter_window(records, window_days, now);

        let total_sessions = in_window.len() as u64;
        let completed_sessions = in_window.iter().filter(|r| r.completed).count() as u64;
        let completion_rate = ratio(completed_sessions, total_sessions);

        let total_planned_seconds = saturating_total(in_window.iter().map(|r| r.planned_seconds));
        let total_actual_seconds = saturating_total(in_window.iter().map(|r| r.actual_seconds));

        let focus: Vec<&SessionRecord> = in_window
            .iter()
            .copied()
            .filter(|r| r.mode == SessionMode::Focus)
            .collect();
        let focus_actual_seconds = saturating_total(focus.iter().map(|r| r.actual_seconds));
        let deep_focus_sessions = focus
            .iter()
            .filter(|r| r.completed && r.actual_seconds >= self.deep_focus_threshold_secs)
            .count() as u64;

        let unfinished_sessions = total_sessions - completed_sessions;
        let unfinished_seconds = total_planned_seconds.saturating_sub(total_actual_seconds);

        let average_completion = if in_window.is_empty() {
            0.0
        } else {
            in_window
                .iter()
                .map(|r| unit_ratio(r.completion_ratio))
                .sum::<f64>()
                / in_window.len() as f64
        };

        let active_days = in_window
            .iter()
            .filter_map(|r| r.ended_at_utc())
            .map(|at| at.date_naive())
            .collect::<HashSet<NaiveDate>>()
            .len() as u32;

        let streak_days = streak_days(records, now);

        let consistency_rate = match window_days {
            Some(days) if days > 0 => unit_ratio(f64::from(active_days) / f64::from(days)),
            _ => unit_ratio(completion_rate),
        };
        let deep_focus_rate = ratio(deep_focus_sessions, focus.len() as u64);
        let unfinished_ratio = unit_ratio(ratio(unfinished_seconds, total_planned_seconds));

        let finish_pressure_score = finish_pressure_score(&MomentumInputs {
            completion_rate,
            average_completion,
            consistency_rate,
            streak_days,
            deep_focus_rate,
            unfinished_ratio,
        });

        WindowSummary {
            window_days,
            total_sessions,
            completed_sessions,
            completion_rate,
            total_planned_seconds,
            total_actual_seconds,
            focus_sessions: focus.len() as u64,
            focus_actual_seconds,
            deep_focus_sessions,
            unfinished_sessions,
            unfinished_seconds,
            average_completion,
            active_days,
            streak_days,
            consistency_rate,
            deep_focus_rate,
            finish_pressure_score,
        }
    }

    /// The 7-day, 30-day and all-time summaries.
    pub fn report(
        &self,
        records: &[SessionRecord],
        now: DateTime<Utc>,
        storage_path: impl Into<String>,
    ) -> InsightsSummary {
        InsightsSummary {
            last_updated_at: format_timestamp(now),
            storage_path: storage_path.into(),
            seven_day: self.summarize(records, Some(7), now),
            thirty_day: self.summarize(records, Some(30), now),
            all_time: self.summarize(records, None, now),
        }
    }
}
