use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalizer::{coerce_actual, coerce_cycle, coerce_planned, parse_finite, unit_ratio};

/// Column names of the persisted schema, in field order.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "session_id",
    "started_at",
    "ended_at",
    "mode",
    "planned_seconds",
    "actual_seconds",
    "completion_ratio",
    "completed",
    "was_skipped",
    "cycle_index",
    "reason",
];

/// Number of fields in a persisted record.
pub const FIELD_COUNT: usize = 11;

/// Ratio at or above which a stage counts as completed.
pub const COMPLETION_THRESHOLD: f64 = 0.999;

/// Timer stage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Focus => "focus",
            SessionMode::ShortBreak => "shortBreak",
            SessionMode::LongBreak => "longBreak",
        }
    }

    /// Parse the wire name. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "focus" => Some(SessionMode::Focus),
            "shortBreak" => Some(SessionMode::ShortBreak),
            "longBreak" => Some(SessionMode::LongBreak),
            _ => None,
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Completed,
    Skipped,
    Reset,
    Reconfigured,
    Abandoned,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Completed => "completed",
            EndReason::Skipped => "skipped",
            EndReason::Reset => "reset",
            EndReason::Reconfigured => "reconfigured",
            EndReason::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(EndReason::Completed),
            "skipped" => Some(EndReason::Skipped),
            "reset" => Some(EndReason::Reset),
            "reconfigured" => Some(EndReason::Reconfigured),
            "abandoned" => Some(EndReason::Abandoned),
            _ => None,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted outcome of one finalized stage.
///
/// Timestamps are kept as the ISO-8601 text that was written, so a record
/// whose timestamp was damaged on disk still counts toward unbounded totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: String,
    pub ended_at: String,
    pub mode: SessionMode,
    pub planned_seconds: u64,
    /// Always within `0..=planned_seconds`.
    pub actual_seconds: u64,
    /// Always within `[0, 1]`.
    pub completion_ratio: f64,
    pub completed: bool,
    pub was_skipped: bool,
    pub cycle_index: u32,
    pub reason: EndReason,
}

impl SessionRecord {
    /// Parsed `ended_at`, if it is a valid RFC 3339 timestamp.
    pub fn ended_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.ended_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parsed `started_at`, if it is a valid RFC 3339 timestamp.
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.started_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// A zero-length stage that did not complete carries no signal.
    pub fn is_worth_persisting(&self) -> bool {
        self.actual_seconds > 0 || self.reason == EndReason::Completed
    }

    /// Completed focus stage, the unit the streak is built from.
    pub fn is_completed_focus(&self) -> bool {
        self.mode == SessionMode::Focus && self.completed
    }

    /// Field values in column order, formatted for the log.
    pub fn to_fields(&self) -> [String; FIELD_COUNT] {
        [
            self.session_id.clone(),
            self.started_at.clone(),
            self.ended_at.clone(),
            self.mode.to_string(),
            self.planned_seconds.to_string(),
            self.actual_seconds.min(self.planned_seconds).to_string(),
            format!("{:.4}", self.completion_ratio),
            self.completed.to_string(),
            self.was_skipped.to_string(),
            self.cycle_index.to_string(),
            self.reason.to_string(),
        ]
    }

    /// Rebuild a record from decoded log fields.
    ///
    /// Returns `None` when the field count is wrong or the planned/actual
    /// seconds are not finite numbers. Everything else is coerced.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        if fields.len() != FIELD_COUNT {
            return None;
        }
        let planned_seconds = coerce_planned(parse_finite(&fields[4])?);
        let actual_seconds = coerce_actual(parse_finite(&fields[5])?, planned_seconds);
        let completion_ratio = parse_finite(&fields[6])
            .map(unit_ratio)
            .unwrap_or_else(|| actual_seconds as f64 / planned_seconds as f64);

        Some(Self {
            session_id: fields[0].clone(),
            started_at: fields[1].clone(),
            ended_at: fields[2].clone(),
            mode: SessionMode::parse(&fields[3]).unwrap_or(SessionMode::Focus),
            planned_seconds,
            actual_seconds,
            completion_ratio,
            completed: fields[7] == "true",
            was_skipped: fields[8] == "true",
            cycle_index: coerce_cycle(parse_finite(&fields[9]).unwrap_or(1.0)),
            reason: EndReason::parse(&fields[10]).unwrap_or(EndReason::Abandoned),
        })
    }
}
