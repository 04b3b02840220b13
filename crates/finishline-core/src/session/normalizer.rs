//! Session event normalization.
//!
//! The front end hands over whatever it has when a stage ends. Nothing here
//! rejects input: every field is coerced to a safe value so recording a
//! session can never block the timer.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::record::{EndReason, SessionMode, SessionRecord, COMPLETION_THRESHOLD};

/// A session-ended event as received from the front end.
///
/// Every field is optional and untyped. Keys are accepted in camelCase or
/// snake_case; when both spellings are present the camelCase one wins unless
/// it is null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct RawSessionEvent {
    pub session_id: Value,
    pub started_at: Value,
    pub ended_at: Value,
    pub mode: Value,
    pub planned_seconds: Value,
    pub actual_seconds: Value,
    pub completion_ratio: Value,
    pub completed: Value,
    pub was_skipped: Value,
    pub cycle_index: Value,
    pub reason: Value,
}

impl RawSessionEvent {
    /// Read an event out of an arbitrary JSON payload.
    ///
    /// Each field is looked up on its own, so one odd key never discards the
    /// rest. Payloads that are not objects yield an empty event, which still
    /// normalizes.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(map) = payload.as_object() else {
            return Self::default();
        };
        let field = |camel: &str, snake: &str| {
            [camel, snake]
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|value| !value.is_null())
                .cloned()
                .unwrap_or(Value::Null)
        };

        Self {
            session_id: field("sessionId", "session_id"),
            started_at: field("startedAt", "started_at"),
            ended_at: field("endedAt", "ended_at"),
            mode: field("mode", "mode"),
            planned_seconds: field("plannedSeconds", "planned_seconds"),
            actual_seconds: field("actualSeconds", "actual_seconds"),
            completion_ratio: field("completionRatio", "completion_ratio"),
            completed: field("completed", "completed"),
            was_skipped: field("wasSkipped", "was_skipped"),
            cycle_index: field("cycleIndex", "cycle_index"),
            reason: field("reason", "reason"),
        }
    }
}

impl From<Value> for RawSessionEvent {
    fn from(payload: Value) -> Self {
        Self::from_payload(&payload)
    }
}

/// Coerce a loosely typed value to a finite number, or `0`.
pub fn safe_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Round half toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clamp into `[0, 1]`, mapping NaN to `0`.
pub(crate) fn unit_ratio(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub(crate) fn coerce_planned(value: f64) -> u64 {
    round_half_up(value).max(1.0) as u64
}

pub(crate) fn coerce_actual(value: f64, planned_seconds: u64) -> u64 {
    (round_half_up(value).max(0.0) as u64).min(planned_seconds)
}

pub(crate) fn coerce_cycle(value: f64) -> u32 {
    let value = if value == 0.0 { 1.0 } else { value };
    round_half_up(value).max(1.0).min(u32::MAX as f64) as u32
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

/// Generate a session id from the clock plus a random suffix.
pub fn synthesize_session_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..8])
}

/// Format a timestamp the way the log stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 string, a zoneless ISO-8601 string (taken as UTC) or
/// epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
        _ => None,
    }
}

fn normalize_timestamp(value: &Value, now: DateTime<Utc>) -> String {
    format_timestamp(parse_timestamp(value).unwrap_or(now))
}

fn normalize_session_id(value: &Value, now: DateTime<Utc>) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => synthesize_session_id(now),
    }
}

/// Convert a raw event into a well-formed record.
///
/// `now` stands in for missing or unparsable timestamps and seeds a
/// synthesized session id.
pub fn normalize(raw: &RawSessionEvent, now: DateTime<Utc>) -> SessionRecord {
    let planned_seconds = coerce_planned(safe_number(&raw.planned_seconds));
    let actual_seconds = coerce_actual(safe_number(&raw.actual_seconds), planned_seconds);

    let completion_ratio = match &raw.completion_ratio {
        Value::Number(n) => n.as_f64().filter(|r| r.is_finite()),
        _ => None,
    }
    .unwrap_or(actual_seconds as f64 / planned_seconds as f64);
    let completion_ratio = unit_ratio(completion_ratio);

    let mode = raw
        .mode
        .as_str()
        .and_then(SessionMode::parse)
        .unwrap_or(SessionMode::Focus);
    let reason = raw
        .reason
        .as_str()
        .and_then(EndReason::parse)
        .unwrap_or(EndReason::Abandoned);

    let completed = is_true(&raw.completed)
        || reason == EndReason::Completed
        || completion_ratio >= COMPLETION_THRESHOLD;

    SessionRecord {
        session_id: normalize_session_id(&raw.session_id, now),
        started_at: normalize_timestamp(&raw.started_at, now),
        ended_at: normalize_timestamp(&raw.ended_at, now),
        mode,
        planned_seconds,
        actual_seconds,
        completion_ratio,
        completed,
        was_skipped: is_true(&raw.was_skipped),
        cycle_index: coerce_cycle(safe_number(&raw.cycle_index)),
        reason,
    }
}
