//! In-flight stage tracking.
//!
//! A draft is opened when a stage starts and finalized exactly once when the
//! stage completes, is skipped, reset, reconfigured or abandoned. Finalizing
//! consumes the draft and yields the raw event the store normalizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalizer::{format_timestamp, synthesize_session_id, RawSessionEvent};
use super::record::{EndReason, SessionMode};

/// A stage that has started but not yet been finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub session_id: String,
    pub mode: SessionMode,
    pub planned_seconds: u64,
    pub cycle_index: u32,
    pub started_at: DateTime<Utc>,
}

impl SessionDraft {
    pub fn begin(
        mode: SessionMode,
        planned_seconds: u64,
        cycle_index: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: synthesize_session_id(started_at),
            mode,
            planned_seconds,
            cycle_index,
            started_at,
        }
    }

    /// Whole seconds elapsed since the stage started. Clock skew backwards
    /// reads as zero.
    pub fn elapsed_seconds(&self, at: DateTime<Utc>) -> u64 {
        (at - self.started_at).num_seconds().max(0) as u64
    }

    /// Close the stage and produce the event to record.
    pub fn finalize(self, reason: EndReason, ended_at: DateTime<Utc>) -> RawSessionEvent {
        let actual = self.elapsed_seconds(ended_at).min(self.planned_seconds);
        RawSessionEvent {
            session_id: Value::from(self.session_id),
            started_at: Value::from(format_timestamp(self.started_at)),
            ended_at: Value::from(format_timestamp(ended_at)),
            mode: Value::from(self.mode.as_str()),
            planned_seconds: Value::from(self.planned_seconds),
            actual_seconds: Value::from(actual),
            completion_ratio: Value::Null,
            completed: Value::from(reason == EndReason::Completed),
            was_skipped: Value::from(reason == EndReason::Skipped),
            cycle_index: Value::from(self.cycle_index),
            reason: Value::from(reason.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::normalize;
    use chrono::{Duration, TimeZone};

    #[test]
    fn finalize_measures_elapsed_time() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let draft = SessionDraft::begin(SessionMode::Focus, 1500, 3, start);
        let id = draft.session_id.clone();

        let raw = draft.finalize(EndReason::Reset, start + Duration::seconds(600));
        let record = normalize(&raw, start + Duration::hours(1));
        assert_eq!(record.session_id, id);
        assert_eq!(record.actual_seconds, 600);
        assert_eq!(record.cycle_index, 3);
        assert_eq!(record.reason, EndReason::Reset);
        assert!(!record.completed);
        assert!(!record.was_skipped);
        assert_eq!(record.started_at, "2024-05-10T09:00:00.000Z");
        assert_eq!(record.ended_at, "2024-05-10T09:10:00.000Z");
    }

    #[test]
    fn overrun_is_capped_at_planned() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let draft = SessionDraft::begin(SessionMode::ShortBreak, 300, 1, start);
        let raw = draft.finalize(EndReason::Completed, start + Duration::seconds(420));
        let record = normalize(&raw, start);
        assert_eq!(record.actual_seconds, 300);
        assert!(record.completed);
    }

    #[test]
    fn skip_sets_was_skipped() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let draft = SessionDraft::begin(SessionMode::LongBreak, 900, 4, start);
        let raw = draft.finalize(EndReason::Skipped, start + Duration::seconds(30));
        let record = normalize(&raw, start);
        assert!(record.was_skipped);
        assert_eq!(record.mode, SessionMode::LongBreak);
    }

    #[test]
    fn backwards_clock_reads_as_zero() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let draft = SessionDraft::begin(SessionMode::Focus, 60, 1, start);
        assert_eq!(draft.elapsed_seconds(start - Duration::seconds(5)), 0);
    }
}
