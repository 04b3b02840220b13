//! Front-end boundary for session tracking.
//!
//! The timer calls [`InsightsBackend::record_session`] once per finalized
//! stage and [`InsightsBackend::get_summary`] when it wants to show insights.
//! Failures are logged and returned; a caller that ignores them keeps a
//! working timer and simply shows insights as unavailable.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::session::{EndReason, RawSessionEvent, SessionDraft, SessionRecord};
use crate::stats::{InsightsSummary, WindowSummary};
use crate::storage::{Config, SessionLog};

/// Shared handle to the process-wide session log.
#[derive(Clone)]
pub struct InsightsBackend {
    log: Arc<SessionLog>,
}

impl InsightsBackend {
    pub fn new(log: Arc<SessionLog>) -> Self {
        Self { log }
    }

    /// Backend over the log named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(SessionLog::from_config(config)?)))
    }

    /// Backend over the log named by the on-disk configuration.
    pub fn open() -> Result<Self> {
        Self::from_config(&Config::load_or_default())
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Record one finalized stage from an arbitrary JSON payload.
    ///
    /// Returns `Ok(None)` when the stage carried nothing worth keeping.
    pub fn record_session(&self, payload: &Value) -> Result<Option<SessionRecord>> {
        self.record_session_at(payload, Utc::now())
    }

    pub fn record_session_at(
        &self,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        self.record_event_at(&RawSessionEvent::from_payload(payload), now)
    }

    pub fn record_event_at(
        &self,
        raw: &RawSessionEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        self.log.append_session(raw, now).inspect_err(|e| {
            warn!(error = %e, path = %self.log.path().display(), "session tracking failed");
        })
    }

    /// Finalize `draft` and record it.
    pub fn finish_draft(
        &self,
        draft: SessionDraft,
        reason: EndReason,
        ended_at: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        self.record_event_at(&draft.finalize(reason, ended_at), ended_at)
    }

    /// 7-day, 30-day and all-time summaries as of now.
    pub fn get_summary(&self) -> Result<InsightsSummary> {
        self.get_summary_at(Utc::now())
    }

    pub fn get_summary_at(&self, now: DateTime<Utc>) -> Result<InsightsSummary> {
        self.log.summary(now).inspect_err(|e| {
            warn!(error = %e, path = %self.log.path().display(), "insights unavailable");
        })
    }

    /// A single summary over a custom trailing window.
    pub fn window_summary_at(
        &self,
        window_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<WindowSummary> {
        self.log.window_summary(window_days, now).inspect_err(|e| {
            warn!(error = %e, path = %self.log.path().display(), "insights unavailable");
        })
    }
}
