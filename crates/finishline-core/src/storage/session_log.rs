//! Append-only session log.
//!
//! A single UTF-8 text file: a fixed header line naming the columns, then one
//! encoded [`SessionRecord`] per line in insertion order. Records are never
//! rewritten or removed.
//!
//! The file is created lazily by the first operation that needs it. Appends
//! hold the write side of a per-log lock so lines never interleave; reads
//! share the read side and can run alongside each other.

use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::codec;
use super::Config;
use crate::error::{Result, StorageError};
use crate::session::{normalize, RawSessionEvent, SessionRecord, COLUMNS, FIELD_COUNT};
use crate::stats::{InsightsSummary, WindowAggregator, WindowSummary};

/// Parse log contents into records, oldest first.
///
/// The first logical line is the header. Blank lines, rows with the wrong
/// number of fields and rows with non-numeric durations are skipped.
pub fn parse_log(text: &str) -> Vec<SessionRecord> {
    let mut dropped = 0usize;
    let records: Vec<SessionRecord> = codec::split_records(text, FIELD_COUNT)
        .into_iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = SessionRecord::from_fields(&codec::decode(line));
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, kept = records.len(), "skipped malformed session log lines");
    }
    records
}

/// Durable store of finalized sessions.
pub struct SessionLog {
    path: PathBuf,
    ready: Mutex<bool>,
    io: RwLock<()>,
    aggregator: WindowAggregator,
}

impl SessionLog {
    /// A log backed by the file at `path`. Nothing touches the disk until
    /// the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ready: Mutex::new(false),
            io: RwLock::new(()),
            aggregator: WindowAggregator::default(),
        }
    }

    /// A log at the configured location, summarized with the configured
    /// thresholds.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.session_log_path()?).with_aggregator(config.aggregator()))
    }

    pub fn with_aggregator(mut self, aggregator: WindowAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header if the file is empty.
    fn ensure_header(&self, file: &mut File) -> std::io::Result<bool> {
        if file.metadata()?.len() > 0 {
            return Ok(false);
        }
        let mut header = codec::encode(COLUMNS);
        header.push('\n');
        file.write_all(header.as_bytes())?;
        Ok(true)
    }

    /// Create the directory, the file and its header if needed.
    ///
    /// Idempotent. Concurrent callers block until the first one finishes,
    /// after which every call returns immediately.
    pub fn initialize(&self) -> Result<()> {
        let mut ready = self.ready.lock()?;
        if *ready {
            return Ok(());
        }

        let init_failed = |source| StorageError::InitFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(init_failed)?;
        }

        let _guard = self.io.write()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(init_failed)?;
        if self.ensure_header(&mut file).map_err(init_failed)? {
            info!(path = %self.path.display(), "created session log");
        }

        *ready = true;
        Ok(())
    }

    /// Normalize `raw`, append it, and return the stored record.
    ///
    /// Returns `Ok(None)` without writing when the record carries no signal
    /// (zero seconds elapsed and not completed).
    ///
    /// # Errors
    /// Returns an error if the log cannot be initialized or written. The
    /// caller's own session state is unaffected.
    pub fn append_session(
        &self,
        raw: &RawSessionEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        self.initialize()?;

        let record = normalize(raw, now);
        if !record.is_worth_persisting() {
            debug!(
                session_id = %record.session_id,
                reason = %record.reason,
                "discarded zero-length session"
            );
            return Ok(None);
        }

        let mut line = codec::encode(record.to_fields());
        line.push('\n');

        let append_failed = |source| StorageError::AppendFailed {
            path: self.path.clone(),
            source,
        };

        let _guard = self.io.write()?;
        // Recreate the header if the file vanished after initialization.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_failed)?;
        self.ensure_header(&mut file).map_err(append_failed)?;
        file.write_all(line.as_bytes()).map_err(append_failed)?;
        file.flush().map_err(append_failed)?;

        debug!(
            session_id = %record.session_id,
            mode = %record.mode,
            reason = %record.reason,
            actual_seconds = record.actual_seconds,
            "appended session record"
        );
        Ok(Some(record))
    }

    /// Every well-formed record in file order, oldest first.
    pub fn read_all_records(&self) -> Result<Vec<SessionRecord>> {
        self.initialize()?;

        let bytes = {
            let _guard = self.io.read()?;
            std::fs::read(&self.path).map_err(|source| StorageError::ReadFailed {
                path: self.path.clone(),
                source,
            })?
        };
        Ok(parse_log(&String::from_utf8_lossy(&bytes)))
    }

    /// 7-day, 30-day and all-time summaries as of `now`.
    pub fn summary(&self, now: DateTime<Utc>) -> Result<InsightsSummary> {
        let records = self.read_all_records()?;
        Ok(self
            .aggregator
            .report(&records, now, self.path.display().to_string()))
    }

    /// One summary over a trailing window of `window_days` (or all time).
    pub fn window_summary(
        &self,
        window_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<WindowSummary> {
        let records = self.read_all_records()?;
        Ok(self.aggregator.summarize(&records, window_days, now))
    }
}
