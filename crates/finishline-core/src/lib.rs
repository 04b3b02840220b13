//! # Finishline Core Library
//!
//! Session telemetry for a Pomodoro-style timer. The timer front end reports
//! each finalized stage; this library normalizes it, appends it to a durable
//! local log, and computes rolling-window productivity metrics from the full
//! history on demand.
//!
//! ## Architecture
//!
//! - **Session**: permissive raw events, the strict record shape, and the
//!   normalizer between them
//! - **Storage**: an append-only line-oriented session log and TOML-based
//!   configuration
//! - **Stats**: 7-day, 30-day and all-time summaries including the finish
//!   pressure score
//!
//! ## Key Components
//!
//! - [`SessionLog`]: Append and read back session records
//! - [`WindowAggregator`]: Pure summary computation over a record set
//! - [`InsightsBackend`]: The two calls a front end makes
//! - [`Config`]: Application configuration management

pub mod error;
pub mod insights;
pub mod session;
pub mod stats;
pub mod storage;

pub use error::{ConfigError, CoreError, StorageError};
pub use insights::InsightsBackend;
pub use session::{EndReason, RawSessionEvent, SessionDraft, SessionMode, SessionRecord};
pub use stats::{InsightsSummary, WindowAggregator, WindowSummary};
pub use storage::{Config, SessionLog};
