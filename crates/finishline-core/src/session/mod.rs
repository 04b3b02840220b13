//! Session records and the path that produces them.
//!
//! A front end opens a [`SessionDraft`] at stage start, finalizes it into a
//! [`RawSessionEvent`], and [`normalize`] turns that into the strict
//! [`SessionRecord`] the log stores.

mod draft;
mod normalizer;
mod record;

pub use draft::SessionDraft;
pub use normalizer::{
    format_timestamp, normalize, parse_timestamp, safe_number, synthesize_session_id,
    RawSessionEvent,
};
pub(crate) use normalizer::unit_ratio;
pub use record::{
    EndReason, SessionMode, SessionRecord, COLUMNS, COMPLETION_THRESHOLD, FIELD_COUNT,
};
