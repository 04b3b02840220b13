//! Statistics module for Finishline
//!
//! Rolling-window summaries over the session history: totals, completion
//! rates, day coverage, the focus streak and the finish pressure score.

mod momentum;
mod streak;
mod window;

pub use momentum::{
    adjusted_momentum, base_momentum, finish_pressure_score, interruption_penalty, saturate,
    streak_momentum, MomentumInputs,
};

pub use streak::{completed_focus_days, count_streak, streak_days};

pub use window::{InsightsSummary, WindowAggregator, WindowSummary, DEEP_FOCUS_SECONDS};
