//! Finish pressure score.
//!
//! A weighted blend of completion, consistency, streak and deep-focus
//! signals, penalized by planned time left unfinished, then pushed through
//! an S-curve onto a 0-100 display scale.

use serde::{Deserialize, Serialize};

use crate::session::unit_ratio;

const WEIGHT_COMPLETION_RATE: f64 = 0.35;
const WEIGHT_AVERAGE_COMPLETION: f64 = 0.25;
const WEIGHT_CONSISTENCY: f64 = 0.20;
const WEIGHT_STREAK: f64 = 0.13;
const WEIGHT_DEEP_FOCUS: f64 = 0.07;

/// Days of streak per e-fold of streak momentum.
const STREAK_SCALE_DAYS: f64 = 6.0;
const PENALTY_EXPONENT: f64 = 0.7;
const PENALTY_WEIGHT: f64 = 0.32;
const SATURATION_STEEPNESS: f64 = 4.5;

/// Everything the score depends on. Rates are expected within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumInputs {
    pub completion_rate: f64,
    pub average_completion: f64,
    pub consistency_rate: f64,
    pub streak_days: u32,
    pub deep_focus_rate: f64,
    pub unfinished_ratio: f64,
}

/// `1 - e^(-streak/6)`: approaches 1 as the streak grows.
pub fn streak_momentum(streak_days: u32) -> f64 {
    1.0 - (-(streak_days as f64) / STREAK_SCALE_DAYS).exp()
}

/// Maps `[0, 1]` onto `[0, 1]` with a steep start and a flat top.
pub fn saturate(x: f64) -> f64 {
    (1.0 - (-SATURATION_STEEPNESS * x).exp()) / (1.0 - (-SATURATION_STEEPNESS).exp())
}

/// Momentum before the unfinished-time penalty.
pub fn base_momentum(inputs: &MomentumInputs) -> f64 {
    unit_ratio(
        WEIGHT_COMPLETION_RATE * inputs.completion_rate
            + WEIGHT_AVERAGE_COMPLETION * inputs.average_completion
            + WEIGHT_CONSISTENCY * inputs.consistency_rate
            + WEIGHT_STREAK * streak_momentum(inputs.streak_days)
            + WEIGHT_DEEP_FOCUS * inputs.deep_focus_rate,
    )
}

pub fn interruption_penalty(unfinished_ratio: f64) -> f64 {
    unit_ratio(unfinished_ratio).powf(PENALTY_EXPONENT) * PENALTY_WEIGHT
}

pub fn adjusted_momentum(inputs: &MomentumInputs) -> f64 {
    unit_ratio(base_momentum(inputs) - interruption_penalty(inputs.unfinished_ratio))
}

/// The 0-100 finish pressure score.
pub fn finish_pressure_score(inputs: &MomentumInputs) -> u32 {
    let scaled = unit_ratio(saturate(adjusted_momentum(inputs)));
    (100.0 * scaled).round() as u32
}
