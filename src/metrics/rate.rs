//! Short-term rate of change of one field, as a fixed-lag difference quotient.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Estimate;
use crate::data_models::{FieldId, Sample};
use crate::utils::to_fixed;

/// Fewest samples needed before a rate is reported.
pub const MIN_SAMPLES: usize = 5;
/// The reference sample sits this many positions before the end (clamped).
pub const REFERENCE_LAG: usize = 10;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

const FAST_CHANGE_PER_HOUR: f64 = 5.0;
const SLOW_CHANGE_PER_HOUR: f64 = 1.0;

/// Per-hour rate of change of `field` between the last sample and the one
/// at `max(0, len - 10)`, rounded to one decimal.
///
/// Points between the two are ignored. Identical endpoint timestamps give
/// exactly zero. An endpoint whose value does not parse to a finite number
/// makes the rate unavailable.
pub fn estimate_rate(series: &[Sample], field: FieldId) -> Estimate<f64> {
    if series.len() < MIN_SAMPLES {
        return Estimate::Unavailable;
    }

    let last = &series[series.len() - 1];
    let reference = &series[series.len().saturating_sub(REFERENCE_LAG)];

    let elapsed_hours =
        (last.timestamp_millis() - reference.timestamp_millis()) as f64 / MILLIS_PER_HOUR;
    if elapsed_hours == 0.0 {
        return Estimate::Value(0.0);
    }

    let now = last.value(field);
    let before = reference.value(field);
    if !now.is_finite() || !before.is_finite() {
        return Estimate::Unavailable;
    }

    Estimate::finite((now - before) / elapsed_hours).map(|rate| to_fixed(rate, 1))
}

/// Short-term direction derived from a rate estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    RisingFast,
    RisingSlowly,
    Stable,
    FallingSlowly,
    FallingFast,
}

impl Trend {
    /// Thresholds are strict: exactly ±1 or ±5 per hour stays in the milder band.
    pub fn from_rate(rate: f64) -> Self {
        if rate > FAST_CHANGE_PER_HOUR {
            Trend::RisingFast
        } else if rate > SLOW_CHANGE_PER_HOUR {
            Trend::RisingSlowly
        } else if rate < -FAST_CHANGE_PER_HOUR {
            Trend::FallingFast
        } else if rate < -SLOW_CHANGE_PER_HOUR {
            Trend::FallingSlowly
        } else {
            Trend::Stable
        }
    }

    /// An unavailable rate reads as stable.
    pub fn from_estimate(rate: Estimate<f64>) -> Self {
        match rate {
            Estimate::Value(rate) => Trend::from_rate(rate),
            Estimate::Unavailable => Trend::Stable,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::RisingFast => "rising fast",
            Trend::RisingSlowly => "rising slowly",
            Trend::Stable => "stable",
            Trend::FallingSlowly => "falling slowly",
            Trend::FallingFast => "falling fast",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
