//! Derived agronomic metrics computed from raw channel samples.
//!
//! Everything in here is a pure function of its inputs: no I/O, no logging,
//! no shared state. Failure to produce a number is reported through
//! [`Estimate::Unavailable`] so callers must handle it explicitly.

pub mod rate;
pub mod stats;
pub mod vpd;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use rate::{estimate_rate, Trend};
pub use stats::{field_stats, FieldStats};
pub use vpd::{classify, compute, VpdBand, VpdStatus, VpdTier};

/// Result of a derived metric: a value, or a marker that the inputs were not
/// good enough to compute one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Estimate<T> {
    Value(T),
    Unavailable,
}

impl<T> Estimate<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Estimate::Value(value) => Some(value),
            Estimate::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Estimate::Value(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Estimate<U> {
        match self {
            Estimate::Value(value) => Estimate::Value(f(value)),
            Estimate::Unavailable => Estimate::Unavailable,
        }
    }
}

impl Estimate<f64> {
    /// Keep the value only when it is a finite number.
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Estimate::Value(value)
        } else {
            Estimate::Unavailable
        }
    }
}

impl<T> From<Option<T>> for Estimate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Estimate::Value(value),
            None => Estimate::Unavailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Estimate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Value(value) => {
                if let Some(precision) = f.precision() {
                    write!(f, "{:.*}", precision, value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Estimate::Unavailable => f.write_str("--"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_accessors() {
        let value = Estimate::Value(1.5);
        assert!(value.is_available());
        assert_eq!(value.value(), Some(1.5));
        assert_eq!(value.map(|v| v * 2.0), Estimate::Value(3.0));

        let missing: Estimate<f64> = Estimate::Unavailable;
        assert!(!missing.is_available());
        assert_eq!(missing.value(), None);
        assert_eq!(missing.map(|v| v * 2.0), Estimate::Unavailable);
    }

    #[test]
    fn test_estimate_finite() {
        assert_eq!(Estimate::finite(0.0), Estimate::Value(0.0));
        assert_eq!(Estimate::finite(f64::NAN), Estimate::Unavailable);
        assert_eq!(Estimate::finite(f64::NEG_INFINITY), Estimate::Unavailable);
    }

    #[test]
    fn test_estimate_display() {
        assert_eq!(format!("{:.2}", Estimate::Value(1.2)), "1.20");
        assert_eq!(format!("{}", Estimate::Value(3)), "3");
        assert_eq!(format!("{:.1}", Estimate::<f64>::Unavailable), "--");
    }

    #[test]
    fn test_estimate_serializes_tagged() {
        let json = serde_json::to_string(&Estimate::Value(1.17)).unwrap();
        assert_eq!(json, r#"{"state":"value","value":1.17}"#);
        let json = serde_json::to_string(&Estimate::<f64>::Unavailable).unwrap();
        assert_eq!(json, r#"{"state":"unavailable"}"#);
    }
}
