use serde::Serialize;

use super::Estimate;
use crate::data_models::{FieldId, Sample};
use crate::utils::to_fixed;

/// Summary of one field over a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// Mean rounded to one decimal.
    pub average: f64,
    /// First-to-last change in percent of the first value, one decimal.
    pub change_percent: Estimate<f64>,
}

/// Statistics over every parseable value of `field`. Returns `None` when the
/// series holds no numeric reading for it.
pub fn field_stats(series: &[Sample], field: FieldId) -> Option<FieldStats> {
    let values: Vec<f64> = series
        .iter()
        .map(|sample| sample.value(field))
        .filter(|value| !value.is_nan())
        .collect();

    let (&first, &last) = (values.first()?, values.last()?);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = values.iter().sum();

    Some(FieldStats {
        count: values.len(),
        min,
        max,
        average: to_fixed(sum / values.len() as f64, 1),
        change_percent: Estimate::finite((last - first) / first * 100.0)
            .map(|change| to_fixed(change, 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[Option<&str>]) -> Vec<Sample> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mut sample = Sample::new(start + Duration::minutes(i as i64));
                sample.set_field(FieldId::Field3, value.map(str::to_string));
                sample
            })
            .collect()
    }

    #[test]
    fn test_stats_skip_unusable_readings() {
        let data = series(&[Some("40"), None, Some("oops"), Some("45.5"), Some("38")]);
        let stats = field_stats(&data, FieldId::Field3).unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 38.0);
        assert_eq!(stats.max, 45.5);
        assert_eq!(stats.average, 41.2);
        assert_eq!(stats.change_percent, Estimate::Value(-5.0));
    }

    #[test]
    fn test_stats_empty_inputs() {
        assert!(field_stats(&[], FieldId::Field3).is_none());
        let data = series(&[None, Some("--")]);
        assert!(field_stats(&data, FieldId::Field3).is_none());
    }

    #[test]
    fn test_change_from_zero_is_unavailable() {
        let data = series(&[Some("0"), Some("5")]);
        let stats = field_stats(&data, FieldId::Field3).unwrap();
        assert_eq!(stats.change_percent, Estimate::Unavailable);
        assert_eq!(stats.average, 2.5);
    }

    #[test]
    fn test_single_value() {
        let data = series(&[Some("1013.2")]);
        let stats = field_stats(&data, FieldId::Field3).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.average, 1013.2);
        assert_eq!(stats.change_percent, Estimate::Value(0.0));
    }
}
