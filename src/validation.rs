//! Plausibility checks for channel readings.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::config::ChannelLayout;
use crate::data_models::{FieldId, Sample};
use crate::utils::parse_finite;

/// A reading outside the range configured for its field.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub field: FieldId,
    pub name: String,
    pub value: f64,
    pub range: [f64; 2],
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) = {} at {} is outside [{}, {}]",
            self.name, self.field, self.value, self.timestamp, self.range[0], self.range[1]
        )
    }
}

/// Checks every configured field of one sample.
///
/// Absent and non-numeric readings are not violations; the metrics layer
/// already treats them as unavailable.
pub fn validate_sample(sample: &Sample, layout: &ChannelLayout) -> Vec<RangeViolation> {
    layout
        .fields
        .iter()
        .filter_map(|config| {
            let [low, high] = config.valid_range?;
            let value = sample.raw(config.id).and_then(parse_finite)?;
            if (low..=high).contains(&value) {
                return None;
            }
            Some(RangeViolation {
                field: config.id,
                name: config.name.clone(),
                value,
                range: [low, high],
                timestamp: sample.timestamp,
            })
        })
        .collect()
}

pub fn validate_series(series: &[Sample], layout: &ChannelLayout) -> Vec<RangeViolation> {
    series
        .iter()
        .flat_map(|sample| validate_sample(sample, layout))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(temp: &str, humidity: &str) -> Sample {
        Sample::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            .with_field(FieldId::Field1, temp)
            .with_field(FieldId::Field2, humidity)
    }

    #[test]
    fn test_in_range_sample_has_no_violations() {
        let layout = ChannelLayout::default();
        assert!(validate_sample(&sample("24.1", "55"), &layout).is_empty());
        // Bounds are inclusive
        assert!(validate_sample(&sample("50", "100"), &layout).is_empty());
    }

    #[test]
    fn test_out_of_range_readings_are_reported() {
        let layout = ChannelLayout::default();
        let violations = validate_sample(&sample("85", "-3"), &layout);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, FieldId::Field1);
        assert_eq!(violations[0].value, 85.0);
        assert_eq!(violations[1].field, FieldId::Field2);
        assert_eq!(violations[1].range, [0.0, 100.0]);
        assert!(violations[0].to_string().contains("Interior temperature"));
    }

    #[test]
    fn test_unusable_readings_are_not_violations() {
        let layout = ChannelLayout::default();
        assert!(validate_sample(&sample("", "wet"), &layout).is_empty());
    }

    #[test]
    fn test_fields_without_range_are_skipped() {
        let mut layout = ChannelLayout::default();
        for field in &mut layout.fields {
            field.valid_range = None;
        }
        assert!(validate_series(&[sample("900", "900")], &layout).is_empty());
    }
}
