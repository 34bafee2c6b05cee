use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::parse_reading;

/// One of the six numbered field slots a channel exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldId {
    Field1,
    Field2,
    Field3,
    Field4,
    Field5,
    Field6,
}

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::Field1,
        FieldId::Field2,
        FieldId::Field3,
        FieldId::Field4,
        FieldId::Field5,
        FieldId::Field6,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used by the provider, e.g. `"field3"`.
    pub fn key(self) -> &'static str {
        match self {
            FieldId::Field1 => "field1",
            FieldId::Field2 => "field2",
            FieldId::Field3 => "field3",
            FieldId::Field4 => "field4",
            FieldId::Field5 => "field5",
            FieldId::Field6 => "field6",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown field '{}', expected field1..field6", s))
    }
}

/// A single telemetry record as delivered by the provider.
///
/// Field values are kept as the raw text the provider sent; interpretation
/// happens in the metrics layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub entry_id: Option<u64>,
    fields: [Option<String>; 6],
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            entry_id: None,
            fields: Default::default(),
        }
    }

    pub fn with_entry_id(mut self, entry_id: u64) -> Self {
        self.entry_id = Some(entry_id);
        self
    }

    /// Builder-style setter, mostly for assembling fixtures.
    pub fn with_field(mut self, field: FieldId, raw: impl Into<String>) -> Self {
        self.set_field(field, Some(raw.into()));
        self
    }

    pub fn set_field(&mut self, field: FieldId, raw: Option<String>) {
        self.fields[field.index()] = raw;
    }

    /// Raw value for `field`, `None` when the provider sent nothing.
    pub fn raw(&self, field: FieldId) -> Option<&str> {
        self.fields[field.index()].as_deref()
    }

    /// Leniently parsed value; NaN when absent or unparsable.
    pub fn value(&self, field: FieldId) -> f64 {
        self.raw(field).map(parse_reading).unwrap_or(f64::NAN)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Samples in provider order, oldest first.
pub type Series = Vec<Sample>;

/// Channel metadata reported alongside the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_entry_id: Option<u64>,
}

/// A decoded feed: optional channel metadata plus the sample series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub channel: Option<ChannelInfo>,
    pub samples: Series,
}

impl Feed {
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }
}
