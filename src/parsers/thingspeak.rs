use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use crate::data_models::{ChannelInfo, Feed, FieldId, Sample};
use crate::errors::ParseError;
use crate::utils::parse_timestamp;

// Field values arrive as strings, numbers or null depending on the device
// firmware. Keep whatever text was sent and let the metrics decide.
fn deserialize_raw_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// A timestamp that is not a JSON string cannot be placed in time; it decodes
// as absent so the entry is skipped instead of failing the whole feed.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn deserialize_entry_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Deserialize, Debug)]
struct FeedEntry {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_entry_id")]
    entry_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field1: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field2: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field3: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field4: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field5: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    field6: Option<String>,
}

#[derive(Deserialize, Debug)]
struct FeedDocument {
    #[serde(default)]
    channel: Option<ChannelInfo>,
    #[serde(default)]
    feeds: Vec<FeedEntry>,
}

impl FeedEntry {
    fn into_sample(self, index: usize) -> Option<Sample> {
        let Some(timestamp) = self.created_at.as_deref().and_then(parse_timestamp) else {
            warn!(
                "Skipping feed entry {} (entry_id {:?}): missing or invalid created_at {:?}",
                index, self.entry_id, self.created_at
            );
            return None;
        };

        let mut sample = Sample::new(timestamp);
        sample.entry_id = self.entry_id;
        let raw_fields = [
            self.field1,
            self.field2,
            self.field3,
            self.field4,
            self.field5,
            self.field6,
        ];
        for (field, raw) in FieldId::ALL.into_iter().zip(raw_fields) {
            sample.set_field(field, raw);
        }
        Some(sample)
    }
}

/// Decode a `feeds.json` body (or a bare array of feed entries).
pub fn parse_feed(body: &str) -> Result<Feed, ParseError> {
    let to_parse_error = |e| ParseError::JsonParseError { source: e };
    let value: serde_json::Value = serde_json::from_str(body).map_err(to_parse_error)?;

    let (channel, entries) = if value.is_array() {
        let entries: Vec<FeedEntry> = serde_json::from_value(value).map_err(to_parse_error)?;
        (None, entries)
    } else {
        let doc: FeedDocument = serde_json::from_value(value).map_err(to_parse_error)?;
        (doc.channel, doc.feeds)
    };

    let total = entries.len();
    let samples: Vec<Sample> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.into_sample(index))
        .collect();
    debug!("Decoded {} of {} feed entries", samples.len(), total);

    Ok(Feed { channel, samples })
}

pub fn parse_feed_file(path: &Path) -> Result<Feed, ParseError> {
    let body = fs::read_to_string(path).map_err(|e| ParseError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_feed(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "channel": {
            "id": 3205767,
            "name": "Smart Garden",
            "field1": "Temp",
            "last_entry_id": 12
        },
        "feeds": [
            {"created_at": "2024-05-01T10:00:00Z", "entry_id": 11, "field1": "21.50", "field2": "60", "field3": null},
            {"created_at": "2024-05-01T10:00:20Z", "entry_id": 12, "field1": 22, "field2": "61.2", "field5": "1013.4"}
        ]
    }"#;

    #[test]
    fn test_parse_feed_document() {
        let feed = parse_feed(FEED).unwrap();
        let channel = feed.channel.as_ref().unwrap();
        assert_eq!(channel.name.as_deref(), Some("Smart Garden"));
        assert_eq!(channel.last_entry_id, Some(12));

        assert_eq!(feed.samples.len(), 2);
        let first = &feed.samples[0];
        assert_eq!(first.entry_id, Some(11));
        assert_eq!(first.raw(FieldId::Field1), Some("21.50"));
        assert_eq!(first.raw(FieldId::Field3), None);
        assert_eq!(first.raw(FieldId::Field4), None);

        let latest = feed.latest().unwrap();
        assert_eq!(latest.raw(FieldId::Field1), Some("22"));
        assert_eq!(latest.raw(FieldId::Field5), Some("1013.4"));
        assert_eq!(latest.timestamp_millis() - first.timestamp_millis(), 20_000);
    }

    #[test]
    fn test_parse_bare_entry_array() {
        let feed = parse_feed(r#"[{"created_at": "2024-05-01T10:00:00Z", "field2": true}]"#).unwrap();
        assert!(feed.channel.is_none());
        assert_eq!(feed.samples[0].raw(FieldId::Field2), Some("true"));
        assert!(feed.samples[0].value(FieldId::Field2).is_nan());
    }

    #[test]
    fn test_entries_with_bad_timestamps_are_skipped() {
        let body = r#"{"feeds": [
            {"created_at": "not a date", "field1": "1"},
            {"field1": "2"},
            {"created_at": 123, "entry_id": 4, "field1": "4"},
            {"created_at": {"at": "2024-05-01T09:00:00Z"}, "field1": "5"},
            {"created_at": "2024-05-01T10:00:00Z", "field1": "3"}
        ]}"#;
        let feed = parse_feed(body).unwrap();
        assert_eq!(feed.samples.len(), 1);
        assert_eq!(feed.samples[0].raw(FieldId::Field1), Some("3"));
    }

    #[test]
    fn test_entry_ids_are_decoded_leniently() {
        let body = r#"[
            {"created_at": "2024-05-01T10:00:00Z", "entry_id": "7"},
            {"created_at": "2024-05-01T10:00:20Z", "entry_id": -1},
            {"created_at": "2024-05-01T10:00:40Z", "entry_id": "eight"},
            {"created_at": "2024-05-01T10:01:00Z", "entry_id": null},
            {"created_at": "2024-05-01T10:01:20Z", "entry_id": 9}
        ]"#;
        let feed = parse_feed(body).unwrap();
        let ids: Vec<Option<u64>> = feed.samples.iter().map(|s| s.entry_id).collect();
        assert_eq!(ids, vec![Some(7), None, None, None, Some(9)]);
    }

    #[test]
    fn test_empty_feed() {
        let feed = parse_feed(r#"{"channel": {"name": "Empty"}, "feeds": []}"#).unwrap();
        assert!(feed.samples.is_empty());
        assert!(feed.latest().is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_feed("{\"feeds\": [").unwrap_err(),
            ParseError::JsonParseError { .. }
        ));
        assert!(matches!(
            parse_feed("\"-1\"").unwrap_err(),
            ParseError::JsonParseError { .. }
        ));
    }

    #[test]
    fn test_parse_feed_file_missing() {
        let err = parse_feed_file(Path::new("/no/such/feed.json")).unwrap_err();
        assert!(matches!(err, ParseError::IoError { .. }));
    }
}
