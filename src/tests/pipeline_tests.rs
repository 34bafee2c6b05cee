#[cfg(test)]
mod pipeline_tests {
    use crate::config::DashboardConfig;
    use crate::dashboard::build_snapshot;
    use crate::data_models::FieldId;
    use crate::export::export_to_file;
    use crate::metrics::{Estimate, Trend, VpdBand};
    use crate::parsers::{parse_feed, parse_feed_file};
    use crate::validation::validate_series;
    use std::io::Write;

    /// Twelve entries ten minutes apart, one of them without a timestamp.
    fn feed_body() -> String {
        let mut entries = Vec::new();
        for i in 0..12 {
            let created_at = if i == 3 {
                "null".to_string()
            } else {
                format!("\"2024-06-01T{:02}:{:02}:00Z\"", 8 + i / 6, (i % 6) * 10)
            };
            entries.push(format!(
                r#"{{"created_at": {}, "entry_id": {}, "field1": "{}", "field2": {}, "field3": "{}", "field5": null}}"#,
                created_at,
                i + 1,
                20.0 + i as f64 * 0.5,
                50 + i,
                if i == 11 { "140" } else { "35" }
            ));
        }
        format!(
            r#"{{"channel": {{"id": 3205767, "name": "North House", "last_entry_id": 12}}, "feeds": [{}]}}"#,
            entries.join(",")
        )
    }

    #[test]
    fn test_feed_to_snapshot() {
        let feed = parse_feed(&feed_body()).unwrap();
        assert_eq!(feed.samples.len(), 11);

        let snapshot = build_snapshot(&feed, &DashboardConfig::default());
        assert_eq!(snapshot.channel_name.as_deref(), Some("North House"));
        assert_eq!(snapshot.latest[0].raw.as_deref(), Some("25.5"));
        assert_eq!(snapshot.latest[1].raw.as_deref(), Some("61"));
        assert_eq!(snapshot.latest[4].raw, None);

        // 25.5 °C at 61 %
        assert_eq!(snapshot.vpd, Estimate::Value(1.27));
        assert_eq!(snapshot.vpd_status.band, VpdBand::HighStress);

        // Reference is the second sample (20.5 °C at 08:10), last is 25.5 °C at 09:50
        let temperature = &snapshot.fields[0];
        assert_eq!(temperature.rate, Estimate::Value(3.0));
        assert_eq!(temperature.trend, Trend::RisingSlowly);

        let pressure = &snapshot.fields[4];
        assert!(pressure.stats.is_none());
        assert_eq!(pressure.rate, Estimate::Unavailable);
    }

    #[test]
    fn test_out_of_range_readings_are_reported() {
        let feed = parse_feed(&feed_body()).unwrap();
        let config = DashboardConfig::default();
        let violations = validate_series(&feed.samples, &config.layout);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, FieldId::Field3);
        assert_eq!(violations[0].value, 140.0);
    }

    #[test]
    fn test_saved_feed_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feeds.json");
        let mut file = std::fs::File::create(&feed_path).unwrap();
        file.write_all(feed_body().as_bytes()).unwrap();
        drop(file);

        let feed = parse_feed_file(&feed_path).unwrap();
        let csv_path = dir.path().join("report.csv");
        let rows = export_to_file(&csv_path, &feed.samples, &DashboardConfig::default().layout).unwrap();
        assert_eq!(rows, 11);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 11);
        assert_eq!(&records[0][0], "2024-06-01 08:00:00");
        assert_eq!(&records[0][1], "20");
        assert_eq!(&records[0][5], "0");
        assert_eq!(&records[10][3], "140");
    }
}
