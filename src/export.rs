use chrono::NaiveDate;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::ChannelLayout;
use crate::data_models::Sample;
use crate::errors::ExportError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `greenhouse_report_YYYY-MM-DD.csv`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("greenhouse_report_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the series as CSV, one column per layout field.
///
/// Missing or empty readings are written as `0`, everything else verbatim.
pub fn write_csv<W: Write>(
    writer: W,
    series: &[Sample],
    layout: &ChannelLayout,
) -> Result<usize, ExportError> {
    if series.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Timestamp".to_string()];
    header.extend(
        layout
            .fields
            .iter()
            .map(|field| format!("{} ({})", field.name, field.unit)),
    );
    csv_writer.write_record(&header)?;

    for sample in series {
        let mut row = vec![sample.timestamp.format(TIMESTAMP_FORMAT).to_string()];
        row.extend(layout.fields.iter().map(|field| match sample.raw(field.id) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => "0".to_string(),
        }));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(series.len())
}

pub fn export_to_file(
    path: &Path,
    series: &[Sample],
    layout: &ChannelLayout,
) -> Result<usize, ExportError> {
    if series.is_empty() {
        return Err(ExportError::NoData);
    }

    let file = File::create(path).map_err(|e| ExportError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = write_csv(file, series, layout)?;
    info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}
