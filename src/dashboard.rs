//! One refresh cycle's view of the channel: latest readings plus the
//! derived metrics shown next to them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::config::DashboardConfig;
use crate::data_models::{Feed, FieldId};
use crate::metrics::vpd::compute_for_sample;
use crate::metrics::{classify, estimate_rate, field_stats, Estimate, FieldStats, Trend, VpdStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub field: FieldId,
    pub name: String,
    pub unit: String,
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: FieldId,
    pub name: String,
    pub unit: String,
    pub stats: Option<FieldStats>,
    /// Units per hour.
    pub rate: Estimate<f64>,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub channel_name: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub sample_count: usize,
    pub latest: Vec<LatestReading>,
    /// kPa
    pub vpd: Estimate<f64>,
    pub vpd_status: VpdStatus,
    pub fields: Vec<FieldSummary>,
}

pub fn build_snapshot(feed: &Feed, config: &DashboardConfig) -> DashboardSnapshot {
    let latest_sample = feed.latest();
    let layout = &config.layout;

    let latest = layout
        .fields
        .iter()
        .map(|field| LatestReading {
            field: field.id,
            name: field.name.clone(),
            unit: field.unit.clone(),
            raw: latest_sample.and_then(|s| s.raw(field.id)).map(str::to_string),
        })
        .collect();

    let vpd = latest_sample
        .map(|sample| compute_for_sample(sample, &config.vpd_inputs))
        .unwrap_or(Estimate::Unavailable);

    let fields = layout
        .fields
        .iter()
        .map(|field| {
            let rate = estimate_rate(&feed.samples, field.id);
            FieldSummary {
                field: field.id,
                name: field.name.clone(),
                unit: field.unit.clone(),
                stats: field_stats(&feed.samples, field.id),
                rate,
                trend: Trend::from_estimate(rate),
            }
        })
        .collect();

    DashboardSnapshot {
        channel_name: feed.channel.as_ref().and_then(|c| c.name.clone()),
        updated_at: latest_sample.map(|s| s.timestamp),
        sample_count: feed.samples.len(),
        latest,
        vpd,
        vpd_status: classify(vpd),
        fields,
    }
}

impl fmt::Display for DashboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "== {} ==",
            self.channel_name.as_deref().unwrap_or("IoT Monitor")
        )?;
        match self.updated_at {
            Some(ts) => writeln!(f, "Last update: {} ({} samples)", ts.format("%Y-%m-%d %H:%M:%S UTC"), self.sample_count)?,
            None => writeln!(f, "Last update: -- (no samples)")?,
        }
        writeln!(f)?;

        for reading in &self.latest {
            writeln!(
                f,
                "  {:<22} {:>10} {}",
                reading.name,
                reading.raw.as_deref().unwrap_or("--"),
                reading.unit
            )?;
        }
        writeln!(f)?;
        writeln!(f, "  VPD: {:.2} kPa  [{}]", self.vpd, self.vpd_status)?;
        writeln!(f)?;

        for summary in &self.fields {
            match &summary.stats {
                Some(stats) => write!(
                    f,
                    "  {:<22} avg {} / min {} / max {} {}",
                    summary.name, stats.average, stats.min, stats.max, summary.unit
                )?,
                None => write!(f, "  {:<22} no data", summary.name)?,
            }
            writeln!(
                f,
                "  | {:.1} {}/h, {}",
                summary.rate, summary.unit, summary.trend
            )?;
        }
        Ok(())
    }
}
