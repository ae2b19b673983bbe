// file: src/exporter/json.rs
// description: json export of the analytics report

use crate::analytics::{aggregate, describe_trend, incident_statistics, recommend};
use crate::error::Result;
use crate::models::{AnalyticsSnapshot, IncidentRecord, IncidentStatistics, TimeRange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

/// Everything a dashboard needs for one time range. Snapshot and statistics
/// both cover only the incidents inside `time_range`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub time_range: TimeRange,
    pub snapshot: AnalyticsSnapshot,
    pub trend: String,
    pub recommendations: Vec<String>,
    pub statistics: IncidentStatistics,
}

impl AnalyticsReport {
    pub fn build(incidents: &[IncidentRecord], range: TimeRange, now: DateTime<Utc>) -> Self {
        let snapshot = aggregate(incidents, range, now);
        let trend = describe_trend(&snapshot.incidents_by_month);
        let recommendations = recommend(&snapshot);

        let in_range: Vec<IncidentRecord> = incidents
            .iter()
            .filter(|incident| range.includes(incident.date, now))
            .cloned()
            .collect();

        Self {
            generated_at: now,
            time_range: range,
            trend,
            recommendations,
            statistics: incident_statistics(&in_range),
            snapshot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_incidents: usize,
    pub files: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn export_report(&self, report: &AnalyticsReport, pretty: bool) -> Result<ExportManifest> {
        info!("Starting JSON export to {:?}", self.output_dir);

        let file_name = format!("analytics-report-{}.json", report.time_range);
        self.write_json(&file_name, report, pretty)?;

        let manifest = ExportManifest {
            exported_at: report.generated_at.to_rfc3339(),
            total_incidents: report.snapshot.total_incidents,
            files: vec![file_name],
        };
        self.write_json("manifest.json", &manifest, true)?;

        info!(
            "Export complete: {} incidents summarized",
            manifest.total_incidents
        );
        Ok(manifest)
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T, pretty: bool) -> Result<()> {
        let contents = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(self.output_dir.join(file_name), contents)?;
        Ok(())
    }
}
