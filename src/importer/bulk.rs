// file: src/importer/bulk.rs
// description: bulk incident import from header-row CSV files
// reference: https://docs.rs/csv

use crate::error::{AnalyticsError, Result};
use crate::models::{IncidentRecord, NewIncident, Severity};
use crate::store::{IncidentStore, InsertOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// One CSV row as exported by incident spreadsheets. List columns hold
/// comma-separated values inside a single quoted cell.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    attack_vector: Option<String>,
    #[serde(default)]
    indicators_of_compromise: Option<String>,
    #[serde(default)]
    affected_systems: Option<String>,
}

impl CsvRow {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if is_blank(&self.title) {
            problems.push("Missing title".to_string());
        }
        if is_blank(&self.description) {
            problems.push("Missing description".to_string());
        }

        let severity_ok = self
            .severity
            .as_deref()
            .is_some_and(|s| s.parse::<Severity>().is_ok());
        if !severity_ok {
            problems.push(
                "Invalid severity (must be 'low', 'medium', 'high', or 'critical')".to_string(),
            );
        }

        problems
    }

    fn into_new_incident(self) -> NewIncident {
        NewIncident {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            severity: self.severity.unwrap_or_default().to_lowercase(),
            status: self.status.filter(|s| !s.is_empty()),
            sector: self.sector,
            source: self.source,
            source_url: self.source_url,
            attack_vector: self.attack_vector,
            date: None,
            indicators: split_list(self.indicators_of_compromise),
            affected_systems: split_list(self.affected_systems),
            threat_actors: Vec::new(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A problem with one data row. Rows are numbered from 1, not counting
/// the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

#[derive(Debug, Default)]
pub struct CsvBatch {
    pub incidents: Vec<IncidentRecord>,
    pub errors: Vec<RowError>,
    pub total_rows: usize,
}

impl CsvBatch {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct CsvImporter;

impl CsvImporter {
    pub fn read_path(path: &Path, now: DateTime<Utc>) -> Result<CsvBatch> {
        let file = File::open(path).map_err(|source| AnalyticsError::Store {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading incidents from {}", path.display());
        Self::read(file, now)
    }

    /// Parses every data row. Valid rows become records with `collected_at`
    /// and `date` set to `now`; invalid ones are reported per row.
    pub fn read<R: Read>(reader: R, now: DateTime<Utc>) -> Result<CsvBatch> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        debug!("CSV columns: {:?}", headers);

        let mut batch = CsvBatch::default();

        for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = index + 1;
            batch.total_rows += 1;

            let parsed = match result {
                Ok(parsed) => parsed,
                Err(e) => {
                    batch.errors.push(RowError {
                        row,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let problems = parsed.problems();
            if !problems.is_empty() {
                batch
                    .errors
                    .extend(problems.into_iter().map(|message| RowError { row, message }));
                continue;
            }

            match IncidentRecord::from_new(parsed.into_new_incident(), now) {
                Ok(record) => batch.incidents.push(record),
                Err(e) => batch.errors.push(RowError {
                    row,
                    message: e.to_string(),
                }),
            }
        }

        if !batch.is_valid() {
            warn!(
                "{} problems found in {} CSV rows",
                batch.errors.len(),
                batch.total_rows
            );
        }

        Ok(batch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub inserted: Vec<String>,
    pub duplicates: Vec<String>,
}

/// Inserts parsed records one by one. Stops at the first store error;
/// records inserted before it stay stored.
pub async fn import_batch<S: IncidentStore + ?Sized>(
    store: &S,
    incidents: Vec<IncidentRecord>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in incidents {
        match store.insert_incident(record).await? {
            InsertOutcome::Inserted(id) => summary.inserted.push(id),
            InsertOutcome::Duplicate(id) => summary.duplicates.push(id),
        }
    }

    info!(
        "Imported {} incidents ({} duplicates skipped)",
        summary.inserted.len(),
        summary.duplicates.len()
    );
    Ok(summary)
}
