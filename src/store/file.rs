// file: src/store/file.rs
// description: JSON file backed incident store with in-memory cache
// reference: persistent metadata store pattern

use crate::error::{AnalyticsError, Result};
use crate::models::IncidentRecord;
use crate::store::{IncidentStore, InsertOutcome, RecordUpdate, insert_into, replace_in, update_in};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Keeps the whole incident list in memory and rewrites the file on every
/// mutation. Entries that fail to deserialize are skipped on load.
///
/// Mutations are applied to a copy of the list; the cache only changes once
/// the file write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<Vec<IncidentRecord>>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if !create_if_missing {
                return Err(AnalyticsError::Store {
                    path,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "incident file does not exist",
                    ),
                });
            }

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| AnalyticsError::Store {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }

            debug!("Creating empty incident file at {:?}", path);
            write_records(&path, &[]).await?;
        }

        let incidents = load_records(&path).await?;
        info!("Loaded {} incidents from {}", incidents.len(), path.display());

        Ok(Self {
            path,
            cache: RwLock::new(incidents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IncidentStore for JsonFileStore {
    async fn list_incidents(&self) -> Result<Vec<IncidentRecord>> {
        Ok(self.cache.read().await.clone())
    }

    async fn get_incident(&self, id: &str) -> Result<Option<IncidentRecord>> {
        Ok(self
            .cache
            .read()
            .await
            .iter()
            .find(|incident| incident.id == id)
            .cloned())
    }

    async fn insert_incident(&self, record: IncidentRecord) -> Result<InsertOutcome> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        let outcome = insert_into(&mut next, record)?;
        match &outcome {
            InsertOutcome::Inserted(_) => {
                write_records(&self.path, &next).await?;
                *cache = next;
            }
            InsertOutcome::Duplicate(id) => {
                info!("Incident already exists, skipping: {}", id);
            }
        }
        Ok(outcome)
    }

    async fn update_incident(&self, record: IncidentRecord) -> Result<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        replace_in(&mut next, record)?;
        write_records(&self.path, &next).await?;
        *cache = next;
        Ok(())
    }

    async fn update_with(&self, id: &str, update: RecordUpdate) -> Result<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        update_in(&mut next, id, update)?;
        write_records(&self.path, &next).await?;
        *cache = next;
        Ok(())
    }
}

async fn load_records(path: &Path) -> Result<Vec<IncidentRecord>> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| AnalyticsError::Store {
            path: path.to_path_buf(),
            source,
        })?;

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Value> = serde_json::from_str(&contents)?;
    let total = entries.len();

    let records: Vec<IncidentRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed incident at index {}: {}", index, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            "Loaded {} of {} incidents from {}",
            records.len(),
            total,
            path.display()
        );
    }

    Ok(records)
}

async fn write_records(path: &Path, records: &[IncidentRecord]) -> Result<()> {
    let contents = serde_json::to_string_pretty(records)?;
    let tmp_path = path.with_extension("json.tmp");

    fs::write(&tmp_path, contents)
        .await
        .map_err(|source| AnalyticsError::Store {
            path: tmp_path.clone(),
            source,
        })?;

    fs::rename(&tmp_path, path)
        .await
        .map_err(|source| AnalyticsError::Store {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Saved {} incidents to {}", records.len(), path.display());
    Ok(())
}
