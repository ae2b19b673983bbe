// file: src/store/mod.rs
// description: incident persistence seam and shared insert semantics
// reference: async storage trait with pluggable backends

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{AnalyticsError, Result};
use crate::models::IncidentRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// In-place edit of a stored record, applied while the store holds its
/// write lock.
pub type RecordUpdate = Box<dyn FnOnce(&mut IncidentRecord) + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(String),
    /// A record with the same title and source was already stored.
    Duplicate(String),
}

impl InsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            InsertOutcome::Inserted(id) | InsertOutcome::Duplicate(id) => id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate(_))
    }
}

#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn list_incidents(&self) -> Result<Vec<IncidentRecord>>;

    async fn get_incident(&self, id: &str) -> Result<Option<IncidentRecord>>;

    /// Stores a new record, assigning an id when it has none. A sourced
    /// record whose fingerprint matches an existing one is not stored again
    /// and the existing id comes back as a duplicate. An explicit id that is
    /// already taken is rejected.
    async fn insert_incident(&self, record: IncidentRecord) -> Result<InsertOutcome>;

    /// Replaces the record with the same id.
    async fn update_incident(&self, record: IncidentRecord) -> Result<()>;

    /// Applies `update` to the current version of the record. Backends that
    /// can, do this under a single write lock so concurrent edits to other
    /// fields survive.
    async fn update_with(&self, id: &str, update: RecordUpdate) -> Result<()> {
        let mut record = self
            .get_incident(id)
            .await?
            .ok_or_else(|| AnalyticsError::NotFound(id.to_string()))?;
        update(&mut record);
        self.update_incident(record).await
    }

    async fn list_unprocessed(&self) -> Result<Vec<IncidentRecord>> {
        Ok(self
            .list_incidents()
            .await?
            .into_iter()
            .filter(|incident| !incident.processed)
            .collect())
    }
}

pub(crate) fn insert_into(
    records: &mut Vec<IncidentRecord>,
    mut record: IncidentRecord,
) -> Result<InsertOutcome> {
    if let Some(fingerprint) = record.fingerprint()
        && let Some(existing) = records
            .iter()
            .find(|r| r.fingerprint().as_ref() == Some(&fingerprint))
    {
        return Ok(InsertOutcome::Duplicate(existing.id.clone()));
    }

    if record.id.is_empty() {
        record.id = Uuid::new_v4().to_string();
    } else if records.iter().any(|r| r.id == record.id) {
        return Err(AnalyticsError::Validation(format!(
            "Incident id already in use: {}",
            record.id
        )));
    }

    let id = record.id.clone();
    records.push(record);
    Ok(InsertOutcome::Inserted(id))
}

pub(crate) fn replace_in(records: &mut [IncidentRecord], record: IncidentRecord) -> Result<()> {
    let slot = records
        .iter_mut()
        .find(|r| r.id == record.id)
        .ok_or_else(|| AnalyticsError::NotFound(record.id.clone()))?;
    *slot = record;
    Ok(())
}

pub(crate) fn update_in(records: &mut [IncidentRecord], id: &str, update: RecordUpdate) -> Result<()> {
    let slot = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AnalyticsError::NotFound(id.to_string()))?;
    update(slot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sourceless_records_are_never_merged() {
        let mut records = Vec::new();
        let first = insert_into(
            &mut records,
            IncidentRecord::builder("Phishing attack", "Payroll lure").build(),
        )
        .unwrap();
        let second = insert_into(
            &mut records,
            IncidentRecord::builder("Phishing attack", "Invoice lure").build(),
        )
        .unwrap();

        assert!(!first.is_duplicate());
        assert!(!second.is_duplicate());
        assert_ne!(first.id(), second.id());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_sourced_duplicate_returns_existing_id() {
        let mut records = Vec::new();
        let record = || IncidentRecord::builder("Bank breach", "x").source("CERT").build();

        let first = insert_into(&mut records, record()).unwrap();
        let second = insert_into(&mut records, record()).unwrap();

        assert_eq!(second, InsertOutcome::Duplicate(first.id().to_string()));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_colliding_explicit_id_is_rejected() {
        let mut records = Vec::new();
        insert_into(&mut records, IncidentRecord::builder("A", "a").id("x").build()).unwrap();

        let result = insert_into(&mut records, IncidentRecord::builder("B", "b").id("x").build());

        assert!(matches!(result, Err(AnalyticsError::Validation(_))));
        assert_eq!(records.iter().filter(|r| r.id == "x").count(), 1);
    }

    #[test]
    fn test_update_in_unknown_id() {
        let mut records = vec![IncidentRecord::builder("A", "a").id("a").build()];
        let result = update_in(&mut records, "b", Box::new(|r: &mut IncidentRecord| r.processed = true));

        assert!(matches!(result, Err(AnalyticsError::NotFound(_))));
        assert!(!records[0].processed);
    }
}
