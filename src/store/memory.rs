// file: src/store/memory.rs
// description: in-memory incident store

use crate::error::Result;
use crate::models::IncidentRecord;
use crate::store::{IncidentStore, InsertOutcome, RecordUpdate, insert_into, replace_in, update_in};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    incidents: RwLock<Vec<IncidentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incidents(incidents: Vec<IncidentRecord>) -> Self {
        Self {
            incidents: RwLock::new(incidents),
        }
    }
}

#[async_trait]
impl IncidentStore for MemoryStore {
    async fn list_incidents(&self) -> Result<Vec<IncidentRecord>> {
        Ok(self.incidents.read().await.clone())
    }

    async fn get_incident(&self, id: &str) -> Result<Option<IncidentRecord>> {
        Ok(self
            .incidents
            .read()
            .await
            .iter()
            .find(|incident| incident.id == id)
            .cloned())
    }

    async fn insert_incident(&self, record: IncidentRecord) -> Result<InsertOutcome> {
        let mut incidents = self.incidents.write().await;
        let outcome = insert_into(&mut incidents, record)?;
        if let InsertOutcome::Duplicate(id) = &outcome {
            debug!("Incident already exists, skipping: {}", id);
        }
        Ok(outcome)
    }

    async fn update_incident(&self, record: IncidentRecord) -> Result<()> {
        let mut incidents = self.incidents.write().await;
        replace_in(&mut incidents, record)
    }

    async fn update_with(&self, id: &str, update: RecordUpdate) -> Result<()> {
        let mut incidents = self.incidents.write().await;
        update_in(&mut incidents, id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    #[tokio::test]
    async fn test_insert_assigns_id_and_skips_duplicates() {
        let store = MemoryStore::new();
        let record = IncidentRecord::builder("Bank breach", "details")
            .source("CERT")
            .build();

        let first = store.insert_incident(record.clone()).await.unwrap();
        let second = store.insert_incident(record).await.unwrap();

        assert!(!first.id().is_empty());
        assert_eq!(second, InsertOutcome::Duplicate(first.id().to_string()));
        assert_eq!(store.list_incidents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let store = MemoryStore::new();
        let record = IncidentRecord::builder("x", "y").id("missing").build();

        assert!(store.update_incident(record).await.is_err());
    }

    #[tokio::test]
    async fn test_update_with_keeps_other_fields() {
        let store = MemoryStore::with_incidents(vec![
            IncidentRecord::builder("a", "").id("1").status(Status::Resolved).build(),
        ]);

        store
            .update_with("1", Box::new(|r: &mut IncidentRecord| r.processed = true))
            .await
            .unwrap();

        let record = store.get_incident("1").await.unwrap().unwrap();
        assert!(record.processed);
        assert_eq!(record.status, Some(Status::Resolved));
    }

    #[tokio::test]
    async fn test_list_unprocessed() {
        let store = MemoryStore::with_incidents(vec![
            IncidentRecord::builder("a", "").id("1").processed(true).build(),
            IncidentRecord::builder("b", "").id("2").build(),
        ]);

        let pending = store.list_unprocessed().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "2");
    }
}
