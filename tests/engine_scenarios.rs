// file: tests/engine_scenarios.rs
// description: end-to-end scenarios across store, enrichment and analytics

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use incident_analytics::analytics::{describe_trend, find_similar_in_store};
use incident_analytics::{
    AnalyticsError, AnalyticsReport, Config, EnrichmentOutcome, EnrichmentPipeline,
    IncidentRecord, IncidentStore, InsertOutcome, JsonFileStore, MemoryStore, NewIncident, Result,
    Severity,
    SimilarityMatcher, TimeRange, aggregate, classify, extract_iocs, spawn_enrichment,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn scenario() -> Vec<IncidentRecord> {
    vec![
        IncidentRecord::builder("Wire fraud phishing", "Treasury staff targeted")
            .id("1")
            .severity(Severity::Critical)
            .sector("Banking")
            .attack_vector("Phishing")
            .date(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
            .build(),
        IncidentRecord::builder("Core banking encrypted", "Branches offline")
            .id("2")
            .severity(Severity::High)
            .sector("Banking")
            .attack_vector("Ransomware")
            .date(Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap())
            .build(),
        IncidentRecord::builder("Clinic mailbox lure", "Staff credentials harvested")
            .id("3")
            .severity(Severity::Medium)
            .sector("Healthcare")
            .attack_vector("Phishing")
            .date(Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap())
            .build(),
    ]
}

#[test]
fn test_three_incident_scenario() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let snapshot = aggregate(&scenario(), TimeRange::All, now);

    assert_eq!(snapshot.incidents_by_sector["Banking"], 2);
    assert_eq!(snapshot.incidents_by_sector["Healthcare"], 1);
    assert_eq!(snapshot.incidents_by_attack_vector["Phishing"], 2);
    assert_eq!(snapshot.incidents_by_attack_vector["Ransomware"], 1);
    assert_eq!(snapshot.incidents_by_severity.values().sum::<u64>(), 3);

    let matrix = &snapshot.sector_vulnerability_matrix;
    assert_eq!(matrix.cell("Banking", "Phishing"), Some(1));
    assert_eq!(matrix.cell("Banking", "Ransomware"), Some(1));
    assert_eq!(matrix.cell("Healthcare", "Phishing"), Some(1));
    assert_eq!(matrix.cell("Healthcare", "Ransomware"), Some(0));

    let trend = describe_trend(&snapshot.incidents_by_month);
    assert!(trend.contains("significant increase (100.0%)"));
}

#[test]
fn test_classify_and_extract_together() {
    let title = "Critical ransomware at hospital";
    let description = "Contact 185.193.38.54 or secureupdate.tech, hash b8c9e2c2a8b45f0c9e3e3e3e3e3e3e3e";

    let classification = classify(title, description);
    assert_eq!(classification.sector, "Healthcare");
    assert_eq!(classification.severity, Severity::Critical);
    assert_eq!(classification.attack_vector.as_deref(), Some("Ransomware"));

    let iocs = extract_iocs(description);
    assert!(iocs.contains("185.193.38.54"));
    assert!(iocs.contains("secureupdate.tech"));
    assert!(iocs.contains("b8c9e2c2a8b45f0c9e3e3e3e3e3e3e3e"));
}

#[tokio::test]
async fn test_ingest_enrich_and_report_from_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("incidents.json");
    let store = Arc::new(JsonFileStore::open(&path, true).await.unwrap());
    let now = Utc::now();

    let inputs = [
        ("Ransomware hits regional hospital", "LockBit ransomware encrypted patient records", "high"),
        ("Hospital ransomware follow-up", "Patient records encrypted, backups wiped", "critical"),
        ("Bank phishing wave", "Credential phishing against payment staff", "medium"),
    ];

    for (title, description, severity) in inputs {
        let new = NewIncident {
            title: title.to_string(),
            description: description.to_string(),
            severity: severity.to_string(),
            ..Default::default()
        };
        let record = IncidentRecord::from_new(new, now).unwrap();
        store.insert_incident(record).await.unwrap();
    }

    let pipeline = EnrichmentPipeline::new(store.clone(), &Config::default_config());
    let stats = pipeline.process_unanalyzed().await.unwrap();
    assert_eq!(stats.enriched, 3);

    let reopened = JsonFileStore::open(&path, false).await.unwrap();
    let incidents = reopened.list_incidents().await.unwrap();
    assert!(incidents.iter().all(|i| i.processed));

    let hospital = incidents
        .iter()
        .find(|i| i.title.starts_with("Ransomware hits"))
        .unwrap();
    assert_eq!(hospital.sector.as_deref(), Some("Healthcare"));
    assert_eq!(hospital.severity, Some(Severity::High));
    assert_eq!(hospital.threat_actors[0].name, "LockBit");
    assert_eq!(hospital.similar_incidents.len(), 1);
    assert!(hospital.similar_incidents.iter().all(|s| s.id != hospital.id));

    let report = AnalyticsReport::build(&incidents, TimeRange::OneMonth, now);
    assert_eq!(report.snapshot.total_incidents, 3);
    assert_eq!(report.statistics.sectors_affected, 2);
    assert_eq!(report.snapshot.incidents_by_threat_actor["LockBit"], 1);
}

#[tokio::test]
async fn test_duplicate_ingestion_returns_existing_id() {
    let store = MemoryStore::new();
    let record = || {
        IncidentRecord::builder("Port authority breach", "Cargo manifests leaked")
            .source("CISA")
            .build()
    };

    let first = store.insert_incident(record()).await.unwrap();
    let second = store.insert_incident(record()).await.unwrap();

    assert_eq!(second, InsertOutcome::Duplicate(first.id().to_string()));
    assert_eq!(store.list_incidents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_manual_entries_with_same_title_both_persist() {
    let store = MemoryStore::new();
    let now = Utc::now();

    for description in ["Payroll credential lure", "Fake invoice attachment"] {
        let new = NewIncident {
            title: "Phishing attack".to_string(),
            description: description.to_string(),
            severity: "medium".to_string(),
            ..Default::default()
        };
        let outcome = store
            .insert_incident(IncidentRecord::from_new(new, now).unwrap())
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());
    }

    assert_eq!(store.list_incidents().await.unwrap().len(), 2);
}

struct UnavailableStore;

#[async_trait]
impl IncidentStore for UnavailableStore {
    async fn list_incidents(&self) -> Result<Vec<IncidentRecord>> {
        Err(AnalyticsError::Enrichment("connection refused".to_string()))
    }

    async fn get_incident(&self, _id: &str) -> Result<Option<IncidentRecord>> {
        Ok(None)
    }

    async fn insert_incident(&self, _record: IncidentRecord) -> Result<InsertOutcome> {
        Err(AnalyticsError::Enrichment("connection refused".to_string()))
    }

    async fn update_incident(&self, _record: IncidentRecord) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_similarity_fails_open_on_store_error() {
    let matcher = SimilarityMatcher::default();
    let similar = find_similar_in_store(
        &UnavailableStore,
        &matcher,
        "x",
        "Ransomware attack on hospital",
        "records encrypted",
    )
    .await;

    assert!(similar.is_empty());
}

/// Serves a single record but stalls on corpus fetches.
struct SlowCorpusStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl IncidentStore for SlowCorpusStore {
    async fn list_incidents(&self) -> Result<Vec<IncidentRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_incidents().await
    }

    async fn get_incident(&self, id: &str) -> Result<Option<IncidentRecord>> {
        self.inner.get_incident(id).await
    }

    async fn insert_incident(&self, record: IncidentRecord) -> Result<InsertOutcome> {
        self.inner.insert_incident(record).await
    }

    async fn update_incident(&self, record: IncidentRecord) -> Result<()> {
        self.inner.update_incident(record).await
    }
}

#[tokio::test]
async fn test_background_enrichment_timeout_records_error() {
    let original = IncidentRecord::builder("Grid ransomware", "Substation HMI encrypted")
        .id("slow-1")
        .build();
    let store = Arc::new(SlowCorpusStore {
        inner: MemoryStore::with_incidents(vec![original]),
        delay: Duration::from_secs(5),
    });

    let pipeline = EnrichmentPipeline::new(store.clone(), &Config::default_config())
        .with_timeout(Duration::from_millis(50));
    let handle = tokio::spawn(async move { pipeline.enrich_incident("slow-1").await });

    assert_eq!(
        handle.await.unwrap(),
        EnrichmentOutcome::TimedOut("slow-1".to_string())
    );

    let record = store.get_incident("slow-1").await.unwrap().unwrap();
    assert!(record.processed);
    assert!(record.enrichment_error.is_some());
    assert!(record.similar_incidents.is_empty());
    assert_eq!(record.sector, None);
}

#[tokio::test]
async fn test_spawned_enrichment_does_not_block_creation() {
    let store = Arc::new(MemoryStore::new());
    let id = store
        .insert_incident(
            IncidentRecord::builder("DDoS on airport systems", "Check-in kiosks unreachable").build(),
        )
        .await
        .unwrap()
        .id()
        .to_string();

    let handle = spawn_enrichment(store.clone(), id.clone(), &Config::default_config());
    let stored = store.get_incident(&id).await.unwrap();
    assert!(stored.is_some());

    assert_eq!(handle.await.unwrap(), EnrichmentOutcome::Enriched(id.clone()));
    let enriched = store.get_incident(&id).await.unwrap().unwrap();
    assert_eq!(enriched.attack_vector.as_deref(), Some("DDoS"));
    assert_eq!(enriched.sector.as_deref(), Some("Transportation"));
}
