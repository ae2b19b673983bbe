// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod analytics;
pub mod classifier;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod importer;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod utils;

pub use analytics::{
    SearchFilter, SimilarityMatcher, aggregate, all_sectors, daily_trend, describe_trend,
    find_similar, incident_statistics, recommend, search_incidents,
};
pub use classifier::{KeywordClassifier, ThreatActorIdentifier, classify, identify_threat_actors};
pub use config::{AnalyticsConfig, Config, EnrichmentConfig, SimilarityConfig, StoreConfig};
pub use error::{AnalyticsError, Result};
pub use exporter::json::{AnalyticsReport, ExportManifest, JsonExporter};
pub use extractor::{IocExtractor, extract_iocs};
pub use importer::{CsvBatch, CsvImporter, ImportSummary, RowError, import_batch};
pub use models::{
    AnalyticsSnapshot, Classification, IncidentRecord, IncidentStatistics, NewIncident, Severity,
    SimilarIncident, Status, ThreatActor, TimeRange,
};
pub use pipeline::{
    Enricher, EnrichmentOutcome, EnrichmentPipeline, EnrichmentStats, ProgressTracker,
    spawn_enrichment,
};
pub use store::{IncidentStore, InsertOutcome, JsonFileStore, MemoryStore, RecordUpdate};
pub use utils::{OperationTimer, Validator};
