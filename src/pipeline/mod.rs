// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod processor;
mod progress;

pub use orchestrator::{EnrichmentOutcome, EnrichmentPipeline, spawn_enrichment};
pub use processor::{Enricher, merge_derived};
pub use progress::{EnrichmentStats, ProgressTracker};
