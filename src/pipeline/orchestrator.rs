// file: src/pipeline/orchestrator.rs
// description: coordinates background and batch enrichment against an incident store
// reference: orchestrates asynchronous enrichment workflow

use crate::analytics::find_similar_in_store;
use crate::config::Config;
use crate::error::{AnalyticsError, Result};
use crate::models::IncidentRecord;
use crate::pipeline::processor::{Enricher, merge_derived};
use crate::pipeline::progress::{EnrichmentStats, ProgressTracker};
use crate::store::{IncidentStore, RecordUpdate};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Enriched(String),
    Failed { id: String, reason: String },
    TimedOut(String),
}

impl EnrichmentOutcome {
    pub fn id(&self) -> &str {
        match self {
            EnrichmentOutcome::Enriched(id) | EnrichmentOutcome::TimedOut(id) => id,
            EnrichmentOutcome::Failed { id, .. } => id,
        }
    }

    fn failed(id: &str, reason: impl ToString) -> Self {
        EnrichmentOutcome::Failed {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub struct EnrichmentPipeline<S: IncidentStore + ?Sized> {
    store: Arc<S>,
    enricher: Enricher,
    timeout: Duration,
    parallel_workers: usize,
    show_progress: bool,
}

impl<S: IncidentStore + ?Sized + 'static> EnrichmentPipeline<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            enricher: Enricher::new(config.similarity),
            timeout: config.enrichment.timeout(),
            parallel_workers: config.enrichment.parallel_workers.max(1),
            show_progress: config.enrichment.show_progress,
        }
    }

    /// Overrides the bound on the corpus fetch and similarity step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enriches one stored incident and writes it back exactly once.
    pub async fn enrich_incident(&self, id: &str) -> EnrichmentOutcome {
        match self.store.get_incident(id).await {
            Ok(Some(record)) => self.enrich_record(record).await,
            Ok(None) => EnrichmentOutcome::failed(id, AnalyticsError::NotFound(id.to_string())),
            Err(e) => {
                warn!("Failed to load incident {}: {}", id, e);
                EnrichmentOutcome::failed(id, e)
            }
        }
    }

    /// Derives fields from the loaded snapshot, then merges them into the
    /// current stored version with a single `update_with` call.
    async fn enrich_record(&self, snapshot: IncidentRecord) -> EnrichmentOutcome {
        let id = snapshot.id.clone();
        let mut record = self.enricher.analyze(snapshot);

        let lookup = find_similar_in_store(
            self.store.as_ref(),
            self.enricher.matcher(),
            &record.id,
            &record.title,
            &record.description,
        );
        let similar = tokio::time::timeout(self.timeout, lookup).await;

        let (update, outcome) = match similar {
            Ok(similar) => {
                self.enricher.finish(&mut record, similar, Utc::now());
                let update: RecordUpdate =
                    Box::new(move |current: &mut IncidentRecord| merge_derived(current, record));
                (update, EnrichmentOutcome::Enriched(id.clone()))
            }
            Err(_) => {
                let err = AnalyticsError::Timeout(self.timeout);
                warn!("Enrichment of incident {} discarded: {}", id, err);

                let processed_at = Utc::now();
                let message = err.to_string();
                let update: RecordUpdate = Box::new(move |current: &mut IncidentRecord| {
                    current.processed = true;
                    current.processed_at = Some(processed_at);
                    current.enrichment_error = Some(message);
                });
                (update, EnrichmentOutcome::TimedOut(id.clone()))
            }
        };

        match self.store.update_with(&id, update).await {
            Ok(()) => outcome,
            Err(e) => {
                error!("Failed to write back incident {}: {}", id, e);
                EnrichmentOutcome::failed(&id, e)
            }
        }
    }

    /// Enriches every record not yet processed, `parallel_workers` at a time.
    pub async fn process_unanalyzed(&self) -> Result<EnrichmentStats> {
        let pending = self.store.list_unprocessed().await?;
        info!("Found {} unprocessed incidents", pending.len());

        if pending.is_empty() {
            return Ok(EnrichmentStats::new());
        }

        let progress = ProgressTracker::with_visibility(pending.len(), self.show_progress);
        let tracker = &progress;

        info!(
            "Enriching incidents with {} concurrent tasks...",
            self.parallel_workers
        );

        stream::iter(pending)
            .map(|record| async move {
                tracker.set_message(format!("Enriching {}", record.title));
                let outcome = self.enrich_record(record).await;
                tracker.record(&outcome);
                outcome
            })
            .buffer_unordered(self.parallel_workers)
            .for_each(|_| async {})
            .await;

        let stats = progress.get_stats();
        progress.finish();

        log_final_stats(&stats);
        Ok(stats)
    }
}

/// Fire-and-forget enrichment of a freshly stored incident. The caller may
/// drop the handle; the record is updated whenever the task completes.
pub fn spawn_enrichment<S>(
    store: Arc<S>,
    id: impl Into<String>,
    config: &Config,
) -> JoinHandle<EnrichmentOutcome>
where
    S: IncidentStore + ?Sized + 'static,
{
    let pipeline = EnrichmentPipeline::new(store, config);
    let id = id.into();
    tokio::spawn(async move { pipeline.enrich_incident(&id).await })
}

fn log_final_stats(stats: &EnrichmentStats) {
    info!("=== Enrichment Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Incidents enriched: {}", stats.enriched);
    info!("Incidents failed: {}", stats.failed);
    info!("Incidents timed out: {}", stats.timed_out);
    info!("Success rate: {:.2}%", stats.success_rate());
    info!(
        "Processing speed: {:.2} incidents/sec",
        stats.incidents_per_second()
    );
    info!("==========================");
}
