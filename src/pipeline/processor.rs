// file: src/pipeline/processor.rs
// description: derives classification, indicators, actors and related incidents for a record
// reference: runs classifiers and extractors over a single incident

use crate::analytics::SimilarityMatcher;
use crate::classifier::{KeywordClassifier, ThreatActorIdentifier};
use crate::config::SimilarityConfig;
use crate::extractor::IocExtractor;
use crate::models::{IncidentRecord, SimilarIncident};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Fills the derived fields of an incident. Values already present on the
/// record take precedence over classifier output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enricher {
    classifier: KeywordClassifier,
    extractor: IocExtractor,
    actors: ThreatActorIdentifier,
    matcher: SimilarityMatcher,
}

impl Enricher {
    pub fn new(similarity: SimilarityConfig) -> Self {
        Self {
            matcher: SimilarityMatcher::new(similarity),
            ..Default::default()
        }
    }

    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Full enrichment against an in-memory corpus.
    pub fn enrich(
        &self,
        record: IncidentRecord,
        corpus: &[IncidentRecord],
        now: DateTime<Utc>,
    ) -> IncidentRecord {
        let mut record = self.analyze(record);
        let similar = self.similar_to(&record, corpus);
        self.finish(&mut record, similar, now);
        record
    }

    /// Text-only step: classification, indicators and threat actors.
    pub fn analyze(&self, mut record: IncidentRecord) -> IncidentRecord {
        let classification = self.classifier.classify(&record.title, &record.description);

        if record.sector_label().is_none() {
            record.sector = Some(classification.sector);
        }
        if record.severity.is_none() {
            record.severity = Some(classification.severity);
        }
        if record.attack_vector_label().is_none() {
            record.attack_vector = classification.attack_vector;
        }
        record.classification_confidence = Some(classification.confidence);

        let text = record.text();
        record.indicators.extend(self.extractor.extract_iocs(&text));

        if record.threat_actors.is_empty() {
            record.threat_actors = self.actors.identify(
                &record.title,
                &record.description,
                record.attack_vector_label(),
            );
        }

        debug!(
            "Analyzed incident {}: {} indicators, {} actors",
            record.id,
            record.indicators.len(),
            record.threat_actors.len()
        );

        record
    }

    pub fn similar_to(
        &self,
        record: &IncidentRecord,
        corpus: &[IncidentRecord],
    ) -> Vec<SimilarIncident> {
        self.matcher
            .find_similar(&record.id, &record.title, &record.description, corpus)
    }

    pub fn finish(
        &self,
        record: &mut IncidentRecord,
        similar: Vec<SimilarIncident>,
        now: DateTime<Utc>,
    ) {
        record.similar_incidents = similar
            .into_iter()
            .filter(|s| s.id != record.id)
            .collect();
        record.processed = true;
        record.processed_at = Some(now);
        record.enrichment_error = None;
    }
}

/// Copies the derived fields of `enriched` onto `current`, the latest stored
/// version of the same incident. Fields that gained a value on `current`
/// while enrichment ran are kept.
pub fn merge_derived(current: &mut IncidentRecord, enriched: IncidentRecord) {
    if current.sector_label().is_none() {
        current.sector = enriched.sector;
    }
    if current.severity.is_none() {
        current.severity = enriched.severity;
    }
    if current.attack_vector_label().is_none() {
        current.attack_vector = enriched.attack_vector;
    }
    current.classification_confidence = enriched.classification_confidence;
    current.indicators.extend(enriched.indicators);
    if current.threat_actors.is_empty() {
        current.threat_actors = enriched.threat_actors;
    }
    current.similar_incidents = enriched.similar_incidents;
    current.processed = enriched.processed;
    current.processed_at = enriched.processed_at;
    current.enrichment_error = enriched.enrichment_error;
}
