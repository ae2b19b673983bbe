// file: src/analytics/similarity.rs
// description: keyword overlap similarity between an incident and a corpus
// reference: naive related-document lookup

use crate::config::SimilarityConfig;
use crate::models::{IncidentRecord, SimilarIncident};
use crate::store::IncidentStore;
use tracing::{debug, warn};

const MIN_KEYWORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "the", "and", "a", "an", "in", "on", "at", "to", "for", "of", "with", "by", "is", "was",
    "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "but", "or", "as",
    "if", "while", "because", "so", "than", "that", "this", "these", "those", "then", "not", "no",
    "such", "when", "which", "who", "whom", "whose", "what", "where", "why", "how",
];

/// Lowercased, de-duplicated keywords of `title + " " + description` in
/// first-seen order. Punctuation splits words; words of three characters or
/// fewer and stop words are dropped.
pub fn extract_keywords(title: &str, description: &str) -> Vec<String> {
    let cleaned: String = format!("{} {}", title, description)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.len() < MIN_KEYWORD_LEN || STOP_WORDS.contains(&word) {
            continue;
        }
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatcher {
    threshold: f64,
    limit: usize,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(SimilarityConfig::default())
    }
}

impl SimilarityMatcher {
    pub fn new(config: SimilarityConfig) -> Self {
        Self {
            threshold: config.threshold,
            limit: config.limit,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Scores every corpus record other than `target_id` by the fraction of
    /// target keywords found in its text. Results above the threshold come
    /// back highest first, at most `limit` of them.
    pub fn find_similar(
        &self,
        target_id: &str,
        title: &str,
        description: &str,
        corpus: &[IncidentRecord],
    ) -> Vec<SimilarIncident> {
        let keywords = extract_keywords(title, description);
        if keywords.is_empty() {
            debug!("No keywords for incident {}, skipping similarity", target_id);
            return Vec::new();
        }

        let total = keywords.len() as f64;
        let mut matches: Vec<SimilarIncident> = corpus
            .iter()
            .filter(|candidate| candidate.id != target_id)
            .filter_map(|candidate| {
                let text = candidate.text().to_lowercase();
                let hits = keywords.iter().filter(|k| text.contains(k.as_str())).count();
                let similarity = hits as f64 / total;

                (similarity > self.threshold).then(|| SimilarIncident {
                    id: candidate.id.clone(),
                    title: candidate.title.clone(),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(self.limit);
        matches
    }
}

pub fn find_similar(
    target_id: &str,
    title: &str,
    description: &str,
    corpus: &[IncidentRecord],
    limit: usize,
) -> Vec<SimilarIncident> {
    SimilarityMatcher::default()
        .with_limit(limit)
        .find_similar(target_id, title, description, corpus)
}

/// Fetches the corpus from `store` and matches against it. A failed fetch
/// is logged and yields no matches.
pub async fn find_similar_in_store<S: IncidentStore + ?Sized>(
    store: &S,
    matcher: &SimilarityMatcher,
    target_id: &str,
    title: &str,
    description: &str,
) -> Vec<SimilarIncident> {
    match store.list_incidents().await {
        Ok(corpus) => matcher.find_similar(target_id, title, description, &corpus),
        Err(e) => {
            warn!("Error finding similar incidents for {}: {}", target_id, e);
            Vec::new()
        }
    }
}
