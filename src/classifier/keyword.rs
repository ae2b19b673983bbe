// file: src/classifier/keyword.rs
// description: keyword-based incident classification over title and description
// reference: configurable first-match classification

use crate::classifier::rules::{
    ATTACK_VECTOR_RULES, SECTOR_DEFAULT, SECTOR_DEFAULT_CONFIDENCE, SECTOR_RULES,
    SEVERITY_DEFAULT, SEVERITY_DEFAULT_CONFIDENCE, SEVERITY_RULES, first_match,
};
use crate::models::Classification;

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Labels sector, severity and attack vector from the case-folded
    /// `title + " " + description`.
    ///
    /// Unmatched sector falls back to `"Unknown"` (confidence 0.6) and
    /// unmatched severity to medium (0.7); both always count towards the
    /// overall confidence. Attack vector is omitted when nothing matches and
    /// then does not contribute.
    pub fn classify(&self, title: &str, description: &str) -> Classification {
        let text = format!("{} {}", title, description).to_lowercase();

        let (sector, sector_confidence) = match first_match(SECTOR_RULES, &text) {
            Some(rule) => (rule.label, rule.confidence),
            None => (SECTOR_DEFAULT, SECTOR_DEFAULT_CONFIDENCE),
        };

        let (severity, severity_confidence) = match first_match(SEVERITY_RULES, &text) {
            Some(rule) => (rule.label, rule.confidence),
            None => (SEVERITY_DEFAULT, SEVERITY_DEFAULT_CONFIDENCE),
        };

        let attack_vector = first_match(ATTACK_VECTOR_RULES, &text);

        let mut confidences = vec![sector_confidence, severity_confidence];
        if let Some(rule) = attack_vector {
            confidences.push(rule.confidence);
        }
        let confidence = confidences.iter().sum::<f64>() / confidences.len() as f64;

        Classification {
            sector: sector.to_string(),
            severity,
            attack_vector: attack_vector.map(|rule| rule.label.to_string()),
            confidence,
        }
    }
}

pub fn classify(title: &str, description: &str) -> Classification {
    KeywordClassifier::new().classify(title, description)
}
