// file: src/classifier/rules.rs
// description: ordered keyword rule tables for sector, severity and attack vector
// reference: first-match keyword classification

use crate::models::Severity;

pub const SECTOR_DEFAULT: &str = "Unknown";
pub const SECTOR_DEFAULT_CONFIDENCE: f64 = 0.6;
pub const SEVERITY_DEFAULT: Severity = Severity::Medium;
pub const SEVERITY_DEFAULT_CONFIDENCE: f64 = 0.7;

/// One row of a rule table. Tables are evaluated top to bottom and the
/// first rule with any keyword contained in the text wins.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<L> {
    pub keywords: &'static [&'static str],
    pub label: L,
    pub confidence: f64,
}

impl<L> KeywordRule<L> {
    /// `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

pub fn first_match<'a, L>(rules: &'a [KeywordRule<L>], text: &str) -> Option<&'a KeywordRule<L>> {
    rules.iter().find(|rule| rule.matches(text))
}

pub const SECTOR_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        keywords: &["bank", "finance", "payment"],
        label: "Banking & Finance",
        confidence: 0.85,
    },
    KeywordRule {
        keywords: &["power", "electricity", "grid"],
        label: "Power & Energy",
        confidence: 0.82,
    },
    KeywordRule {
        keywords: &["hospital", "healthcare", "medical"],
        label: "Healthcare",
        confidence: 0.88,
    },
    KeywordRule {
        keywords: &["transport", "railway", "airport"],
        label: "Transportation",
        confidence: 0.79,
    },
    KeywordRule {
        keywords: &["government", "ministry", "department"],
        label: "Government",
        confidence: 0.81,
    },
    KeywordRule {
        keywords: &["telecom", "communication", "network"],
        label: "Telecommunications",
        confidence: 0.83,
    },
];

// critical is checked before high, high before low
pub const SEVERITY_RULES: &[KeywordRule<Severity>] = &[
    KeywordRule {
        keywords: &["critical", "severe", "breach", "leak"],
        label: Severity::Critical,
        confidence: 0.9,
    },
    KeywordRule {
        keywords: &["high", "major", "significant"],
        label: Severity::High,
        confidence: 0.85,
    },
    KeywordRule {
        keywords: &["low", "minor", "small"],
        label: Severity::Low,
        confidence: 0.8,
    },
];

pub const ATTACK_VECTOR_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        keywords: &["phishing"],
        label: "Phishing",
        confidence: 0.92,
    },
    KeywordRule {
        keywords: &["ransomware"],
        label: "Ransomware",
        confidence: 0.95,
    },
    KeywordRule {
        keywords: &["ddos", "denial of service"],
        label: "DDoS",
        confidence: 0.88,
    },
    KeywordRule {
        keywords: &["sql injection", "sqli"],
        label: "SQL Injection",
        confidence: 0.9,
    },
    KeywordRule {
        keywords: &["xss", "cross site"],
        label: "Cross-Site Scripting",
        confidence: 0.87,
    },
];
