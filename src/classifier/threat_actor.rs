// file: src/classifier/threat_actor.rs
// description: rule-based threat actor attribution from incident text
// reference: keyword attribution tables

use crate::models::ThreatActor;

struct ActorRule {
    keywords: &'static [&'static str],
    name: &'static str,
    confidence: f64,
    motivation: &'static str,
    sophistication: &'static str,
    country: &'static str,
}

impl ActorRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }

    fn to_actor(&self) -> ThreatActor {
        ThreatActor::new(self.name, self.confidence).with_attributes(
            self.motivation,
            self.sophistication,
            self.country,
        )
    }
}

const APT_MARKERS: &[&str] = &["apt", "advanced persistent threat"];
const RANSOMWARE_MARKERS: &[&str] = &["ransomware"];
const CREDENTIAL_MARKERS: &[&str] = &["credential", "password"];

const APT_RULES: &[ActorRule] = &[
    ActorRule {
        keywords: &["china", "chinese"],
        name: "APT1",
        confidence: 0.75,
        motivation: "Espionage",
        sophistication: "High",
        country: "China",
    },
    ActorRule {
        keywords: &["russia", "russian"],
        name: "APT28",
        confidence: 0.78,
        motivation: "Political",
        sophistication: "High",
        country: "Russia",
    },
    ActorRule {
        keywords: &["north korea", "dprk"],
        name: "Lazarus Group",
        confidence: 0.82,
        motivation: "Financial",
        sophistication: "High",
        country: "North Korea",
    },
];

const RANSOMWARE_RULES: &[ActorRule] = &[
    ActorRule {
        keywords: &["ryuk"],
        name: "Wizard Spider",
        confidence: 0.88,
        motivation: "Financial",
        sophistication: "High",
        country: "Russia",
    },
    ActorRule {
        keywords: &["lockbit"],
        name: "LockBit",
        confidence: 0.9,
        motivation: "Financial",
        sophistication: "High",
        country: "Unknown",
    },
    ActorRule {
        keywords: &["conti"],
        name: "Conti",
        confidence: 0.85,
        motivation: "Financial",
        sophistication: "High",
        country: "Russia",
    },
];

const PHISHING_CREDENTIAL_RULE: ActorRule = ActorRule {
    keywords: CREDENTIAL_MARKERS,
    name: "TA505",
    confidence: 0.72,
    motivation: "Financial",
    sophistication: "Medium",
    country: "Unknown",
};

// Only consulted when nothing more specific matched.
const FALLBACK_RULES: &[ActorRule] = &[
    ActorRule {
        keywords: &["financial", "bank", "money"],
        name: "Unknown Financial Threat Actor",
        confidence: 0.6,
        motivation: "Financial",
        sophistication: "Unknown",
        country: "Unknown",
    },
    ActorRule {
        keywords: &["espionage", "government", "classified"],
        name: "Unknown State-Sponsored Actor",
        confidence: 0.65,
        motivation: "Espionage",
        sophistication: "High",
        country: "Unknown",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatActorIdentifier;

impl ThreatActorIdentifier {
    pub fn new() -> Self {
        Self
    }

    pub fn identify(
        &self,
        title: &str,
        description: &str,
        attack_vector: Option<&str>,
    ) -> Vec<ThreatActor> {
        let text = format!("{} {}", title, description).to_lowercase();
        let mut actors = Vec::new();

        if contains_any(&text, APT_MARKERS)
            && let Some(rule) = APT_RULES.iter().find(|r| r.matches(&text))
        {
            actors.push(rule.to_actor());
        }

        if contains_any(&text, RANSOMWARE_MARKERS)
            && let Some(rule) = RANSOMWARE_RULES.iter().find(|r| r.matches(&text))
        {
            actors.push(rule.to_actor());
        }

        if attack_vector == Some("Phishing") && PHISHING_CREDENTIAL_RULE.matches(&text) {
            actors.push(PHISHING_CREDENTIAL_RULE.to_actor());
        }

        if actors.is_empty()
            && let Some(rule) = FALLBACK_RULES.iter().find(|r| r.matches(&text))
        {
            actors.push(rule.to_actor());
        }

        actors
    }
}

pub fn identify_threat_actors(
    title: &str,
    description: &str,
    attack_vector: Option<&str>,
) -> Vec<ThreatActor> {
    ThreatActorIdentifier::new().identify(title, description, attack_vector)
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}
