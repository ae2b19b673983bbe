// file: src/models/incident.rs
// description: Incident record model with closed severity/status enums and lenient read-back
// reference: Threat intelligence incident tracking

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(AnalyticsError::Validation(format!(
                "Unknown severity: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    Investigating,
    Resolved,
    FalsePositive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Investigating => "investigating",
            Status::Resolved => "resolved",
            Status::FalsePositive => "false_positive",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Status::New | Status::Investigating)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "new" => Ok(Status::New),
            "investigating" => Ok(Status::Investigating),
            "resolved" => Ok(Status::Resolved),
            "false_positive" => Ok(Status::FalsePositive),
            other => Err(AnalyticsError::Validation(format!(
                "Unknown status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatActorAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sophistication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatActor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ThreatActorAttributes>,
}

impl ThreatActor {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, motivation: &str, sophistication: &str, country: &str) -> Self {
        self.attributes = Some(ThreatActorAttributes {
            motivation: Some(motivation.to_string()),
            sophistication: Some(sophistication.to_string()),
            country: Some(country.to_string()),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIncident {
    pub id: String,
    pub title: String,
    pub similarity: f64,
}

/// A stored incident. Enum fields read back from storage are lenient:
/// unknown or malformed values deserialize to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub status: Option<Status>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub attack_vector: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub indicators: BTreeSet<String>,
    #[serde(default)]
    pub affected_systems: Vec<String>,
    #[serde(default)]
    pub threat_actors: Vec<ThreatActor>,
    #[serde(default)]
    pub similar_incidents: Vec<SimilarIncident>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_confidence: Option<f64>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

impl IncidentRecord {
    /// Converts validated ingestion input into a record. The id is left
    /// empty for the store to assign.
    pub fn from_new(new: NewIncident, now: DateTime<Utc>) -> Result<Self> {
        crate::utils::Validator::validate_new_incident(&new)?;

        let severity = new.severity.parse::<Severity>()?;
        let status = match new.status.as_deref() {
            Some(raw) => raw.parse::<Status>()?,
            None => Status::New,
        };

        Ok(Self {
            id: String::new(),
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            severity: Some(severity),
            status: Some(status),
            sector: non_empty(new.sector),
            source: non_empty(new.source),
            source_url: non_empty(new.source_url),
            attack_vector: non_empty(new.attack_vector),
            date: Some(new.date.unwrap_or(now)),
            indicators: new.indicators.into_iter().collect(),
            affected_systems: new.affected_systems,
            threat_actors: new.threat_actors,
            similar_incidents: Vec::new(),
            classification_confidence: None,
            processed: false,
            processed_at: None,
            collected_at: Some(now),
            enrichment_error: None,
        })
    }

    pub fn builder(title: impl Into<String>, description: impl Into<String>) -> IncidentBuilder {
        IncidentBuilder::new(title.into(), description.into())
    }

    pub fn sector_label(&self) -> Option<&str> {
        self.sector.as_deref().filter(|s| !s.is_empty())
    }

    pub fn attack_vector_label(&self) -> Option<&str> {
        self.attack_vector.as_deref().filter(|s| !s.is_empty())
    }

    /// Title and description joined by a single space.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Identity used for duplicate detection on insert. Only collected
    /// records carry one; without a source there is nothing to compare.
    pub fn fingerprint(&self) -> Option<String> {
        let source = self.source.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

        let mut hasher = Sha256::new();
        hasher.update(self.title.trim().to_lowercase().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(source.to_lowercase().as_bytes());
        Some(format!("{:x}", hasher.finalize()))
    }
}

/// Loosely typed ingestion input, as produced by entry forms or imports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub severity: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub attack_vector: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub affected_systems: Vec<String>,
    #[serde(default)]
    pub threat_actors: Vec<ThreatActor>,
}

pub struct IncidentBuilder {
    record: IncidentRecord,
}

impl IncidentBuilder {
    pub fn new(title: String, description: String) -> Self {
        Self {
            record: IncidentRecord {
                id: String::new(),
                title,
                description,
                severity: None,
                status: None,
                sector: None,
                source: None,
                source_url: None,
                attack_vector: None,
                date: None,
                indicators: BTreeSet::new(),
                affected_systems: Vec::new(),
                threat_actors: Vec::new(),
                similar_incidents: Vec::new(),
                classification_confidence: None,
                processed: false,
                processed_at: None,
                collected_at: None,
                enrichment_error: None,
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.record.id = id.to_string();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.record.severity = Some(severity);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.record.status = Some(status);
        self
    }

    pub fn sector(mut self, sector: &str) -> Self {
        self.record.sector = Some(sector.to_string());
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.record.source = Some(source.to_string());
        self
    }

    pub fn attack_vector(mut self, attack_vector: &str) -> Self {
        self.record.attack_vector = Some(attack_vector.to_string());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.record.date = Some(date);
        self
    }

    pub fn indicator(mut self, indicator: &str) -> Self {
        self.record.indicators.insert(indicator.to_string());
        self
    }

    pub fn threat_actor(mut self, actor: ThreatActor) -> Self {
        self.record.threat_actors.push(actor);
        self
    }

    pub fn processed(mut self, processed: bool) -> Self {
        self.record.processed = processed;
        self
    }

    pub fn build(self) -> IncidentRecord {
        self.record
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lenient_parse<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<T>().ok()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value::<DateTime<Utc>>(value).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_incident_builder() {
        let incident = IncidentRecord::builder("Test Hack", "Exchange drained")
            .id("abc")
            .severity(Severity::High)
            .sector("Banking & Finance")
            .indicator("1.2.3.4")
            .indicator("1.2.3.4")
            .build();

        assert_eq!(incident.title, "Test Hack");
        assert_eq!(incident.severity, Some(Severity::High));
        assert_eq!(incident.indicators.len(), 1);
    }

    #[test]
    fn test_lenient_read_back() {
        let json = r#"{
            "id": "x1",
            "title": "Outage",
            "description": "Grid down",
            "severity": "catastrophic",
            "status": 7,
            "date": "not a date",
            "sector": ""
        }"#;

        let record: IncidentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.severity, None);
        assert_eq!(record.status, None);
        assert_eq!(record.date, None);
        assert_eq!(record.sector_label(), None);
    }

    #[test]
    fn test_round_trip_known_values() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let record = IncidentRecord::builder("Phish", "Credential theft")
            .id("p1")
            .severity(Severity::Critical)
            .status(Status::FalsePositive)
            .date(date)
            .build();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"false_positive\""));
        let back: IncidentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_from_new_rejects_unknown_severity() {
        let new = NewIncident {
            title: "Title".to_string(),
            description: "Description".to_string(),
            severity: "extreme".to_string(),
            ..Default::default()
        };

        assert!(IncidentRecord::from_new(new, Utc::now()).is_err());
    }

    #[test]
    fn test_from_new_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let new = NewIncident {
            title: " Ransomware at port ".to_string(),
            description: "Systems encrypted".to_string(),
            severity: "HIGH".to_string(),
            sector: Some("  ".to_string()),
            indicators: vec!["a.com".to_string(), "a.com".to_string()],
            ..Default::default()
        };

        let record = IncidentRecord::from_new(new, now).unwrap();
        assert_eq!(record.title, "Ransomware at port");
        assert_eq!(record.severity, Some(Severity::High));
        assert_eq!(record.status, Some(Status::New));
        assert_eq!(record.sector, None);
        assert_eq!(record.date, Some(now));
        assert_eq!(record.indicators.len(), 1);
        assert!(!record.processed);
    }

    #[test]
    fn test_fingerprint_ignores_case() {
        let a = IncidentRecord::builder("Bank Breach", "x").source("CERT").build();
        let b = IncidentRecord::builder("bank breach ", "y").source("cert").build();
        let c = IncidentRecord::builder("bank breach", "y").source("news").build();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_requires_source() {
        let manual = IncidentRecord::builder("Phishing attack", "x").build();
        let blank = IncidentRecord::builder("Phishing attack", "x").source("  ").build();

        assert_eq!(manual.fingerprint(), None);
        assert_eq!(blank.fingerprint(), None);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("false-positive".parse::<Status>().unwrap(), Status::FalsePositive);
        assert!(Status::Investigating.is_open());
        assert!(!Status::Resolved.is_open());
        assert!("verified".parse::<Status>().is_err());
    }
}
