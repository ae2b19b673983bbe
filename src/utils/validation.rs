// file: src/utils/validation.rs
// description: ingestion input validation utilities and helpers
// reference: input validation patterns

use crate::error::{AnalyticsError, Result};
use crate::models::{NewIncident, Severity, Status};

pub struct Validator;

impl Validator {
    /// Checks loosely typed input before it becomes a stored record.
    pub fn validate_new_incident(incident: &NewIncident) -> Result<()> {
        Self::validate_content_not_empty("title", &incident.title)?;
        Self::validate_content_not_empty("description", &incident.description)?;

        incident.severity.parse::<Severity>()?;
        if let Some(status) = incident.status.as_deref() {
            status.parse::<Status>()?;
        }

        if let Some(url) = incident.source_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Self::validate_url(url.trim())?;
        }

        for actor in &incident.threat_actors {
            Self::validate_unit_interval("threat actor confidence", actor.confidence)?;
        }

        Ok(())
    }

    pub fn validate_content_not_empty(field: &str, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(AnalyticsError::Validation(format!("{} is empty", field)));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AnalyticsError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_unit_interval(field: &str, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalyticsError::Validation(format!(
                "{} must be within [0, 1], got {}",
                field, value
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((cut, _)) => format!("{}...", &text[..cut]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThreatActor;

    fn valid() -> NewIncident {
        NewIncident {
            title: "Ransomware at port authority".to_string(),
            description: "Terminal systems encrypted".to_string(),
            severity: "high".to_string(),
            source_url: Some("https://example.com/advisory".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_new_incident() {
        assert!(Validator::validate_new_incident(&valid()).is_ok());
    }

    #[test]
    fn test_rejects_blank_title() {
        let incident = NewIncident {
            title: "   ".to_string(),
            ..valid()
        };
        assert!(matches!(
            Validator::validate_new_incident(&incident),
            Err(AnalyticsError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_bad_enums() {
        let incident = NewIncident {
            status: Some("archived".to_string()),
            ..valid()
        };
        assert!(Validator::validate_new_incident(&incident).is_err());
    }

    #[test]
    fn test_rejects_non_http_source() {
        let incident = NewIncident {
            source_url: Some("ftp://example.com".to_string()),
            ..valid()
        };
        assert!(Validator::validate_new_incident(&incident).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let mut actor = ThreatActor::new("Crew", 0.5);
        actor.confidence = 1.4;
        let incident = NewIncident {
            threat_actors: vec![actor],
            ..valid()
        };
        assert!(Validator::validate_new_incident(&incident).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://example.com").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
        assert_eq!(Validator::truncate_text("ransomwäre", 8), "ransomwä...");
    }
}
