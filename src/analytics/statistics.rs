// file: src/analytics/statistics.rs
// description: dashboard summaries, filtered search and daily trend
// reference: incident overview widgets

use crate::models::{IncidentRecord, IncidentStatistics, Severity, Status, TrendPoint};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};

const ALL_FILTER: &str = "all";

/// Longest window `daily_trend` will build.
pub const MAX_TREND_DAYS: u32 = 365;

pub fn incident_statistics(incidents: &[IncidentRecord]) -> IncidentStatistics {
    let mut stats = IncidentStatistics {
        total_incidents: incidents.len(),
        incidents_by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
        ..Default::default()
    };

    for incident in incidents {
        if let Some(sector) = incident.sector_label() {
            *stats.incidents_by_sector.entry(sector.to_string()).or_insert(0) += 1;
        }

        if let Some(severity) = incident.severity {
            *stats.incidents_by_severity.entry(severity).or_insert(0) += 1;
        }

        if let Some(vector) = incident.attack_vector_label() {
            *stats
                .incidents_by_attack_vector
                .entry(vector.to_string())
                .or_insert(0) += 1;
        }

        if incident.status.is_some_and(|s| s.is_open()) {
            stats.open_incidents += 1;
        }
    }

    stats.critical_incidents = stats.incidents_by_severity[&Severity::Critical];
    stats.high_incidents = stats.incidents_by_severity[&Severity::High];
    stats.sectors_affected = stats.incidents_by_sector.len();
    stats
}

/// Optional search criteria. A filter that is `None`, empty or `"all"` is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub term: Option<String>,
    pub sector: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
}

impl SearchFilter {
    fn matches(&self, incident: &IncidentRecord) -> bool {
        if let Some(term) = active(&self.term) {
            let term = term.to_lowercase();
            let hit = incident.title.to_lowercase().contains(&term)
                || incident.description.to_lowercase().contains(&term)
                || incident
                    .attack_vector_label()
                    .is_some_and(|v| v.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(sector) = active(&self.sector)
            && incident.sector_label() != Some(sector)
        {
            return false;
        }

        if let Some(severity) = active(&self.severity)
            && incident.severity.as_ref().map(Severity::as_str) != Some(severity)
        {
            return false;
        }

        if let Some(status) = active(&self.status)
            && incident.status.as_ref().map(Status::as_str) != Some(status)
        {
            return false;
        }

        true
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .filter(|f| !f.is_empty() && *f != ALL_FILTER)
}

pub fn search_incidents(incidents: &[IncidentRecord], filter: &SearchFilter) -> Vec<IncidentRecord> {
    incidents
        .iter()
        .filter(|incident| filter.matches(incident))
        .cloned()
        .collect()
}

/// One point per calendar day (UTC) for the last `days` days ending today,
/// oldest first. Labels look like `"Mar 7"`. `days` is capped at
/// [`MAX_TREND_DAYS`].
pub fn daily_trend(incidents: &[IncidentRecord], days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    let days = days.min(MAX_TREND_DAYS);

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in incidents.iter().filter_map(|incident| incident.date) {
        *counts.entry(date.date_naive()).or_insert(0) += 1;
    }

    (0..days)
        .rev()
        .filter_map(|offset| now.checked_sub_signed(Duration::days(i64::from(offset))))
        .map(|instant| {
            let day = instant.date_naive();
            TrendPoint {
                date: day.format("%b %-d").to_string(),
                count: counts.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

pub fn all_sectors(incidents: &[IncidentRecord]) -> Vec<String> {
    incidents
        .iter()
        .filter_map(IncidentRecord::sector_label)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn incidents() -> Vec<IncidentRecord> {
        let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 9, 30, 0).unwrap();
        vec![
            IncidentRecord::builder("Hospital ransomware", "EHR encrypted")
                .id("1")
                .sector("Healthcare")
                .severity(Severity::Critical)
                .status(Status::New)
                .attack_vector("Ransomware")
                .date(day(7))
                .build(),
            IncidentRecord::builder("Bank phishing", "Credential lure")
                .id("2")
                .sector("Banking & Finance")
                .severity(Severity::High)
                .status(Status::Resolved)
                .attack_vector("Phishing")
                .date(day(7))
                .build(),
            IncidentRecord::builder("Clinic phishing", "Staff mailbox")
                .id("3")
                .sector("Healthcare")
                .status(Status::Investigating)
                .date(day(5))
                .build(),
        ]
    }

    #[test]
    fn test_statistics() {
        let stats = incident_statistics(&incidents());

        assert_eq!(stats.total_incidents, 3);
        assert_eq!(stats.critical_incidents, 1);
        assert_eq!(stats.high_incidents, 1);
        assert_eq!(stats.sectors_affected, 2);
        assert_eq!(stats.open_incidents, 2);
        assert_eq!(stats.incidents_by_severity.len(), 4);
        assert_eq!(stats.incidents_by_severity[&Severity::Low], 0);
        assert_eq!(stats.incidents_by_attack_vector["Phishing"], 1);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = incident_statistics(&[]);
        assert_eq!(stats.total_incidents, 0);
        assert_eq!(stats.incidents_by_severity.values().sum::<u64>(), 0);
    }

    #[test]
    fn test_search_by_term_and_filters() {
        let all = incidents();

        let filter = SearchFilter {
            term: Some("PHISHING".to_string()),
            ..Default::default()
        };
        assert_eq!(search_incidents(&all, &filter).len(), 2);

        let filter = SearchFilter {
            term: Some("phishing".to_string()),
            sector: Some("Healthcare".to_string()),
            severity: Some("all".to_string()),
            ..Default::default()
        };
        let found = search_incidents(&all, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "3");

        let filter = SearchFilter {
            status: Some("resolved".to_string()),
            ..Default::default()
        };
        assert_eq!(search_incidents(&all, &filter)[0].id, "2");
    }

    #[test]
    fn test_daily_trend() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap();
        let trend = daily_trend(&incidents(), 3, now);

        assert_eq!(
            trend,
            vec![
                TrendPoint { date: "Mar 5".to_string(), count: 1 },
                TrendPoint { date: "Mar 6".to_string(), count: 0 },
                TrendPoint { date: "Mar 7".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_daily_trend_window_is_capped() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap();

        let trend = daily_trend(&incidents(), u32::MAX, now);
        assert_eq!(trend.len(), MAX_TREND_DAYS as usize);
        assert_eq!(trend.last().unwrap().count, 2);

        assert!(daily_trend(&incidents(), 0, now).is_empty());
    }

    #[test]
    fn test_all_sectors_sorted_unique() {
        assert_eq!(
            all_sectors(&incidents()),
            vec!["Banking & Finance".to_string(), "Healthcare".to_string()]
        );
    }
}
