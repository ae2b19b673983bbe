// file: src/analytics/aggregator.rs
// description: single-pass grouping of incidents into an analytics snapshot
// reference: dashboard aggregation over materialized incident lists

use crate::models::{
    AnalyticsSnapshot, IncidentRecord, MatrixRow, MonthKey, TimeRange, VulnerabilityMatrix,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Groups the incidents that fall inside `range` (relative to `now`).
///
/// Each record contributes once per dimension it carries. Missing or empty
/// fields are skipped; nothing is coerced into an "Unknown" bucket here.
pub fn aggregate(
    incidents: &[IncidentRecord],
    range: TimeRange,
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot::default();
    let mut matrix = MatrixAccumulator::default();

    for incident in incidents.iter().filter(|i| range.includes(i.date, now)) {
        snapshot.total_incidents += 1;

        let sector = incident.sector_label();
        let attack_vector = incident.attack_vector_label();

        if let Some(sector) = sector {
            increment(&mut snapshot.incidents_by_sector, sector);
            matrix.add_sector(sector);
        }

        if let Some(severity) = incident.severity {
            *snapshot.incidents_by_severity.entry(severity).or_insert(0) += 1;
        }

        if let Some(vector) = attack_vector {
            increment(&mut snapshot.incidents_by_attack_vector, vector);
            matrix.add_vector(vector);

            if let Some(sector) = sector {
                matrix.add_cell(sector, vector);
            }
        }

        if let Some(date) = incident.date {
            *snapshot
                .incidents_by_month
                .entry(MonthKey::from_date(&date))
                .or_insert(0) += 1;
        }

        for actor in &incident.threat_actors {
            if !actor.name.is_empty() {
                increment(&mut snapshot.incidents_by_threat_actor, &actor.name);
            }
        }
    }

    snapshot.sector_vulnerability_matrix = matrix.finish();

    debug!(
        "Aggregated {} of {} incidents for range {}",
        snapshot.total_incidents,
        incidents.len(),
        range
    );

    snapshot
}

/// Orders `"<Mon> <Year>"` labels chronologically. Labels that do not parse
/// keep their relative order after all parseable ones.
pub fn sort_month_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut keyed: Vec<(Option<MonthKey>, &str)> = labels
        .iter()
        .map(|l| (l.as_ref().parse::<MonthKey>().ok(), l.as_ref()))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    keyed.into_iter().map(|(_, l)| l.to_string()).collect()
}

fn increment(map: &mut BTreeMap<String, u64>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

/// Rows and columns keep first-encountered order.
#[derive(Default)]
struct MatrixAccumulator {
    sectors: Vec<String>,
    vectors: Vec<String>,
    cells: HashMap<(String, String), u64>,
}

impl MatrixAccumulator {
    fn add_sector(&mut self, sector: &str) {
        if !self.sectors.iter().any(|s| s == sector) {
            self.sectors.push(sector.to_string());
        }
    }

    fn add_vector(&mut self, vector: &str) {
        if !self.vectors.iter().any(|v| v == vector) {
            self.vectors.push(vector.to_string());
        }
    }

    fn add_cell(&mut self, sector: &str, vector: &str) {
        *self
            .cells
            .entry((sector.to_string(), vector.to_string()))
            .or_insert(0) += 1;
    }

    fn finish(self) -> VulnerabilityMatrix {
        let datasets = self
            .sectors
            .iter()
            .map(|sector| MatrixRow {
                label: sector.clone(),
                data: self
                    .vectors
                    .iter()
                    .map(|vector| {
                        self.cells
                            .get(&(sector.clone(), vector.clone()))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect(),
            })
            .collect();

        VulnerabilityMatrix {
            labels: self.vectors,
            datasets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, ThreatActor};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn scenario() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::builder("Phish", "a")
                .id("1")
                .severity(Severity::Critical)
                .sector("Banking")
                .attack_vector("Phishing")
                .date(at(2024, 1, 10))
                .build(),
            IncidentRecord::builder("Ransom", "b")
                .id("2")
                .severity(Severity::High)
                .sector("Banking")
                .attack_vector("Ransomware")
                .date(at(2024, 2, 3))
                .build(),
            IncidentRecord::builder("Phish again", "c")
                .id("3")
                .severity(Severity::Medium)
                .sector("Healthcare")
                .attack_vector("Phishing")
                .date(at(2024, 2, 20))
                .build(),
        ]
    }

    #[test]
    fn test_grouped_counts() {
        let snapshot = aggregate(&scenario(), TimeRange::All, at(2024, 3, 1));

        let sectors: Vec<(&str, u64)> = snapshot
            .incidents_by_sector
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(sectors, vec![("Banking", 2), ("Healthcare", 1)]);

        assert_eq!(snapshot.incidents_by_severity.get(&Severity::Critical), Some(&1));
        assert_eq!(snapshot.incidents_by_severity.get(&Severity::High), Some(&1));
        assert_eq!(snapshot.incidents_by_severity.get(&Severity::Medium), Some(&1));
        assert_eq!(snapshot.incidents_by_attack_vector.get("Phishing"), Some(&2));
        assert_eq!(snapshot.incidents_by_attack_vector.get("Ransomware"), Some(&1));

        let months: Vec<(String, u64)> = snapshot
            .incidents_by_month
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        assert_eq!(
            months,
            vec![("Jan 2024".to_string(), 1), ("Feb 2024".to_string(), 2)]
        );
    }

    #[test]
    fn test_matrix_layout() {
        let snapshot = aggregate(&scenario(), TimeRange::All, at(2024, 3, 1));
        let matrix = &snapshot.sector_vulnerability_matrix;

        assert_eq!(matrix.labels, vec!["Phishing", "Ransomware"]);
        assert_eq!(matrix.sectors().collect::<Vec<_>>(), vec!["Banking", "Healthcare"]);
        assert_eq!(matrix.cell("Banking", "Phishing"), Some(1));
        assert_eq!(matrix.cell("Banking", "Ransomware"), Some(1));
        assert_eq!(matrix.cell("Healthcare", "Phishing"), Some(1));
        assert_eq!(matrix.cell("Healthcare", "Ransomware"), Some(0));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let incidents = vec![
            IncidentRecord::builder("bare", "").id("a").build(),
            IncidentRecord::builder("only vector", "")
                .id("b")
                .attack_vector("DDoS")
                .sector("")
                .build(),
        ];

        let snapshot = aggregate(&incidents, TimeRange::All, at(2024, 3, 1));

        assert_eq!(snapshot.total_incidents, 2);
        assert!(snapshot.incidents_by_sector.is_empty());
        assert!(snapshot.incidents_by_severity.is_empty());
        assert!(snapshot.incidents_by_month.is_empty());
        assert_eq!(snapshot.incidents_by_attack_vector.get("DDoS"), Some(&1));
        assert_eq!(snapshot.sector_vulnerability_matrix.labels, vec!["DDoS"]);
        assert!(snapshot.sector_vulnerability_matrix.datasets.is_empty());
    }

    #[test]
    fn test_severity_count_conservation() {
        let mut incidents = scenario();
        incidents.push(IncidentRecord::builder("no severity", "").id("4").build());

        let snapshot = aggregate(&incidents, TimeRange::All, at(2024, 3, 1));
        let total: u64 = snapshot.incidents_by_severity.values().sum();

        assert!(total as usize <= incidents.len());
        assert_eq!(total, 3);
        for incident in &incidents {
            if let Some(severity) = incident.severity {
                assert!(snapshot.incidents_by_severity.contains_key(&severity));
            }
        }
    }

    #[test]
    fn test_time_range_filter() {
        let snapshot = aggregate(&scenario(), TimeRange::OneMonth, at(2024, 3, 1));

        // cutoff is 2024-02-01T12:00, so only the two February incidents remain
        assert_eq!(snapshot.total_incidents, 2);
        assert_eq!(snapshot.incidents_by_month.len(), 1);

        let undated = vec![IncidentRecord::builder("undated", "").sector("Banking").build()];
        assert_eq!(aggregate(&undated, TimeRange::OneYear, at(2024, 3, 1)).total_incidents, 0);
        assert_eq!(aggregate(&undated, TimeRange::All, at(2024, 3, 1)).total_incidents, 1);
    }

    #[test]
    fn test_threat_actor_counts() {
        let incidents = vec![
            IncidentRecord::builder("a", "")
                .threat_actor(ThreatActor::new("LockBit", 0.9))
                .threat_actor(ThreatActor::new("", 0.5))
                .build(),
            IncidentRecord::builder("b", "")
                .threat_actor(ThreatActor::new("LockBit", 0.8))
                .build(),
        ];

        let snapshot = aggregate(&incidents, TimeRange::All, at(2024, 3, 1));
        assert_eq!(snapshot.incidents_by_threat_actor.len(), 1);
        assert_eq!(snapshot.incidents_by_threat_actor.get("LockBit"), Some(&2));
    }

    #[test]
    fn test_sort_month_labels() {
        let sorted = sort_month_labels(&["Jan 2024", "bogus", "Dec 2023", "Mar 2023"]);
        assert_eq!(sorted, vec!["Mar 2023", "Dec 2023", "Jan 2024", "bogus"]);

        let sorted = sort_month_labels(&["Feb 2024", "Jan 2024"]);
        assert_eq!(sorted, vec!["Jan 2024", "Feb 2024"]);
    }
}
