// file: src/models/snapshot.rs
// description: derived analytics snapshot, month buckets and time range filter
// reference: dashboard chart data shapes

use crate::error::{AnalyticsError, Result};
use crate::models::Severity;
use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn months(&self) -> Option<u32> {
        match self {
            TimeRange::OneMonth => Some(1),
            TimeRange::ThreeMonths => Some(3),
            TimeRange::SixMonths => Some(6),
            TimeRange::OneYear => Some(12),
            TimeRange::All => None,
        }
    }

    /// Earliest instant included by this range, or `None` for all-time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.months()?;
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    pub fn includes(&self, date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self.cutoff(now) {
            None => true,
            Some(cutoff) => date.is_some_and(|d| d >= cutoff),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneMonth => "1m",
            TimeRange::ThreeMonths => "3m",
            TimeRange::SixMonths => "6m",
            TimeRange::OneYear => "1y",
            TimeRange::All => "all",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(TimeRange::OneMonth),
            "3m" => Ok(TimeRange::ThreeMonths),
            "6m" => Ok(TimeRange::SixMonths),
            "1y" | "12m" => Ok(TimeRange::OneYear),
            "all" => Ok(TimeRange::All),
            other => Err(AnalyticsError::Validation(format!(
                "Unknown time range: {} (expected 1m, 3m, 6m, 1y or all)",
                other
            ))),
        }
    }
}

/// Calendar month bucket rendered as `"<MonthAbbrev> <Year>"`. Ordering is
/// chronological, not lexical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abbrev = MONTH_ABBREVIATIONS[(self.month as usize + 11) % 12];
        write!(f, "{} {}", abbrev, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnalyticsError::Validation(format!("Invalid month label: {}", s));

        let mut parts = s.split_whitespace();
        let month_part = parts.next().ok_or_else(invalid)?;
        let year_part = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() || month_part.len() < 3 {
            return Err(invalid());
        }

        let prefix = month_part.get(..3).ok_or_else(invalid)?.to_lowercase();
        let month = MONTH_ABBREVIATIONS
            .iter()
            .position(|m| m.to_lowercase() == prefix)
            .ok_or_else(invalid)? as u32
            + 1;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;

        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub label: String,
    pub data: Vec<u64>,
}

/// Sector x attack-vector cross tabulation. `labels` are the attack-vector
/// columns; each dataset is one sector row aligned with `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityMatrix {
    pub labels: Vec<String>,
    pub datasets: Vec<MatrixRow>,
}

impl VulnerabilityMatrix {
    pub fn cell(&self, sector: &str, attack_vector: &str) -> Option<u64> {
        let column = self.labels.iter().position(|l| l == attack_vector)?;
        self.datasets
            .iter()
            .find(|row| row.label == sector)
            .and_then(|row| row.data.get(column).copied())
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|row| row.label.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_incidents: usize,
    pub incidents_by_sector: BTreeMap<String, u64>,
    pub incidents_by_severity: BTreeMap<Severity, u64>,
    pub incidents_by_attack_vector: BTreeMap<String, u64>,
    pub incidents_by_month: BTreeMap<MonthKey, u64>,
    pub incidents_by_threat_actor: BTreeMap<String, u64>,
    pub sector_vulnerability_matrix: VulnerabilityMatrix,
}
