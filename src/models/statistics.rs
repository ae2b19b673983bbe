// file: src/models/statistics.rs
// description: dashboard summary statistics and daily trend points

use crate::models::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStatistics {
    pub total_incidents: usize,
    pub critical_incidents: u64,
    pub high_incidents: u64,
    pub sectors_affected: usize,
    pub open_incidents: usize,
    pub incidents_by_sector: BTreeMap<String, u64>,
    pub incidents_by_severity: BTreeMap<Severity, u64>,
    pub incidents_by_attack_vector: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: usize,
}
