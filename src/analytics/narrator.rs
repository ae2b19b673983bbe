// file: src/analytics/narrator.rs
// description: templated trend sentence and strategic recommendations
// reference: analytics dashboard narration

use crate::models::{AnalyticsSnapshot, MonthKey};
use std::collections::BTreeMap;

pub const INSUFFICIENT_DATA: &str = "Insufficient data for trend analysis.";
pub const INCREASE_FROM_ZERO: &str = "There has been a significant increase in incidents in the most recent period compared to the previous one with zero incidents.";

const SIGNIFICANT_CHANGE_PERCENT: f64 = 10.0;

const GENERIC_RECOMMENDATIONS: [&str; 2] = [
    "Establish cross-sector information sharing to improve collective defense against common threats.",
    "Conduct regular security awareness training for employees, focusing on recognizing and responding to common attack vectors.",
];

/// Compares the last two chronological month buckets.
pub fn describe_trend(month_counts: &BTreeMap<MonthKey, u64>) -> String {
    let counts: Vec<u64> = month_counts.values().copied().collect();
    describe_trend_counts(&counts)
}

/// Same as [`describe_trend`] over counts already in chronological order.
pub fn describe_trend_counts(counts: &[u64]) -> String {
    let [.., previous, last] = counts else {
        return INSUFFICIENT_DATA.to_string();
    };

    if *previous == 0 {
        return INCREASE_FROM_ZERO.to_string();
    }

    let percent_change = (*last as f64 - *previous as f64) / *previous as f64 * 100.0;

    if percent_change > SIGNIFICANT_CHANGE_PERCENT {
        format!(
            "There has been a significant increase ({:.1}%) in incidents in the most recent period compared to the previous one. This could indicate an emerging threat campaign or new vulnerabilities being exploited.",
            percent_change
        )
    } else if percent_change < -SIGNIFICANT_CHANGE_PERCENT {
        format!(
            "There has been a notable decrease ({:.1}%) in incidents in the most recent period. This could be due to improved security measures or the end of a specific threat campaign.",
            percent_change.abs()
        )
    } else {
        format!(
            "The incident rate has remained relatively stable ({:.1}% change) between the most recent periods, suggesting consistent threat activity.",
            percent_change
        )
    }
}

/// One sentence per non-empty top-ranked mapping (sector, attack vector,
/// threat actor), followed by the two generic recommendations.
pub fn recommend(snapshot: &AnalyticsSnapshot) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(sector) = top_entry(&snapshot.incidents_by_sector) {
        recommendations.push(format!(
            "Organizations in the {} sector should implement enhanced security measures and conduct regular security assessments.",
            sector
        ));
    }

    if let Some(vector) = top_entry(&snapshot.incidents_by_attack_vector) {
        recommendations.push(format!(
            "Prioritize defenses against {} attacks, which are the most prevalent threat vector.",
            vector
        ));
    }

    if let Some(actor) = top_entry(&snapshot.incidents_by_threat_actor) {
        recommendations.push(format!(
            "Monitor for indicators associated with {}, the most active threat actor in the dataset.",
            actor
        ));
    }

    recommendations.extend(GENERIC_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    recommendations
}

/// Highest count; ties go to the lexically smallest label.
fn top_entry(counts: &BTreeMap<String, u64>) -> Option<&str> {
    counts
        .iter()
        .min_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(label, _)| label.as_str())
}
