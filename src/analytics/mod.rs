// file: src/analytics/mod.rs
// description: analytics module exports
// reference: internal module structure

pub mod aggregator;
pub mod narrator;
pub mod similarity;
pub mod statistics;

pub use aggregator::{aggregate, sort_month_labels};
pub use narrator::{describe_trend, describe_trend_counts, recommend};
pub use similarity::{SimilarityMatcher, extract_keywords, find_similar, find_similar_in_store};
pub use statistics::{
    MAX_TREND_DAYS, SearchFilter, all_sectors, daily_trend, incident_statistics, search_incidents,
};
