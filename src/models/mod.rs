// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod classification;
pub mod incident;
pub mod ioc;
pub mod snapshot;
pub mod statistics;

pub use classification::Classification;
pub use incident::{
    IncidentBuilder, IncidentRecord, NewIncident, Severity, SimilarIncident, Status, ThreatActor,
    ThreatActorAttributes,
};
pub use ioc::{Ioc, IocType};
pub use snapshot::{AnalyticsSnapshot, MatrixRow, MonthKey, TimeRange, VulnerabilityMatrix};
pub use statistics::{IncidentStatistics, TrendPoint};
