// file: src/classifier/mod.rs
// description: incident classification module exports
// reference: internal module structure

pub mod keyword;
pub mod rules;
pub mod threat_actor;

pub use keyword::{KeywordClassifier, classify};
pub use rules::KeywordRule;
pub use threat_actor::{ThreatActorIdentifier, identify_threat_actors};
