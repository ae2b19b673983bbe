// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{AnalyticsError, Result};
use crate::models::TimeRange;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreConfig,
    pub analytics: AnalyticsConfig,
    pub similarity: SimilarityConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub default_time_range: TimeRange,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SimilarityConfig {
    pub threshold: f64,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    pub timeout_secs: u64,
    pub parallel_workers: usize,
    #[serde(default)]
    pub show_progress: bool,
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            limit: 5,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            parallel_workers: 4,
            show_progress: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("INCIDENT_ANALYTICS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AnalyticsError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| AnalyticsError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            store: StoreConfig {
                path: PathBuf::from("data/incidents.json"),
                create_if_missing: true,
            },
            analytics: AnalyticsConfig {
                default_time_range: TimeRange::OneYear,
            },
            similarity: SimilarityConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.similarity.threshold) {
            return Err(AnalyticsError::Config(
                "similarity.threshold must be within [0, 1)".to_string(),
            ));
        }

        if self.similarity.limit == 0 {
            return Err(AnalyticsError::Config(
                "similarity.limit must be greater than 0".to_string(),
            ));
        }

        if self.enrichment.timeout_secs == 0 {
            return Err(AnalyticsError::Config(
                "enrichment.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.enrichment.parallel_workers == 0 {
            return Err(AnalyticsError::Config(
                "enrichment.parallel_workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
