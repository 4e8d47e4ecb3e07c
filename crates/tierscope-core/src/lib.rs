pub mod app_config;
pub mod config;
pub mod locator;
pub mod record;
pub mod selectors;

pub use app_config::{AppConfig, DriverKind, FailurePolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use locator::Locator;
pub use record::{
    AboutMetrics, BreakdownMap, Breakdowns, ChatRooms, Counters, Engagement, EngagementBucket,
    ExtractionRecord, Platform, SocialPresence, TierCard,
};
pub use selectors::{load_selectors, SelectorSet};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read selectors file {path}: {source}")]
    SelectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse selectors file: {0}")]
    SelectorsFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
