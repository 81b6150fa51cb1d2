//! Specsweep: a resumable device-spec catalog harvester
//!
//! This crate crawls a paginated device catalog, discovers detail-page links,
//! fetches each detail page with retry under a bounded worker pool, extracts a
//! fixed record schema from the page markup, and appends rows to a
//! per-manufacturer CSV. Progress is persisted so an interrupted run resumes
//! without re-fetching completed pages.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for specsweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] crawler::DiscoveryError),

    #[error("Fetch error for {url}: {source}")]
    Fetch {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for specsweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_harvest, HarvestSummary};
pub use extract::{normalize, SpecRecord};
pub use state::JobState;
