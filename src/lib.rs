//! Registry crawler: a paginated directory harvester
//!
//! This crate crawls a public registry of sports organizations, one
//! (region, province) filter at a time, enriches each listed entity with
//! the attributes from its detail page, and appends every distinct entity
//! to a CSV file as soon as it has been fetched.

pub mod config;
pub mod crawler;
pub mod endpoint;
pub mod entity;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for registry crawler operations
///
/// Only conditions that make the rest of the run worthless end up here.
/// Failed page or detail requests are logged and skipped by the fetchers.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for registry crawler operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use entity::{EntityDetail, EntityRecord, EntitySummary};
pub use state::{CrawlPhase, DedupStore, PaginationState};
