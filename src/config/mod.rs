//! Configuration module for the registry crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! including the filter catalogue of regions and provinces.
//!
//! # Example
//!
//! ```no_run
//! use registry_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("registry.toml")).unwrap();
//! println!("Will crawl {} filters", config.filters().len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, Escaping, Filter, OutputConfig, ProvinceFilter, RegionFilter,
    SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
